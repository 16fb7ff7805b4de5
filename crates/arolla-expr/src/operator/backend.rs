//! Operators implemented by a host kernel.

use std::error::Error;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use arolla_core::{QType, QValue};

/// Output qtype for the given input qtypes, or a message explaining why the
/// inputs are rejected.
pub type QTypeRule = Arc<dyn Fn(&[QType]) -> Result<QType, String> + Send + Sync>;

/// Computes the output value from input values. The second argument is the
/// output qtype inferred by the operator's [`QTypeRule`].
pub type KernelFn =
    Arc<dyn Fn(&[QValue], QType) -> Result<QValue, KernelError> + Send + Sync>;

/// Failure raised by a kernel at evaluation time.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct KernelError {
    message: String,
    #[source]
    source: Option<Box<dyn Error + Send + Sync>>,
}

impl KernelError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

static NEXT_BACKEND_UID: AtomicU64 = AtomicU64::new(1);

#[derive(Clone)]
pub struct BackendOperator {
    rule: QTypeRule,
    kernel: KernelFn,
    uid: u64,
}

impl BackendOperator {
    pub(crate) fn new(rule: QTypeRule, kernel: KernelFn) -> Self {
        Self {
            rule,
            kernel,
            uid: NEXT_BACKEND_UID.fetch_add(1, Ordering::Relaxed),
        }
    }

    pub fn output_qtype(&self, inputs: &[QType]) -> Result<QType, String> {
        (self.rule)(inputs)
    }

    pub fn kernel(&self) -> &KernelFn {
        &self.kernel
    }

    /// Process-unique id, part of the operator fingerprint.
    pub fn uid(&self) -> u64 {
        self.uid
    }
}

impl fmt::Debug for BackendOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendOperator")
            .field("uid", &self.uid)
            .finish_non_exhaustive()
    }
}
