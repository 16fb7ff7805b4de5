//! Errors raised by qtype and qvalue construction.

use crate::QType;

/// Result type for qtype/qvalue operations.
pub type Result<T> = std::result::Result<T, QTypeError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QTypeError {
    /// A value or base type does not fit the requested qtype.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: QType },

    /// A qtype constructor received an argument it cannot wrap.
    #[error("cannot construct {constructor} over {base}: {reason}")]
    IncompatibleBase {
        constructor: &'static str,
        base: QType,
        reason: String,
    },

    #[error("duplicate field name {0:?}")]
    DuplicateFieldName(String),

    #[error("{0} requires at least one input")]
    EmptyInputs(&'static str),

    #[error("expected {expected} fields, got {actual}")]
    FieldCountMismatch { expected: usize, actual: usize },
}

impl QTypeError {
    pub fn mismatch(expected: impl Into<String>, actual: QType) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            actual,
        }
    }
}
