//! Opaque host payloads embedded in qvalues.

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_FOREIGN_ID: AtomicU64 = AtomicU64::new(1);

/// An opaque payload plus the identifier of the codec able to serialize it.
///
/// Equality and fingerprinting use the object identity, never the payload:
/// the runtime cannot look inside.
#[derive(Clone)]
pub struct ForeignObject {
    inner: Arc<ForeignInner>,
}

struct ForeignInner {
    id: u64,
    payload: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
    codec: Option<String>,
}

impl ForeignObject {
    /// Wrap a payload with no serialization codec.
    pub fn new<T: Any + Send + Sync>(payload: T) -> Self {
        Self::from_payload(Arc::new(payload), std::any::type_name::<T>(), None)
    }

    /// Wrap a payload serializable by the codec registered under `codec`.
    pub fn with_codec<T: Any + Send + Sync>(payload: T, codec: impl Into<String>) -> Self {
        Self::from_payload(
            Arc::new(payload),
            std::any::type_name::<T>(),
            Some(codec.into()),
        )
    }

    /// Wrap an already shared payload. Used by codecs when decoding.
    pub fn from_payload(
        payload: Arc<dyn Any + Send + Sync>,
        type_name: &'static str,
        codec: Option<String>,
    ) -> Self {
        Self {
            inner: Arc::new(ForeignInner {
                id: NEXT_FOREIGN_ID.fetch_add(1, Ordering::Relaxed),
                payload,
                type_name,
                codec,
            }),
        }
    }

    /// Process-unique identity.
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn codec(&self) -> Option<&str> {
        self.inner.codec.as_deref()
    }

    pub fn payload(&self) -> &Arc<dyn Any + Send + Sync> {
        &self.inner.payload
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.payload.downcast_ref::<T>()
    }

    /// Rust type name of the payload, without module path.
    pub fn type_name(&self) -> &'static str {
        let name = self.inner.type_name;
        let generic_start = name.find('<').unwrap_or(name.len());
        match name[..generic_start].rfind("::") {
            Some(pos) => &name[pos + 2..],
            None => name,
        }
    }
}

impl PartialEq for ForeignObject {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for ForeignObject {}

impl fmt::Debug for ForeignObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForeignObject")
            .field("id", &self.inner.id)
            .field("type", &self.type_name())
            .field("codec", &self.inner.codec)
            .finish()
    }
}
