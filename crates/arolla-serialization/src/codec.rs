//! The codec contract for foreign-object payloads.

use std::any::{Any, type_name};
use std::marker::PhantomData;

use arolla_core::ForeignObject;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::options::DecodeOptions;

/// Error type returned by codec implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Turns a foreign payload into bytes and back.
///
/// Implementations report their own failures; the registry wraps them in
/// [`CodecError::Failure`](crate::CodecError::Failure) with the codec name.
pub trait Codec: Send + Sync {
    fn encode(&self, object: &ForeignObject) -> Result<Vec<u8>, BoxError>;

    /// Rebuild the object. The result should carry this codec's name so it
    /// can be encoded again.
    fn decode(&self, bytes: &[u8], options: &DecodeOptions) -> Result<ForeignObject, BoxError>;
}

/// Codec for any payload type that is serde-serializable, stored as JSON.
pub struct JsonCodec<T> {
    name: String,
    _payload: PhantomData<fn() -> T>,
}

impl<T> JsonCodec<T> {
    /// `name` is the identifier decoded objects are tagged with; it should
    /// match the name the codec is registered under.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            _payload: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<T> Codec for JsonCodec<T>
where
    T: Serialize + DeserializeOwned + Any + Send + Sync,
{
    fn encode(&self, object: &ForeignObject) -> Result<Vec<u8>, BoxError> {
        let Some(payload) = object.downcast_ref::<T>() else {
            return Err(format!(
                "expected a payload of type {}, got {}",
                type_name::<T>(),
                object.type_name()
            )
            .into());
        };
        Ok(serde_json::to_vec(payload)?)
    }

    fn decode(&self, bytes: &[u8], _options: &DecodeOptions) -> Result<ForeignObject, BoxError> {
        let payload: T = serde_json::from_slice(bytes)?;
        Ok(ForeignObject::with_codec(payload, self.name.clone()))
    }
}
