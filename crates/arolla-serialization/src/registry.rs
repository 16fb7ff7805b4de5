//! Named codec registry.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use arolla_core::ForeignObject;
use parking_lot::RwLock;

use crate::codec::Codec;
use crate::error::{CodecError, Result};
use crate::options::DecodeOptions;

static GLOBAL: LazyLock<CodecRegistry> = LazyLock::new(CodecRegistry::new);

/// Append-only mapping from codec name to implementation.
///
/// A registered name is never removed or replaced.
#[derive(Default)]
pub struct CodecRegistry {
    codecs: RwLock<HashMap<String, Arc<dyn Codec>>>,
}

impl CodecRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry.
    pub fn global() -> &'static CodecRegistry {
        &GLOBAL
    }

    /// Publish `codec` under `name`.
    ///
    /// Registering the same `Arc` again is a no-op; a different
    /// implementation under a taken name is a [`CodecError::Collision`].
    pub fn register(&self, name: &str, codec: Arc<dyn Codec>) -> Result<()> {
        let mut codecs = self.codecs.write();
        if let Some(existing) = codecs.get(name) {
            if Arc::ptr_eq(existing, &codec) {
                return Ok(());
            }
            return Err(CodecError::Collision(name.to_owned()));
        }
        codecs.insert(name.to_owned(), codec);
        tracing::debug!(codec = name, "registered codec");
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn Codec>> {
        self.codecs
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| CodecError::NotFound(name.to_owned()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.codecs.read().contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.codecs.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Encode `object` with the codec it names.
    pub fn encode(&self, object: &ForeignObject) -> Result<(String, Vec<u8>)> {
        let name = object
            .codec()
            .ok_or_else(|| CodecError::NoCodec(object.type_name().to_owned()))?;
        let codec = self.get(name)?;
        let bytes = codec.encode(object).map_err(|source| CodecError::Failure {
            codec: name.to_owned(),
            source,
        })?;
        tracing::trace!(codec = name, len = bytes.len(), "encoded foreign object");
        Ok((name.to_owned(), bytes))
    }

    /// Decode bytes produced by the codec registered as `name`.
    pub fn decode(
        &self,
        name: &str,
        bytes: &[u8],
        options: &DecodeOptions,
    ) -> Result<ForeignObject> {
        let limit = options.get_max_payload_bytes();
        if bytes.len() > limit {
            return Err(CodecError::PayloadTooLarge {
                size: bytes.len(),
                limit,
            });
        }
        let codec = self.get(name)?;
        let object = codec
            .decode(bytes, options)
            .map_err(|source| CodecError::Failure {
                codec: name.to_owned(),
                source,
            })?;
        tracing::trace!(codec = name, len = bytes.len(), "decoded foreign object");
        Ok(object)
    }
}
