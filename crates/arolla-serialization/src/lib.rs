#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Serialization of Arolla qvalues.
//!
//! Foreign-object payloads are opaque to the runtime, so each one names the
//! [`Codec`] able to turn it into bytes. Codecs live in a [`CodecRegistry`];
//! the reading process must register the same codec names as the writer.
//!
//! [`encode_value`] and [`decode_value`] wrap a whole qvalue, including nested
//! foreign objects, into a checksummed envelope.

pub mod codec;
pub mod envelope;
pub mod error;
pub mod options;
mod proto;
pub mod registry;
pub mod value;

#[cfg(test)]
mod value_tests;

pub use codec::{BoxError, Codec, JsonCodec};
pub use envelope::Header;
pub use error::{CodecError, Result};
pub use options::DecodeOptions;
pub use registry::CodecRegistry;
pub use value::{decode_value, encode_value};
