//! Serialization errors.

use arolla_core::QTypeError;

use crate::codec::BoxError;
use crate::envelope::{HEADER_SIZE, VERSION};

pub type Result<T> = std::result::Result<T, CodecError>;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("codec {0:?} is not registered")]
    NotFound(String),

    #[error("codec {0:?} is already registered with a different implementation")]
    Collision(String),

    #[error("foreign object of type {0} has no codec")]
    NoCodec(String),

    /// The codec itself failed; its error is kept as the source.
    #[error("codec {codec:?} failed: {source}")]
    Failure {
        codec: String,
        #[source]
        source: BoxError,
    },

    #[error("invalid magic: expected AQV1")]
    InvalidMagic,

    #[error("unsupported version: {0} (expected {VERSION})")]
    UnsupportedVersion(u32),

    #[error("envelope too small: {0} bytes (minimum {HEADER_SIZE})")]
    TooSmall(usize),

    #[error("size mismatch: header says {header} body bytes, got {actual}")]
    SizeMismatch { header: u32, actual: usize },

    #[error("checksum mismatch: header says {expected:#010x}, body hashes to {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    #[error("payload of {size} bytes exceeds the limit of {limit} bytes")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("malformed body: {0}")]
    Body(#[from] postcard::Error),

    /// The body parsed but its node tables do not describe one value tree.
    #[error("invalid body: {0}")]
    Invalid(String),

    #[error("nesting exceeds the depth limit of {limit}")]
    DepthExceeded { limit: usize },

    #[error("body declares {count} qtypes, more than the limit of {limit}")]
    TooManyQTypes { count: usize, limit: usize },

    #[error("qtype of size {size} exceeds the limit of {limit}")]
    QTypeTooLarge { size: usize, limit: usize },

    #[error(transparent)]
    QType(#[from] QTypeError),
}
