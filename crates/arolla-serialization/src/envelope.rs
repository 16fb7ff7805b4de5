//! Envelope header (16 bytes).
//!
//! Layout, little-endian:
//! - 0-3: magic `b"AQV1"`
//! - 4-7: format version
//! - 8-11: CRC32 of the body
//! - 12-15: body length in bytes

use crate::error::{CodecError, Result};

pub const MAGIC: [u8; 4] = *b"AQV1";
pub const VERSION: u32 = 1;
pub const HEADER_SIZE: usize = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header {
    pub magic: [u8; 4],
    pub version: u32,
    pub checksum: u32,
    pub body_len: u32,
}

const _: () = assert!(std::mem::size_of::<Header>() == HEADER_SIZE);

impl Default for Header {
    fn default() -> Self {
        Self {
            magic: MAGIC,
            version: VERSION,
            checksum: 0,
            body_len: 0,
        }
    }
}

impl Header {
    /// Header describing `body`.
    pub fn for_body(body: &[u8]) -> Result<Self> {
        let body_len = u32::try_from(body.len()).map_err(|_| CodecError::PayloadTooLarge {
            size: body.len(),
            limit: u32::MAX as usize,
        })?;
        Ok(Self {
            checksum: crc32fast::hash(body),
            body_len,
            ..Self::default()
        })
    }

    /// Decode the header from the first 16 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(CodecError::TooSmall(bytes.len()));
        }
        Ok(Self {
            magic: [bytes[0], bytes[1], bytes[2], bytes[3]],
            version: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
            checksum: u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]),
            body_len: u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]),
        })
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4..8].copy_from_slice(&self.version.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.checksum.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.body_len.to_le_bytes());
        bytes
    }

    pub fn validate_magic(&self) -> bool {
        self.magic == MAGIC
    }

    pub fn validate_version(&self) -> bool {
        self.version == VERSION
    }
}

/// Prefix `body` with its header.
pub fn seal(body: &[u8]) -> Result<Vec<u8>> {
    let header = Header::for_body(body)?;
    let mut output = Vec::with_capacity(HEADER_SIZE + body.len());
    output.extend_from_slice(&header.to_bytes());
    output.extend_from_slice(body);
    Ok(output)
}

/// Validate the envelope and return its body.
pub fn open(bytes: &[u8]) -> Result<&[u8]> {
    let header = Header::from_bytes(bytes)?;
    if !header.validate_magic() {
        return Err(CodecError::InvalidMagic);
    }
    if !header.validate_version() {
        return Err(CodecError::UnsupportedVersion(header.version));
    }
    let body = &bytes[HEADER_SIZE..];
    if header.body_len as usize != body.len() {
        return Err(CodecError::SizeMismatch {
            header: header.body_len,
            actual: body.len(),
        });
    }
    let actual = crc32fast::hash(body);
    if actual != header.checksum {
        return Err(CodecError::ChecksumMismatch {
            expected: header.checksum,
            actual,
        });
    }
    Ok(body)
}
