//! Content-derived 128-bit fingerprints.
//!
//! Every qtype, qvalue, operator and expression node carries a fingerprint
//! computed from its constituents, so structurally identical objects hash to
//! the same value within and across processes.

use std::fmt;

use siphasher::sip128::{Hasher128, SipHasher as Sip128Hasher};

/// A stable 128-bit content hash.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fingerprint(u128);

impl Fingerprint {
    /// Raw value for serialization/debugging.
    #[inline]
    pub fn as_u128(self) -> u128 {
        self.0
    }

    /// Create a fingerprint from a raw value. Use only for deserialization.
    #[inline]
    pub fn from_raw(value: u128) -> Self {
        Self(value)
    }

    /// Short prefix used in diagnostics.
    pub fn short(self) -> String {
        format!("{:08x}", (self.0 >> 96) as u32)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self.short())
    }
}

/// Incremental fingerprint builder.
///
/// Variable-length inputs are length-prefixed, so `("ab", "c")` and
/// `("a", "bc")` never collide.
#[derive(Clone)]
pub struct FingerprintHasher {
    hasher: Sip128Hasher,
}

impl FingerprintHasher {
    /// Start a hash domain. The salt separates object families
    /// (e.g. leaves from placeholders with the same key).
    pub fn new(salt: &str) -> Self {
        let mut hasher = Self {
            hasher: Sip128Hasher::new(),
        };
        hasher.combine_str(salt);
        hasher
    }

    pub fn combine_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.combine_u64(bytes.len() as u64);
        std::hash::Hasher::write(&mut self.hasher, bytes);
        self
    }

    pub fn combine_str(&mut self, s: &str) -> &mut Self {
        self.combine_bytes(s.as_bytes())
    }

    pub fn combine_u64(&mut self, value: u64) -> &mut Self {
        std::hash::Hasher::write(&mut self.hasher, &value.to_le_bytes());
        self
    }

    pub fn combine_bool(&mut self, value: bool) -> &mut Self {
        self.combine_u64(value as u64)
    }

    pub fn combine_fingerprint(&mut self, fingerprint: Fingerprint) -> &mut Self {
        std::hash::Hasher::write(&mut self.hasher, &fingerprint.0.to_le_bytes());
        self
    }

    pub fn finish(&self) -> Fingerprint {
        Fingerprint(self.hasher.finish128().as_u128())
    }
}
