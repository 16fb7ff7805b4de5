//! Decoding options.

/// Default upper bound on one encoded foreign payload.
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 64 * 1024 * 1024;
/// Default upper bound on value and qtype nesting.
pub const DEFAULT_MAX_DEPTH: usize = 100;
/// Default upper bound on distinct qtypes one body may declare.
pub const DEFAULT_MAX_QTYPES: usize = 1024;
/// Default upper bound on the size of one declared qtype: one per component,
/// counted at every use, plus the bytes of its labels and field names.
pub const DEFAULT_MAX_QTYPE_SIZE: usize = 64 * 1024;

/// Limits applied while decoding untrusted bytes.
///
/// Qtypes are interned process-wide and never freed, so the qtype limits are
/// checked before anything from the body is interned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodeOptions {
    max_payload_bytes: usize,
    max_depth: usize,
    max_qtypes: usize,
    max_qtype_size: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
            max_depth: DEFAULT_MAX_DEPTH,
            max_qtypes: DEFAULT_MAX_QTYPES,
            max_qtype_size: DEFAULT_MAX_QTYPE_SIZE,
        }
    }
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_payload_bytes(mut self, limit: usize) -> Self {
        self.max_payload_bytes = limit;
        self
    }

    pub fn max_depth(mut self, limit: usize) -> Self {
        self.max_depth = limit;
        self
    }

    pub fn max_qtypes(mut self, limit: usize) -> Self {
        self.max_qtypes = limit;
        self
    }

    pub fn max_qtype_size(mut self, limit: usize) -> Self {
        self.max_qtype_size = limit;
        self
    }

    pub fn get_max_payload_bytes(&self) -> usize {
        self.max_payload_bytes
    }

    pub fn get_max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn get_max_qtypes(&self) -> usize {
        self.max_qtypes
    }

    pub fn get_max_qtype_size(&self) -> usize {
        self.max_qtype_size
    }
}
