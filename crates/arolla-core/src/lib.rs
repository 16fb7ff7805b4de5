#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core data structures for the Arolla expression runtime.
//!
//! - `qtype` - canonical, process-wide value types
//! - `qvalue` - immutable values tagged with a qtype
//! - `fingerprint` - content-derived 128-bit identities
//! - `cache` - the cache-clear broadcast shared by every subsystem

pub mod cache;
pub mod error;
pub mod fingerprint;
pub mod qtype;
pub mod qvalue;

#[cfg(test)]
mod fingerprint_tests;

pub use cache::{clear_all_caches, register_cache_clear_hook};
pub use error::{QTypeError, Result};
pub use fingerprint::{Fingerprint, FingerprintHasher};
pub use qtype::{QType, QTypeKind, ScalarKind};
pub use qvalue::{ForeignObject, QValue, Scalar, downcast, upcast};
