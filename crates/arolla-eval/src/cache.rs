//! Process-wide compiled-expression cache.
//!
//! Keyed by expression fingerprint, sorted input qtypes and compile options.
//! Each entry carries the [`RegistryStamp`]s of the late-bound operators
//! resolved while compiling it; an entry whose stamps are stale is treated as
//! a miss and overwritten in place. Entries are only ever removed all at once,
//! by [`clear_eval_compile_cache`], which is subscribed to
//! [`arolla_core::clear_all_caches`].

use std::sync::{Arc, LazyLock};

use arolla_core::{Fingerprint, QType, register_cache_clear_hook};
use arolla_expr::RegistryStamp;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::options::CompileOptions;
use crate::plan::CompiledExpr;

/// Name the cache is registered under in the cache-clear broadcast.
pub const CACHE_HOOK_NAME: &str = "eval_compile_cache";

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct CacheKey {
    fingerprint: Fingerprint,
    inputs: Vec<(String, QType)>,
    options: CompileOptions,
}

impl CacheKey {
    pub(crate) fn new(
        fingerprint: Fingerprint,
        input_qtypes: &[(&str, QType)],
        options: CompileOptions,
    ) -> Self {
        let mut inputs: Vec<(String, QType)> = input_qtypes
            .iter()
            .map(|(key, qtype)| ((*key).to_owned(), *qtype))
            .collect();
        inputs.sort_by(|a, b| a.0.cmp(&b.0));
        Self {
            fingerprint,
            inputs,
            options,
        }
    }
}

struct CacheEntry {
    compiled: Arc<CompiledExpr>,
    stamps: Vec<RegistryStamp>,
}

impl CacheEntry {
    fn is_current(&self) -> bool {
        self.stamps.iter().all(RegistryStamp::is_current)
    }
}

static CACHE: LazyLock<DashMap<CacheKey, CacheEntry>> = LazyLock::new(|| {
    register_cache_clear_hook(CACHE_HOOK_NAME, clear_eval_compile_cache);
    DashMap::new()
});

/// The cached artifact for `key`, unless a registry it depends on changed.
pub(crate) fn lookup(key: &CacheKey) -> Option<Arc<CompiledExpr>> {
    CACHE
        .get(key)
        .filter(|entry| entry.is_current())
        .map(|entry| Arc::clone(&entry.compiled))
}

/// Insert unless another thread already left a current entry; returns the
/// artifact left in the cache.
pub(crate) fn insert(
    key: CacheKey,
    compiled: Arc<CompiledExpr>,
    stamps: Vec<RegistryStamp>,
) -> Arc<CompiledExpr> {
    let entry = CacheEntry { compiled, stamps };
    match CACHE.entry(key) {
        Entry::Occupied(mut occupied) => {
            if !occupied.get().is_current() {
                tracing::debug!("replacing stale compile cache entry");
                occupied.insert(entry);
            }
            Arc::clone(&occupied.get().compiled)
        }
        Entry::Vacant(vacant) => Arc::clone(&vacant.insert(entry).compiled),
    }
}

/// Drop every cached compiled expression.
pub fn clear_eval_compile_cache() {
    CACHE.clear();
}

/// Number of cached compiled expressions.
pub fn compile_cache_len() -> usize {
    CACHE.len()
}
