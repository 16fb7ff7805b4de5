//! Process-wide cache-clear broadcast.
//!
//! Independent subsystems register a named clear callback once, at
//! initialization. [`clear_all_caches`] runs every callback, so no caller needs
//! to know which caches exist.

use std::sync::{Arc, LazyLock};

use parking_lot::Mutex;

type ClearFn = Arc<dyn Fn() + Send + Sync>;

static HOOKS: LazyLock<Mutex<Vec<(&'static str, ClearFn)>>> =
    LazyLock::new(|| Mutex::new(Vec::new()));

/// Subscribe a cache to [`clear_all_caches`].
///
/// Registering the same name twice replaces the earlier callback.
pub fn register_cache_clear_hook(name: &'static str, clear: impl Fn() + Send + Sync + 'static) {
    let mut hooks = HOOKS.lock();
    match hooks.iter_mut().find(|(n, _)| *n == name) {
        Some(entry) => entry.1 = Arc::new(clear),
        None => hooks.push((name, Arc::new(clear))),
    }
}

/// Names of the subscribed caches, in registration order.
pub fn registered_cache_hooks() -> Vec<&'static str> {
    HOOKS.lock().iter().map(|(name, _)| *name).collect()
}

/// Clear every subscribed cache.
///
/// Callbacks run outside the hook lock.
pub fn clear_all_caches() {
    let hooks: Vec<(&'static str, ClearFn)> = HOOKS.lock().clone();
    for (name, clear) in &hooks {
        tracing::debug!(hook = name, "clearing cache");
        clear();
    }
}
