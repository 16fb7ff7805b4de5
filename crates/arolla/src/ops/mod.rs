//! The standard operator library.
//!
//! [`register_standard_operators`] fills any [`Registry`]; [`default_registry`]
//! is the process-wide registry with the library already registered.

use std::sync::LazyLock;

use arolla_expr::{Registry, Result};

mod core_ops;
mod math_ops;
mod seq_ops;

#[cfg(test)]
mod math_ops_tests;
#[cfg(test)]
mod seq_ops_tests;

pub use core_ops::get_nth;

static STANDARD_LIBRARY: LazyLock<()> = LazyLock::new(|| {
    if let Err(err) = register_standard_operators(Registry::global()) {
        tracing::warn!(error = %err, "standard operators are only partly registered");
    }
});

/// Register `math.*`, `core.*` and `seq.*` into `registry` and install their
/// text representations.
pub fn register_standard_operators(registry: &Registry) -> Result<()> {
    math_ops::register(registry)?;
    core_ops::register(registry)?;
    seq_ops::register(registry)?;
    crate::repr::register_standard_reprs();
    Ok(())
}

/// The global registry, populated with the standard library on first use.
pub fn default_registry() -> &'static Registry {
    LazyLock::force(&STANDARD_LIBRARY);
    Registry::global()
}
