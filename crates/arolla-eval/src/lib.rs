#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Compilation and evaluation of Arolla expressions.
//!
//! [`compile`] binds an expression to concrete leaf qtypes, lowers it and
//! produces a [`CompiledExpr`] plan, cached process-wide. [`CompiledExpr::execute`]
//! runs the plan on values of exactly those qtypes.

pub mod cache;
pub mod compiler;
pub mod error;
pub mod invoke;
pub mod options;
pub mod plan;

#[cfg(test)]
mod cache_tests;
#[cfg(test)]
mod invoke_tests;
#[cfg(test)]
mod test_utils;

pub use cache::{clear_eval_compile_cache, compile_cache_len};
pub use compiler::{compile, compile_uncached};
pub use error::{EvalError, Result};
pub use invoke::{eval_expr, invoke_op};
pub use options::CompileOptions;
pub use plan::{CompiledExpr, Instruction};
