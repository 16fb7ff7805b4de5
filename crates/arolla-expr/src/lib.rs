#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Expression graphs for the Arolla expression runtime.
//!
//! - `expr` - immutable, fingerprinted expression nodes with cached attrs
//! - `operator` - operator kinds, qtype inference and lowering steps
//! - `registry` - named operators, overload registration, late binding
//! - `substitution` / `visitors` - structure-preserving rewrites
//! - `lowering` - rewriting to terminal operators
//! - `repr` - human-readable expression text

pub mod attr;
pub mod condition;
pub mod error;
pub mod expr;
pub mod lowering;
pub mod operator;
pub mod registry;
pub mod repr;
pub mod signature;
pub mod substitution;
pub mod visitors;

#[cfg(test)]
mod expr_tests;
#[cfg(test)]
mod substitution_tests;
#[cfg(test)]
mod test_utils;

pub use attr::Attr;
pub use condition::{QTypeCondition, QTypeTest};
pub use error::{ExprError, Result};
pub use expr::{Expr, ExprKind};
pub use lowering::to_lowest;
pub use operator::{
    KernelError, MAX_EXPANSION_DEPTH, Operator, OperatorBuilder, OperatorKind, Overload,
    OverloadCondition,
};
pub use registry::{Registry, RegistryStamp, track_resolutions};
pub use signature::{Parameter, ParameterKind, Signature};
pub use substitution::{
    substitute_by_fingerprint, substitute_by_name, substitute_leaves, substitute_operators,
    substitute_placeholders,
};
pub use visitors::{post_order, transform};
