#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Arolla expression runtime.
//!
//! Re-exports the layers of the runtime and adds the standard operator
//! library (`math.*`, `core.*`, `seq.*`) on top of them.
//!
//! ```ignore
//! use arolla::{Expr, QValue, call, eval};
//!
//! let x_plus_y = call("math.add", [Expr::leaf("x"), Expr::leaf("y")])?;
//! let expr = call("math.divide", [x_plus_y, Expr::leaf("z")])?;
//! let result = eval(&expr, &[("x", 1.0f32.into()), ("y", 2.0f32.into()), ("z", 3.0f32.into())])?;
//! assert_eq!(result, QValue::from(1.0f32));
//! ```

pub mod eval;
mod lifting;
pub mod ops;
pub mod repr;

#[cfg(test)]
mod eval_tests;

pub use arolla_core::{
    Fingerprint, ForeignObject, QType, QTypeError, QTypeKind, QValue, Scalar, ScalarKind,
    clear_all_caches, downcast, qtype, register_cache_clear_hook, upcast,
};
pub use arolla_eval::{
    CompileOptions, CompiledExpr, EvalError, compile, compile_uncached, eval_expr, invoke_op,
};
pub use arolla_expr::{
    Attr, Expr, ExprError, Operator, Overload, QTypeCondition, QTypeTest, Registry, Signature,
    substitute_by_fingerprint, substitute_by_name, substitute_leaves, substitute_operators,
    substitute_placeholders, to_lowest,
};
pub use arolla_serialization::{
    Codec, CodecError, CodecRegistry, DecodeOptions, JsonCodec, decode_value, encode_value,
};

pub use eval::{call, eval, invoke};
pub use ops::{default_registry, get_nth, register_standard_operators};
