//! One-call helpers over the default registry.

use arolla_core::QValue;
use arolla_eval::{Result, eval_expr, invoke_op};
use arolla_expr::Expr;

use crate::ops::default_registry;

/// Build a call to the standard operator `name`.
pub fn call(name: &str, args: impl IntoIterator<Item = Expr>) -> arolla_expr::Result<Expr> {
    default_registry().call(name, args)
}

/// Evaluate `expr` with the given leaf values.
pub fn eval(expr: &Expr, inputs: &[(&str, QValue)]) -> Result<QValue> {
    eval_expr(expr, inputs)
}

/// Apply the standard operator `name` to argument values.
pub fn invoke(name: &str, args: &[QValue]) -> Result<QValue> {
    let op = default_registry().lookup(name)?;
    invoke_op(&op, args)
}
