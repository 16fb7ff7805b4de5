//! One-call evaluation helpers. Both go through [`compile`], so repeated
//! calls with the same qtypes hit the compile cache.

use arolla_core::{QType, QValue};
use arolla_expr::{Expr, Operator};

use crate::compiler::compile;
use crate::error::Result;
use crate::options::CompileOptions;

/// Evaluate `expr` with the given leaf values.
pub fn eval_expr(expr: &Expr, inputs: &[(&str, QValue)]) -> Result<QValue> {
    let input_qtypes: Vec<(&str, QType)> = inputs
        .iter()
        .map(|(key, value)| (*key, value.qtype()))
        .collect();
    compile(expr, &input_qtypes, CompileOptions::default())?.execute(inputs)
}

/// Apply `op` to positional argument values.
pub fn invoke_op(op: &Operator, args: &[QValue]) -> Result<QValue> {
    let keys: Vec<String> = (0..args.len()).map(|i| format!("_{i}")).collect();
    let expr = Expr::call(op, keys.iter().map(Expr::leaf))?;
    let inputs: Vec<(&str, QValue)> = keys
        .iter()
        .map(String::as_str)
        .zip(args.iter().cloned())
        .collect();
    eval_expr(&expr, &inputs)
}
