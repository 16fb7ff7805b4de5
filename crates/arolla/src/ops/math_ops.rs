//! `math.*`: pointwise numeric operators.

use arolla_core::{QType, Scalar};
use arolla_expr::{KernelError, Operator, Registry, Result, Signature};

use crate::lifting::{
    RuleResult, arithmetic, floating_rule, kind_of, numeric_predicate_rule, numeric_rule,
    pointwise, unary,
};

type IntFn = fn(i64, i64) -> std::result::Result<i64, KernelError>;
type FloatFn = fn(f64, f64) -> f64;

pub(super) fn register(registry: &Registry) -> Result<()> {
    let add = binary(
        "math.add",
        "Returns x + y.",
        numeric_rule,
        |a, b| Ok(a.wrapping_add(b)),
        |a, b| a + b,
    )?;
    let subtract = binary(
        "math.subtract",
        "Returns x - y.",
        numeric_rule,
        |a, b| Ok(a.wrapping_sub(b)),
        |a, b| a - b,
    )?;
    let multiply = binary(
        "math.multiply",
        "Returns x * y.",
        numeric_rule,
        |a, b| Ok(a.wrapping_mul(b)),
        |a, b| a * b,
    )?;
    let divide = binary(
        "math.divide",
        "Returns x / y. Integer operands divide as FLOAT32.",
        floating_rule,
        float_only,
        |a, b| a / b,
    )?;
    let floor_divide = binary(
        "math.floordiv",
        "Returns x // y, rounded towards negative infinity.",
        numeric_rule,
        floordiv,
        |a, b| (a / b).floor(),
    )?;
    let remainder = binary(
        "math.mod",
        "Returns x % y, with the sign of y.",
        numeric_rule,
        modulo,
        float_mod,
    )?;
    let pow = binary(
        "math.pow",
        "Returns x ** y. Integer operands are raised as FLOAT32.",
        floating_rule,
        float_only,
        f64::powf,
    )?;
    let maximum = binary(
        "math.maximum",
        "Returns the larger of x and y; NaN if either is NaN.",
        numeric_rule,
        |a, b| Ok(a.max(b)),
        |a, b| nan_or(a, b, f64::max),
    )?;
    let minimum = binary(
        "math.minimum",
        "Returns the smaller of x and y; NaN if either is NaN.",
        numeric_rule,
        |a, b| Ok(a.min(b)),
        |a, b| nan_or(a, b, f64::min),
    )?;
    for op in [
        add,
        subtract,
        multiply,
        divide,
        floor_divide,
        remainder,
        pow,
        maximum,
        minimum,
    ] {
        registry.register(op)?;
    }

    registry.register(unary_op("math.neg", "Returns -x.", i64::wrapping_neg, |a| -a)?)?;
    registry.register(unary_op("math.abs", "Returns |x|.", i64::wrapping_abs, f64::abs)?)?;

    let is_nan = Operator::builder("math.is_nan")
        .doc("Returns true for NaN, false for any other present value.")
        .signature(Signature::from_names(&["x"]))
        .backend(numeric_predicate_rule, |args, output| {
            let kind = kind_of(args[0].qtype())?;
            pointwise(args, output, kind, |xs| {
                Ok(Scalar::Boolean(match &xs[0] {
                    Scalar::Float32(v) => v.is_nan(),
                    Scalar::Float64(v) => v.is_nan(),
                    _ => false,
                }))
            })
        })?;
    registry.register(is_nan)?;
    Ok(())
}

fn binary(
    name: &str,
    doc: &str,
    rule: fn(&[QType]) -> RuleResult,
    int: IntFn,
    float: FloatFn,
) -> Result<Operator> {
    Operator::builder(name)
        .doc(doc)
        .signature(Signature::from_names(&["x", "y"]))
        .backend(rule, move |args, output| {
            let kind = kind_of(output)?;
            pointwise(args, output, kind, |xs| arithmetic(xs, int, float))
        })
}

fn unary_op(
    name: &str,
    doc: &str,
    int: fn(i64) -> i64,
    float: fn(f64) -> f64,
) -> Result<Operator> {
    Operator::builder(name)
        .doc(doc)
        .signature(Signature::from_names(&["x"]))
        .backend(numeric_rule, move |args, output| {
            let kind = kind_of(output)?;
            pointwise(args, output, kind, |xs| unary(xs, int, float))
        })
}

/// Arguments of floating-only kernels are cast to a float kind first.
fn float_only(_: i64, _: i64) -> std::result::Result<i64, KernelError> {
    Err(KernelError::new("integer operands reached a floating-point kernel"))
}

fn floordiv(a: i64, b: i64) -> std::result::Result<i64, KernelError> {
    if b == 0 {
        return Err(KernelError::new("integer division by zero"));
    }
    let quotient = a.wrapping_div(b);
    if a.wrapping_rem(b) != 0 && ((a < 0) != (b < 0)) {
        Ok(quotient - 1)
    } else {
        Ok(quotient)
    }
}

fn modulo(a: i64, b: i64) -> std::result::Result<i64, KernelError> {
    if b == 0 {
        return Err(KernelError::new("integer modulo by zero"));
    }
    let rem = a.wrapping_rem(b);
    if rem != 0 && ((rem < 0) != (b < 0)) {
        Ok(rem + b)
    } else {
        Ok(rem)
    }
}

fn float_mod(a: f64, b: f64) -> f64 {
    let rem = a % b;
    if rem != 0.0 && ((rem < 0.0) != (b < 0.0)) {
        rem + b
    } else {
        rem
    }
}

fn nan_or(a: f64, b: f64, pick: fn(f64, f64) -> f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        pick(a, b)
    }
}
