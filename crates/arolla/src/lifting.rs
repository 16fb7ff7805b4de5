//! Pointwise lifting of scalar functions over optionals and dense arrays.
//!
//! A kernel is written once over scalar payloads; [`pointwise`] applies it
//! element by element. A missing input element makes the output element
//! missing, and dense array inputs must agree on their size.

use arolla_core::qtype::{
    BOOLEAN, FLOAT32, QTypeShape, broadcast_qtype, common_scalar_qtype, is_floating_point_qtype,
    is_numeric_qtype, scalar_qtype_of,
};
use arolla_core::qvalue::scalar_qtype_for;
use arolla_core::{QType, QValue, Scalar, ScalarKind};
use arolla_expr::KernelError;

pub(crate) type RuleResult = Result<QType, String>;

/// Apply `f` to every aligned set of present payloads, each cast to
/// `arg_kind` first.
pub(crate) fn pointwise<F>(
    inputs: &[QValue],
    output: QType,
    arg_kind: ScalarKind,
    f: F,
) -> Result<QValue, KernelError>
where
    F: Fn(&[Scalar]) -> Result<Scalar, KernelError>,
{
    let out_scalar = scalar_qtype_of(output)
        .ok_or_else(|| KernelError::new(format!("{output} is not a pointwise qtype")))?;
    let apply = |index: usize| -> Result<Option<Scalar>, KernelError> {
        let mut args = Vec::with_capacity(inputs.len());
        for input in inputs {
            let Some(value) = element(input, index) else {
                return Ok(None);
            };
            let cast = value.cast(arg_kind).ok_or_else(|| {
                KernelError::new(format!(
                    "cannot convert {} to {}",
                    value.qtype(),
                    scalar_qtype_for(arg_kind)
                ))
            })?;
            args.push(cast);
        }
        f(&args).map(Some)
    };
    let result = match QTypeShape::of(output) {
        Some(QTypeShape::Scalar) => {
            let value = apply(0)?.ok_or_else(|| KernelError::new("scalar input is missing"))?;
            Ok(QValue::scalar(value))
        }
        Some(QTypeShape::Optional) => QValue::optional(out_scalar, apply(0)?),
        Some(QTypeShape::DenseArray) => {
            let size = array_size(inputs)?;
            let values = (0..size).map(apply).collect::<Result<Vec<_>, _>>()?;
            QValue::dense_array(out_scalar, values)
        }
        None => return Err(KernelError::new(format!("{output} is not a pointwise qtype"))),
    };
    result.map_err(|err| KernelError::with_source("cannot build the result", err))
}

/// Payload at `index` of a scalar, optional or dense array; `None` if missing.
fn element(value: &QValue, index: usize) -> Option<&Scalar> {
    if let Some(scalar) = value.as_scalar() {
        return Some(scalar);
    }
    if let Some(optional) = value.as_optional() {
        return optional;
    }
    value.as_dense_array()?.get(index)?.as_ref()
}

fn array_size(inputs: &[QValue]) -> Result<usize, KernelError> {
    let mut size = None;
    for values in inputs.iter().filter_map(QValue::as_dense_array) {
        match size {
            None => size = Some(values.len()),
            Some(expected) if expected != values.len() => {
                return Err(KernelError::new(format!(
                    "array size mismatch: {expected} vs {}",
                    values.len()
                )));
            }
            Some(_) => {}
        }
    }
    Ok(size.unwrap_or(0))
}

fn check_numeric(inputs: &[QType]) -> Result<(), String> {
    match inputs.iter().find(|qtype| !is_numeric_qtype(**qtype)) {
        Some(bad) => Err(format!("expected numeric arguments, got {bad}")),
        None => Ok(()),
    }
}

/// Numeric inputs, result over their common scalar.
pub(crate) fn numeric_rule(inputs: &[QType]) -> RuleResult {
    check_numeric(inputs)?;
    let scalar = common_scalar_qtype(inputs).map_err(|err| err.to_string())?;
    broadcast_qtype(inputs, scalar).map_err(|err| err.to_string())
}

/// Numeric inputs, floating-point result. Integers promote to FLOAT32.
pub(crate) fn floating_rule(inputs: &[QType]) -> RuleResult {
    check_numeric(inputs)?;
    let common = common_scalar_qtype(inputs).map_err(|err| err.to_string())?;
    let scalar = if is_floating_point_qtype(common) {
        common
    } else {
        FLOAT32
    };
    broadcast_qtype(inputs, scalar).map_err(|err| err.to_string())
}

/// Numeric inputs, BOOLEAN result.
pub(crate) fn numeric_predicate_rule(inputs: &[QType]) -> RuleResult {
    check_numeric(inputs)?;
    broadcast_qtype(inputs, BOOLEAN).map_err(|err| err.to_string())
}

/// Two comparable inputs, BOOLEAN result. Numerics compare across widths,
/// anything else only against its own scalar qtype.
pub(crate) fn comparison_rule(inputs: &[QType]) -> RuleResult {
    let &[x, y] = inputs else {
        return Err(format!("expected 2 arguments, got {}", inputs.len()));
    };
    let (Some(x_scalar), Some(y_scalar)) = (scalar_qtype_of(x), scalar_qtype_of(y)) else {
        return Err(format!("cannot compare {x} with {y}"));
    };
    let numeric = is_numeric_qtype(x_scalar) && is_numeric_qtype(y_scalar);
    if !numeric && x_scalar != y_scalar {
        return Err(format!("cannot compare {x} with {y}"));
    }
    broadcast_qtype(inputs, BOOLEAN).map_err(|err| err.to_string())
}

/// Scalar kind of a pointwise qtype.
pub(crate) fn kind_of(qtype: QType) -> Result<ScalarKind, KernelError> {
    scalar_qtype_of(qtype)
        .and_then(QType::scalar_kind)
        .ok_or_else(|| KernelError::new(format!("{qtype} is not a pointwise qtype")))
}

/// Kind both operands of a comparison are cast to.
pub(crate) fn operand_kind(inputs: &[QValue]) -> Result<ScalarKind, KernelError> {
    let qtypes: Vec<QType> = inputs.iter().map(QValue::qtype).collect();
    if qtypes.iter().all(|qtype| is_numeric_qtype(*qtype)) {
        let common = common_scalar_qtype(&qtypes)
            .map_err(|err| KernelError::with_source("no common numeric qtype", err))?;
        return kind_of(common);
    }
    match qtypes.first() {
        Some(first) => kind_of(*first),
        None => Err(KernelError::new("expected at least one argument")),
    }
}

fn unsupported(args: &[Scalar]) -> KernelError {
    let qtypes: Vec<String> = args.iter().map(|arg| arg.qtype().to_string()).collect();
    KernelError::new(format!("unsupported operands: {}", qtypes.join(", ")))
}

/// Binary numeric kernel. INT32 is computed in `i64` and truncated, so
/// integer overflow wraps at either width.
pub(crate) fn arithmetic(
    args: &[Scalar],
    int: impl Fn(i64, i64) -> Result<i64, KernelError>,
    float: impl Fn(f64, f64) -> f64,
) -> Result<Scalar, KernelError> {
    match args {
        [Scalar::Int32(a), Scalar::Int32(b)] => Ok(Scalar::Int32(int(*a as i64, *b as i64)? as i32)),
        [Scalar::Int64(a), Scalar::Int64(b)] => Ok(Scalar::Int64(int(*a, *b)?)),
        [Scalar::Float32(a), Scalar::Float32(b)] => {
            Ok(Scalar::Float32(float(*a as f64, *b as f64) as f32))
        }
        [Scalar::Float64(a), Scalar::Float64(b)] => Ok(Scalar::Float64(float(*a, *b))),
        _ => Err(unsupported(args)),
    }
}

/// Unary numeric kernel.
pub(crate) fn unary(
    args: &[Scalar],
    int: impl Fn(i64) -> i64,
    float: impl Fn(f64) -> f64,
) -> Result<Scalar, KernelError> {
    match args {
        [Scalar::Int32(a)] => Ok(Scalar::Int32(int(*a as i64) as i32)),
        [Scalar::Int64(a)] => Ok(Scalar::Int64(int(*a))),
        [Scalar::Float32(a)] => Ok(Scalar::Float32(float(*a as f64) as f32)),
        [Scalar::Float64(a)] => Ok(Scalar::Float64(float(*a))),
        _ => Err(unsupported(args)),
    }
}
