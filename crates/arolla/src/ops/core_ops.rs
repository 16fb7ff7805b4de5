//! `core.*`: comparisons, presence, tuples and attribute access.

use std::cmp::Ordering;

use arolla_core::qtype::{QTypeShape, UNIT, optional_qtype, scalar_qtype_of, tuple_qtype};
use arolla_core::{QType, QValue, Scalar};
use arolla_expr::{Expr, KernelError, Operator, Registry, Result, Signature};

use crate::lifting::{RuleResult, comparison_rule, kind_of, operand_kind, pointwise};

pub(super) fn register(registry: &Registry) -> Result<()> {
    let comparisons: [(&str, &str, fn(Option<Ordering>) -> bool); 6] = [
        ("core.equal", "Returns x == y.", |o| o == Some(Ordering::Equal)),
        ("core.not_equal", "Returns x != y.", |o| o != Some(Ordering::Equal)),
        ("core.less", "Returns x < y.", |o| o == Some(Ordering::Less)),
        ("core.less_equal", "Returns x <= y.", |o| {
            matches!(o, Some(Ordering::Less | Ordering::Equal))
        }),
        ("core.greater", "Returns x > y.", |o| o == Some(Ordering::Greater)),
        ("core.greater_equal", "Returns x >= y.", |o| {
            matches!(o, Some(Ordering::Greater | Ordering::Equal))
        }),
    ];
    for (name, doc, test) in comparisons {
        registry.register(comparison(name, doc, test)?)?;
    }

    let has = Operator::builder("core.has")
        .doc("Returns present for present values, missing otherwise.")
        .signature(Signature::from_names(&["x"]))
        .backend(presence_rule, |args, output| {
            let kind = kind_of(args[0].qtype())?;
            pointwise(args, output, kind, |_| Ok(Scalar::Unit))
        })?;
    registry.register(has)?;

    let to_optional = Operator::builder("core.to_optional")
        .doc("Wraps a scalar into an optional; optionals pass through.")
        .signature(Signature::from_names(&["x"]))
        .backend(to_optional_rule, |args, output| {
            let [arg] = args else {
                return Err(KernelError::new("expected 1 argument"));
            };
            if arg.qtype() == output {
                return Ok(arg.clone());
            }
            let value_qtype = scalar_qtype_of(output)
                .ok_or_else(|| KernelError::new(format!("{output} is not an optional")))?;
            QValue::optional(value_qtype, arg.as_scalar().cloned())
                .map_err(|err| KernelError::with_source("cannot build the result", err))
        })?;
    registry.register(to_optional)?;

    let make_tuple = Operator::builder("core.make_tuple")
        .doc("Returns a tuple of the arguments.")
        .signature(Signature::new().variadic("args"))
        .backend(
            |inputs: &[QType]| Ok(tuple_qtype(inputs)),
            |args, _| Ok(QValue::tuple(args.to_vec())),
        )?;
    registry.register(make_tuple)?;

    for (name, index) in [("core.get_first", 0), ("core.get_second", 1)] {
        let body = get_nth(Expr::placeholder("x"), index)?;
        let op = Operator::builder(name)
            .doc(format!("Returns field {index} of a tuple."))
            .signature(Signature::from_names(&["x"]))
            .lambda(body)?;
        registry.register(op)?;
    }

    registry.register_overloaded(
        "core.getattr",
        Signature::from_names(&["obj", "key"]),
        "Returns the attribute `key` of `obj`. Behaviour is added by overloads.",
    )?;
    Ok(())
}

/// `value[index]` for a tuple or named tuple.
pub fn get_nth(value: Expr, index: usize) -> Result<Expr> {
    Expr::call(&Operator::get_nth(index), [value])
}

fn comparison(name: &str, doc: &str, test: fn(Option<Ordering>) -> bool) -> Result<Operator> {
    Operator::builder(name)
        .doc(doc)
        .signature(Signature::from_names(&["x", "y"]))
        .backend(comparison_rule, move |args, output| {
            let kind = operand_kind(args)?;
            pointwise(args, output, kind, |xs| {
                Ok(Scalar::Boolean(test(compare(&xs[0], &xs[1]))))
            })
        })
}

/// Order of two payloads of one kind. NaN is unordered.
fn compare(x: &Scalar, y: &Scalar) -> Option<Ordering> {
    match (x, y) {
        (Scalar::Unit, Scalar::Unit) => Some(Ordering::Equal),
        (Scalar::Boolean(a), Scalar::Boolean(b)) => Some(a.cmp(b)),
        (Scalar::Int32(a), Scalar::Int32(b)) => Some(a.cmp(b)),
        (Scalar::Int64(a), Scalar::Int64(b)) => Some(a.cmp(b)),
        (Scalar::Float32(a), Scalar::Float32(b)) => a.partial_cmp(b),
        (Scalar::Float64(a), Scalar::Float64(b)) => a.partial_cmp(b),
        (Scalar::Bytes(a), Scalar::Bytes(b)) => Some(a.cmp(b)),
        (Scalar::Text(a), Scalar::Text(b)) => Some(a.cmp(b)),
        (Scalar::QType(a), Scalar::QType(b)) if a == b => Some(Ordering::Equal),
        _ => None,
    }
}

/// Presence mask: OPTIONAL_UNIT, or DENSE_ARRAY_UNIT for arrays.
fn presence_rule(inputs: &[QType]) -> RuleResult {
    let [x] = inputs else {
        return Err(format!("expected 1 argument, got {}", inputs.len()));
    };
    let shape = match QTypeShape::of(*x) {
        Some(QTypeShape::DenseArray) => QTypeShape::DenseArray,
        Some(_) => QTypeShape::Optional,
        None => return Err(format!("expected a scalar, optional or array, got {x}")),
    };
    shape.apply(UNIT).map_err(|err| err.to_string())
}

fn to_optional_rule(inputs: &[QType]) -> RuleResult {
    let [x] = inputs else {
        return Err(format!("expected 1 argument, got {}", inputs.len()));
    };
    match QTypeShape::of(*x) {
        Some(QTypeShape::Scalar) => optional_qtype(*x).map_err(|err| err.to_string()),
        Some(QTypeShape::Optional) => Ok(*x),
        _ => Err(format!("expected a scalar or optional, got {x}")),
    }
}
