//! Operators shared by unit tests.

use arolla_core::qtype::{FLOAT32, INT32, is_numeric_qtype};
use arolla_core::{QType, QValue, Scalar};

use crate::operator::{KernelError, Operator};
use crate::signature::Signature;

/// Adds two values of the same numeric scalar qtype.
pub fn add_op(name: &str) -> Operator {
    Operator::builder(name)
        .signature(Signature::from_names(&["x", "y"]))
        .doc("Returns x + y.")
        .backend(
            |inputs: &[QType]| match inputs {
                [x, y] if x == y && is_numeric_qtype(*x) => Ok(*x),
                [x, y] => Err(format!("expected equal numeric inputs, got {x} and {y}")),
                _ => Err("expected two inputs".to_owned()),
            },
            |inputs: &[QValue], _| match (inputs[0].as_scalar(), inputs[1].as_scalar()) {
                (Some(Scalar::Int32(x)), Some(Scalar::Int32(y))) => Ok(QValue::from(x + y)),
                (Some(Scalar::Float32(x)), Some(Scalar::Float32(y))) => Ok(QValue::from(x + y)),
                _ => Err(KernelError::new("unsupported inputs")),
            },
        )
        .unwrap()
}

/// Unary operator accepting only `accepted`, returning FLOAT32.
pub fn to_float_op(name: &str, accepted: QType) -> Operator {
    Operator::builder(name)
        .signature(Signature::from_names(&["x"]))
        .backend(
            move |inputs: &[QType]| {
                if inputs == [accepted] {
                    Ok(FLOAT32)
                } else {
                    Err(format!("expected {accepted}, got {}", inputs[0]))
                }
            },
            |inputs: &[QValue], _| {
                let value = inputs[0].payload().and_then(Scalar::as_f64).unwrap_or(0.0);
                Ok(QValue::from(value as f32))
            },
        )
        .unwrap()
}

pub fn int_leaf(key: &str) -> crate::Expr {
    crate::Expr::typed_leaf(key, INT32)
}
