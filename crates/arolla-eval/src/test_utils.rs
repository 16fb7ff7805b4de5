//! Operators shared by unit tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use arolla_core::qtype::{FLOAT32, INT32, is_numeric_qtype};
use arolla_core::{QType, QValue, Scalar};
use arolla_expr::operator::KernelError;
use arolla_expr::{Operator, Signature};

fn binary_numeric(name: &str, f: fn(f64, f64) -> f64) -> Operator {
    Operator::builder(name)
        .signature(Signature::from_names(&["x", "y"]))
        .backend(
            |inputs: &[QType]| match inputs {
                [x, y] if x == y && is_numeric_qtype(*x) => Ok(*x),
                [x, y] => Err(format!("expected equal numeric inputs, got {x} and {y}")),
                _ => Err("expected two inputs".to_owned()),
            },
            move |inputs: &[QValue], output| {
                let x = inputs[0].as_scalar().and_then(Scalar::as_f64);
                let y = inputs[1].as_scalar().and_then(Scalar::as_f64);
                match (x, y, output) {
                    (Some(x), Some(y), q) if q == INT32 => Ok(QValue::from(f(x, y) as i32)),
                    (Some(x), Some(y), q) if q == FLOAT32 => Ok(QValue::from(f(x, y) as f32)),
                    _ => Err(KernelError::new("unsupported inputs")),
                }
            },
        )
        .unwrap()
}

pub fn add_op() -> Operator {
    binary_numeric("test.add", |x, y| x + y)
}

pub fn div_op() -> Operator {
    binary_numeric("test.div", |x, y| x / y)
}

/// INT32 -> INT32 identity that counts kernel invocations.
pub fn counting_op(calls: Arc<AtomicUsize>) -> Operator {
    Operator::builder("test.count")
        .signature(Signature::from_names(&["x"]))
        .backend(
            |_: &[QType]| Ok(INT32),
            move |inputs: &[QValue], _| {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(inputs[0].clone())
            },
        )
        .unwrap()
}

/// Always fails with an I/O error as the cause.
pub fn failing_op() -> Operator {
    Operator::builder("test.fail")
        .signature(Signature::from_names(&["x"]))
        .backend(
            |_: &[QType]| Ok(INT32),
            |_: &[QValue], _| {
                Err(KernelError::with_source(
                    "kernel gave up",
                    std::io::Error::other("disk on fire"),
                ))
            },
        )
        .unwrap()
}

/// Claims INT32 output but returns FLOAT32.
pub fn lying_op() -> Operator {
    Operator::builder("test.lie")
        .signature(Signature::from_names(&["x"]))
        .backend(|_: &[QType]| Ok(INT32), |_: &[QValue], _| Ok(QValue::from(1.0f32)))
        .unwrap()
}
