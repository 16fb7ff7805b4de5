use arolla_core::QValue;
use arolla_core::qtype::{INT32, INT64};
use arolla_eval::{EvalError, invoke_op};
use arolla_expr::Registry;
use insta::assert_snapshot;

use crate::ops::register_standard_operators;

fn registry() -> Registry {
    let registry = Registry::new();
    register_standard_operators(&registry).unwrap();
    registry
}

fn run(registry: &Registry, name: &str, args: &[QValue]) -> Result<QValue, EvalError> {
    invoke_op(&registry.lookup(name).unwrap(), args)
}

#[test]
fn make_size_and_at() {
    let registry = registry();

    let seq = run(&registry, "seq.make", &[1.into(), 2.into(), 3.into()]).unwrap();
    assert_eq!(seq.qtype().value_qtype(), Some(INT32));
    assert_snapshot!(seq, @"sequence(1, 2, 3, value_qtype=INT32)");

    let size = run(&registry, "seq.size", &[seq.clone()]).unwrap();
    assert_eq!(size.qtype(), INT64);
    assert_eq!(size, QValue::from(3_i64));

    let second = run(&registry, "seq.at", &[seq, 1.into()]).unwrap();
    assert_eq!(second, QValue::from(2));
}

#[test]
fn at_out_of_range() {
    let registry = registry();
    let seq = QValue::sequence(INT32, vec![1.into(), 2.into()]).unwrap();

    let err = run(&registry, "seq.at", &[seq.clone(), 5_i64.into()]).unwrap_err();
    assert_snapshot!(err, @"seq.at: index 5 out of range for a sequence of size 2");

    let err = run(&registry, "seq.at", &[seq, (-1).into()]).unwrap_err();
    assert_eq!(err.operator(), Some("seq.at"));
}

#[test]
fn make_requires_one_qtype() {
    let registry = registry();

    let err = run(&registry, "seq.make", &[1.into(), 2.0_f32.into()]).unwrap_err();

    assert_snapshot!(err, @"seq.make: arguments must share one qtype, got INT32 and FLOAT32");
}

#[test]
fn at_requires_integer_index() {
    let registry = registry();
    let seq = QValue::sequence(INT32, vec![1.into()]).unwrap();

    let err = run(&registry, "seq.at", &[seq, 0.5_f32.into()]).unwrap_err();

    assert_snapshot!(err, @"seq.at: expected an integer index, got FLOAT32");
}
