use arolla_core::qtype::{BOOLEAN, FLOAT32, FLOAT64, INT32, OPTIONAL_BOOLEAN};
use arolla_core::{QValue, Scalar};
use arolla_eval::{EvalError, invoke_op};
use arolla_expr::Registry;
use insta::assert_snapshot;

use crate::ops::register_standard_operators;

fn registry() -> Registry {
    let registry = Registry::new();
    register_standard_operators(&registry).unwrap();
    registry
}

fn run(name: &str, args: &[QValue]) -> Result<QValue, EvalError> {
    let registry = registry();
    invoke_op(&registry.lookup(name).unwrap(), args)
}

#[test]
fn add_same_width() {
    assert_eq!(run("math.add", &[1.into(), 2.into()]).unwrap(), QValue::from(3));
}

#[test]
fn add_promotes_to_common_scalar() {
    let result = run("math.add", &[1.into(), 2.5_f32.into()]).unwrap();

    assert_eq!(result.qtype(), FLOAT32);
    assert_eq!(result, QValue::from(3.5_f32));
}

#[test]
fn int32_overflow_wraps() {
    let result = run("math.add", &[i32::MAX.into(), 1.into()]).unwrap();

    assert_eq!(result, QValue::from(i32::MIN));
}

#[test]
fn missing_operand_gives_missing_result() {
    let result = run("math.add", &[Some(1).into(), None::<i32>.into()]).unwrap();

    assert_eq!(result, QValue::missing(INT32).unwrap());
}

#[test]
fn scalar_broadcasts_over_array() {
    let array = QValue::dense_array(
        INT32,
        vec![Some(Scalar::Int32(1)), None, Some(Scalar::Int32(3))],
    )
    .unwrap();

    let result = run("math.multiply", &[array, 10.into()]).unwrap();

    assert_snapshot!(result, @"dense_array([10, NA, 30])");
}

#[test]
fn array_sizes_must_agree() {
    let two = QValue::dense_array(INT32, vec![None, None]).unwrap();
    let three = QValue::dense_array(INT32, vec![None, None, None]).unwrap();

    let err = run("math.subtract", &[two, three]).unwrap_err();

    assert_eq!(err.operator(), Some("math.subtract"));
    assert_snapshot!(err, @"math.subtract: array size mismatch: 2 vs 3");
}

#[test]
fn integer_division_is_floating() {
    let result = run("math.divide", &[7.into(), 2.into()]).unwrap();

    assert_eq!(result.qtype(), FLOAT32);
    assert_eq!(result, QValue::from(3.5_f32));
}

#[test]
fn floordiv_and_mod_round_towards_negative_infinity() {
    assert_eq!(run("math.floordiv", &[(-7).into(), 2.into()]).unwrap(), QValue::from(-4));
    assert_eq!(run("math.mod", &[(-7).into(), 2.into()]).unwrap(), QValue::from(1));
    assert_eq!(run("math.mod", &[7.into(), (-2).into()]).unwrap(), QValue::from(-1));
    assert_eq!(
        run("math.floordiv", &[(-7.0_f64).into(), 2.0_f64.into()]).unwrap(),
        QValue::from(-4.0_f64)
    );
    assert_eq!(
        run("math.mod", &[(-7.5_f64).into(), 2.0_f64.into()]).unwrap(),
        QValue::from(0.5_f64)
    );
}

#[test]
fn integer_floordiv_by_zero_fails() {
    let err = run("math.floordiv", &[1.into(), 0.into()]).unwrap_err();

    assert!(matches!(&err, EvalError::Evaluation { operator, .. } if operator == "math.floordiv"));
    assert_snapshot!(err, @"math.floordiv: integer division by zero");
}

#[test]
fn integer_mod_by_zero_fails() {
    let err = run("math.mod", &[1_i64.into(), 0_i64.into()]).unwrap_err();

    assert_snapshot!(err, @"math.mod: integer modulo by zero");
}

#[test]
fn pow_of_integers_is_float32() {
    let result = run("math.pow", &[2.into(), 10.into()]).unwrap();

    assert_eq!(result, QValue::from(1024.0_f32));
}

#[test]
fn unary_operators() {
    assert_eq!(run("math.neg", &[5.into()]).unwrap(), QValue::from(-5));
    assert_eq!(run("math.abs", &[(-3.5_f64).into()]).unwrap(), QValue::from(3.5_f64));
    assert_eq!(run("math.abs", &[Some(-2_i64).into()]).unwrap(), QValue::from(Some(2_i64)));
}

#[test]
fn maximum_and_minimum() {
    assert_eq!(run("math.maximum", &[1.into(), 5.into()]).unwrap(), QValue::from(5));
    assert_eq!(run("math.minimum", &[1.into(), 0.5_f32.into()]).unwrap(), QValue::from(0.5_f32));

    let result = run("math.maximum", &[1.0_f64.into(), f64::NAN.into()]).unwrap();
    assert!(result.as_scalar().and_then(Scalar::as_f64).is_some_and(f64::is_nan));
}

#[test]
fn is_nan_is_lifted_boolean() {
    let nan = run("math.is_nan", &[f32::NAN.into()]).unwrap();
    assert_eq!(nan.qtype(), BOOLEAN);
    assert_eq!(nan, QValue::from(true));

    let missing = run("math.is_nan", &[None::<f32>.into()]).unwrap();
    assert_eq!(missing, QValue::missing(BOOLEAN).unwrap());
    assert_eq!(missing.qtype(), OPTIONAL_BOOLEAN);

    let zero = run("math.is_nan", &[0.into()]).unwrap();
    assert_eq!(zero, QValue::from(false));
}

#[test]
fn non_numeric_operands_are_type_errors() {
    let err = run("math.add", &["a".into(), 1.into()]).unwrap_err();

    assert!(matches!(err, EvalError::Expr(ref e) if e.is_type_error()));
    assert_snapshot!(err, @"math.add: expected numeric arguments, got TEXT");
}

#[test]
fn float64_keeps_precision() {
    let result = run("math.add", &[0.1_f64.into(), 0.2_f64.into()]).unwrap();

    assert_eq!(result.qtype(), FLOAT64);
    assert_eq!(result, QValue::from(0.1_f64 + 0.2_f64));
}
