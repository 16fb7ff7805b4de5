use arolla_core::qtype::{FLOAT32, INT32, TEXT};

use super::{Operator, OperatorKind, Overload};
use crate::condition::{QTypeCondition, QTypeTest};
use crate::error::ExprError;
use crate::expr::Expr;
use crate::signature::Signature;
use crate::test_utils::{add_op, to_float_op};

fn double_lambda() -> Operator {
    let add = add_op("test.add");
    let body = Expr::call(&add, [Expr::placeholder("x"), Expr::placeholder("x")]).unwrap();
    Operator::builder("test.double")
        .signature(Signature::from_names(&["x"]))
        .lambda(body)
        .unwrap()
}

#[test]
fn lambda_attr_comes_from_expanded_body() {
    let double = double_lambda();
    let expr = Expr::call(&double, [Expr::typed_leaf("v", FLOAT32)]).unwrap();

    assert_eq!(expr.qtype(), Some(FLOAT32));
    assert!(!double.is_terminal());
}

#[test]
fn lambda_lower_substitutes_placeholders() {
    let double = double_lambda();
    let lowered = double.lower(&[Expr::leaf("v")]).unwrap().unwrap();

    assert_eq!(lowered.deps(), &[Expr::leaf("v"), Expr::leaf("v")]);
    assert!(lowered.placeholder_keys().is_empty());
}

#[test]
fn lambda_signature_defaults_to_sorted_placeholders() {
    let add = add_op("test.add");
    let body = Expr::call(&add, [Expr::placeholder("y"), Expr::placeholder("x")]).unwrap();
    let op = Operator::builder("test.lambda").lambda(body).unwrap();

    assert_eq!(op.signature(), &Signature::from_names(&["x", "y"]));
}

#[test]
fn lambda_rejects_unbound_placeholders_and_variadics() {
    let err = Operator::builder("test.lambda")
        .signature(Signature::from_names(&["x"]))
        .lambda(Expr::placeholder("y"))
        .unwrap_err();
    insta::assert_snapshot!(err, @"test.lambda: lambda body uses P.y, which is not a parameter");

    let err = Operator::builder("test.lambda")
        .signature(Signature::new().variadic("args"))
        .lambda(Expr::literal(1))
        .unwrap_err();
    insta::assert_snapshot!(err, @r#"invalid signature: lambda test.lambda cannot take variadic parameter "args""#);
}

#[test]
fn overloaded_dispatches_in_order() {
    let from_int = to_float_op("test.from_int", INT32);
    let from_text = to_float_op("test.from_text", TEXT);
    let op = Operator::builder("test.to_float")
        .signature(Signature::from_names(&["x"]))
        .overloaded(vec![
            Overload::new(from_int.clone(), QTypeCondition::is("x", INT32)),
            Overload::new(from_text.clone(), QTypeCondition::param("x", QTypeTest::Text)),
        ])
        .unwrap();

    let int_call = op.lower(&[Expr::literal(1)]).unwrap().unwrap();
    assert_eq!(int_call.op(), Some(&from_int));

    let text_call = op.lower(&[Expr::literal("a")]).unwrap().unwrap();
    assert_eq!(text_call.op(), Some(&from_text));
}

#[test]
fn first_matching_overload_wins() {
    let first = to_float_op("test.first", INT32);
    let second = to_float_op("test.second", TEXT);
    let third = to_float_op("test.third", INT32);
    let op = Operator::builder("test.pick")
        .signature(Signature::from_names(&["x"]))
        .overloaded(vec![
            Overload::new(first.clone(), QTypeCondition::is("x", INT32)),
            Overload::new(second, QTypeCondition::is("x", TEXT)),
            Overload::new(third, QTypeCondition::param("x", QTypeTest::Numeric)),
        ])
        .unwrap();

    for _ in 0..3 {
        let call = op.lower(&[Expr::typed_leaf("v", INT32)]).unwrap().unwrap();
        assert_eq!(call.op(), Some(&first));
    }
}

#[test]
fn overloaded_reports_argument_qtypes_when_nothing_matches() {
    let op = Operator::builder("test.getattr")
        .signature(Signature::from_names(&["obj", "key"]))
        .overloaded(vec![])
        .unwrap();

    let err = Expr::call(&op, [Expr::literal(1.0f32), Expr::literal("k")]).unwrap_err();
    assert!(matches!(
        &err,
        ExprError::NoMatchingOverload { qtypes, .. } if *qtypes == [FLOAT32, TEXT]
    ));
    insta::assert_snapshot!(err, @"test.getattr: no matching overload [obj: FLOAT32, key: TEXT]");
}

#[test]
fn overloaded_waits_for_unknown_qtypes() {
    let op = Operator::builder("test.getattr")
        .signature(Signature::from_names(&["obj"]))
        .overloaded(vec![])
        .unwrap();

    let expr = Expr::call(&op, [Expr::leaf("x")]).unwrap();
    assert!(expr.attr().is_unknown());
    assert!(op.lower(expr.deps()).unwrap().is_none());
}

#[test]
fn accepting_overload_uses_candidate_inference() {
    let op = Operator::builder("test.to_float")
        .signature(Signature::from_names(&["x"]))
        .overloaded(vec![
            Overload::accepting(to_float_op("test.from_text", TEXT)),
            Overload::accepting(to_float_op("test.from_int", INT32)),
        ])
        .unwrap();

    let lowered = op.lower(&[Expr::literal(7)]).unwrap().unwrap();
    assert_eq!(lowered.op().map(Operator::name), Some("test.from_int"));
    assert_eq!(lowered.qtype(), Some(FLOAT32));
}

#[test]
fn overload_condition_must_name_parameters() {
    let err = Operator::builder("test.op")
        .signature(Signature::from_names(&["x"]))
        .overloaded(vec![Overload::new(
            add_op("test.add"),
            QTypeCondition::is("y", INT32),
        )])
        .unwrap_err();
    insta::assert_snapshot!(err, @r#"invalid signature: overload condition of test.op refers to unknown parameter "y""#);
}

#[test]
fn condition_combinators() {
    let sig = Signature::from_names(&["x", "y"]);
    let both_int = QTypeCondition::is("x", INT32).and(QTypeCondition::is("y", INT32));
    let either_text = QTypeCondition::param("x", QTypeTest::Text)
        .or(QTypeCondition::param("y", QTypeTest::Text));

    assert!(both_int.eval(&sig, &[INT32, INT32]));
    assert!(!both_int.eval(&sig, &[INT32, FLOAT32]));
    assert!(either_text.eval(&sig, &[INT32, TEXT]));
    assert!(either_text.clone().not().eval(&sig, &[INT32, INT32]));
    assert_ne!(both_int.fingerprint(), either_text.fingerprint());
}

#[test]
fn kind_is_exposed() {
    assert!(matches!(Operator::get_nth(0).kind(), OperatorKind::GetNth(0)));
    assert!(matches!(double_lambda().kind(), OperatorKind::Lambda(_)));
}
