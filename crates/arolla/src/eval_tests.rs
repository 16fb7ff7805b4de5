use arolla_core::QValue;
use arolla_eval::EvalError;
use arolla_expr::{Expr, ExprError, Registry};
use insta::assert_snapshot;

use crate::eval::{call, eval, invoke};
use crate::ops::default_registry;

#[test]
fn default_registry_is_the_global_one() {
    let registry = default_registry();

    assert!(std::ptr::eq(registry, Registry::global()));
    for name in ["math.add", "core.getattr", "seq.make"] {
        assert!(registry.contains(name), "{name} is not registered");
    }
}

#[test]
fn invoke_by_name() {
    assert_eq!(invoke("math.add", &[1.into(), 2.into()]).unwrap(), QValue::from(3));
}

#[test]
fn invoke_unknown_operator() {
    let err = invoke("math.nope", &[]).unwrap_err();

    assert!(matches!(err, EvalError::Expr(ExprError::OperatorNotFound(_))));
    assert_snapshot!(err, @r#"operator "math.nope" is not registered"#);
}

#[test]
fn call_then_eval() {
    let expr = call("math.multiply", [Expr::leaf("x"), Expr::literal(2)]).unwrap();

    let result = eval(&expr, &[("x", QValue::from(21))]).unwrap();

    assert_eq!(result, QValue::from(42));
}

#[test]
fn eval_reports_missing_input() {
    let expr = call("math.neg", [Expr::leaf("x")]).unwrap();

    let err = eval(&expr, &[]).unwrap_err();

    assert_snapshot!(err, @"no qtype given for leaf L.x");
}
