use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use arolla_core::QValue;
use arolla_expr::Expr;
use serial_test::serial;

use crate::cache::compile_cache_len;
use crate::invoke::{eval_expr, invoke_op};
use crate::test_utils::{add_op, counting_op, div_op};

#[test]
#[serial]
fn eval_expr_binds_leaves_by_name() {
    let sum = Expr::call(&add_op(), [Expr::leaf("x"), Expr::leaf("y")]).unwrap();
    let expr = Expr::call(&div_op(), [sum, Expr::leaf("z")]).unwrap();

    let result = eval_expr(
        &expr,
        &[
            ("x", QValue::from(1.0f32)),
            ("y", QValue::from(2.0f32)),
            ("z", QValue::from(3.0f32)),
        ],
    )
    .unwrap();

    assert_eq!(result, QValue::from(1.0f32));
}

#[test]
#[serial]
fn invoke_applies_operator_to_values() {
    let result = invoke_op(&add_op(), &[QValue::from(2), QValue::from(40)]).unwrap();
    assert_eq!(result, QValue::from(42));
}

#[test]
#[serial]
fn invoke_reports_binding_errors() {
    let err = invoke_op(&add_op(), &[QValue::from(2)]).unwrap_err();
    insta::assert_snapshot!(err, @r#"test.add: missing required argument "y""#);
}

#[test]
#[serial]
fn repeated_invoke_reuses_compiled_expression() {
    let calls = Arc::new(AtomicUsize::new(0));
    let op = counting_op(Arc::clone(&calls));

    invoke_op(&op, &[QValue::from(1)]).unwrap();
    let cached = compile_cache_len();
    invoke_op(&op, &[QValue::from(2)]).unwrap();

    assert_eq!(compile_cache_len(), cached);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
