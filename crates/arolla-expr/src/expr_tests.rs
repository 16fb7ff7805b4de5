use arolla_core::qtype::{FLOAT32, FLOAT64, INT32, labeled_qtype, sequence_qtype, tuple_qtype};
use arolla_core::QValue;

use crate::error::ExprError;
use crate::expr::{Expr, ExprKind};
use crate::operator::Operator;
use crate::test_utils::{add_op, int_leaf};

#[test]
fn identical_structure_has_identical_fingerprint() {
    let add = add_op("test.add");
    let a = Expr::call(&add, [Expr::leaf("x"), Expr::literal(1)]).unwrap();
    let b = Expr::call(&add, [Expr::leaf("x"), Expr::literal(1)]).unwrap();
    let c = Expr::call(&add, [Expr::leaf("x"), Expr::literal(2)]).unwrap();

    assert_eq!(a.fingerprint(), b.fingerprint());
    assert_ne!(a.fingerprint(), c.fingerprint());
    assert_eq!(a, b);
}

#[test]
fn typed_leaf_differs_from_untyped_leaf() {
    let untyped = Expr::leaf("x");
    let typed = Expr::typed_leaf("x", INT32);

    assert_ne!(untyped.fingerprint(), typed.fingerprint());
    assert_eq!(untyped.qtype(), None);
    assert_eq!(typed.qtype(), Some(INT32));
    assert_eq!(typed.leaf_key(), Some("x"));
}

#[test]
fn literal_attr_carries_value() {
    let lit = Expr::literal(1.5f32);

    assert_eq!(lit.qtype(), Some(FLOAT32));
    assert_eq!(lit.qvalue(), Some(&QValue::from(1.5f32)));
    assert!(lit.is_literal());
}

#[test]
fn operator_node_infers_qtype_from_deps() {
    let add = add_op("test.add");
    let expr = Expr::call(&add, [int_leaf("x"), Expr::literal(1)]).unwrap();

    assert_eq!(expr.qtype(), Some(INT32));
    assert_eq!(expr.qvalue(), None);
}

#[test]
fn unknown_dep_qtype_gives_unknown_attr() {
    let add = add_op("test.add");
    let expr = Expr::call(&add, [Expr::leaf("x"), Expr::literal(1)]).unwrap();

    assert!(expr.attr().is_unknown());
}

#[test]
fn qtype_rule_rejection_is_reported_at_construction() {
    let add = add_op("test.add");
    let err = Expr::call(&add, [Expr::literal(1), Expr::literal(1.0f32)]).unwrap_err();

    assert!(err.is_type_error());
    insta::assert_snapshot!(err, @"test.add: expected equal numeric inputs, got INT32 and FLOAT32");
}

#[test]
fn from_deps_checks_arity() {
    let add = add_op("test.add");
    let err = Expr::from_deps(&add, vec![Expr::leaf("x")]).unwrap_err();

    assert!(matches!(err, ExprError::Binding { .. }));
    insta::assert_snapshot!(err, @"test.add: expected 2 dependencies, got 1");
}

#[test]
fn leaf_keys_are_sorted_and_unique() {
    let add = add_op("test.add");
    let inner = Expr::call(&add, [Expr::leaf("y"), Expr::leaf("x")]).unwrap();
    let expr = Expr::call(&add, [inner, Expr::leaf("y")]).unwrap();

    assert_eq!(expr.leaf_keys(), vec!["x", "y"]);
    assert!(expr.placeholder_keys().is_empty());
}

#[test]
fn with_new_deps_keeps_identity_when_unchanged() {
    let add = add_op("test.add");
    let expr = Expr::call(&add, [Expr::leaf("x"), Expr::leaf("y")]).unwrap();

    let same = expr.with_new_deps(expr.deps().to_vec()).unwrap();
    let other = expr
        .with_new_deps(vec![Expr::leaf("x"), Expr::leaf("z")])
        .unwrap();

    assert_eq!(same.fingerprint(), expr.fingerprint());
    assert_eq!(other.leaf_keys(), vec!["x", "z"]);
}

#[test]
fn get_nth_reads_field_qtype_and_literal_value() {
    let tuple = QValue::tuple(vec![QValue::from(1), QValue::from(2.5f32)]);
    let expr = Expr::call(&Operator::get_nth(1), [Expr::literal(tuple)]).unwrap();

    assert_eq!(expr.qtype(), Some(FLOAT32));
    assert_eq!(expr.qvalue(), Some(&QValue::from(2.5f32)));

    let typed = Expr::typed_leaf("t", tuple_qtype(&[INT32, FLOAT32]));
    let expr = Expr::call(&Operator::get_nth(0), [typed]).unwrap();
    assert_eq!(expr.qtype(), Some(INT32));
    assert_eq!(expr.qvalue(), None);
}

#[test]
fn get_nth_rejects_non_tuples_and_bad_indices() {
    let err = Expr::call(&Operator::get_nth(0), [Expr::literal(1)]).unwrap_err();
    insta::assert_snapshot!(err, @"core.get_nth: expected a tuple, got INT32");

    let typed = Expr::typed_leaf("t", tuple_qtype(&[INT32]));
    let err = Expr::call(&Operator::get_nth(3), [typed]).unwrap_err();
    insta::assert_snapshot!(err, @"core.get_nth: index 3 out of range for tuple<INT32>");
}

#[test]
fn get_nth_operators_differ_by_index() {
    assert_ne!(
        Operator::get_nth(0).fingerprint(),
        Operator::get_nth(1).fingerprint()
    );
    assert_eq!(
        Operator::get_nth(2).fingerprint(),
        Operator::get_nth(2).fingerprint()
    );
}

#[test]
fn dummy_operator_has_fixed_output() {
    let dummy = Operator::builder("test.dummy")
        .signature(crate::Signature::from_names(&["x"]))
        .dummy(FLOAT32)
        .unwrap();
    let expr = Expr::call(&dummy, [Expr::leaf("x")]).unwrap();

    assert_eq!(expr.qtype(), Some(FLOAT32));
    assert!(matches!(
        expr.kind(),
        ExprKind::Operator { op, .. } if op.is_terminal()
    ));
}

#[test]
fn backend_operators_with_same_name_are_distinct() {
    assert_ne!(
        add_op("test.add").fingerprint(),
        add_op("test.add").fingerprint()
    );
}

#[test]
fn typed_leaves_over_same_named_qtypes_differ() {
    let over_f32 = sequence_qtype(labeled_qtype(FLOAT32, "m").unwrap());
    let over_f64 = sequence_qtype(labeled_qtype(FLOAT64, "m").unwrap());

    let a = Expr::typed_leaf("x", over_f32);
    let b = Expr::typed_leaf("x", over_f64);
    assert_ne!(a.fingerprint(), b.fingerprint());
    assert_ne!(a, b);

    assert_ne!(
        Expr::literal(QValue::from_qtype(over_f32)).fingerprint(),
        Expr::literal(QValue::from_qtype(over_f64)).fingerprint()
    );
}
