use std::collections::HashMap;

use arolla_core::qtype::INT32;
use arolla_core::QValue;

use crate::expr::Expr;
use crate::substitution::{
    substitute_by_fingerprint, substitute_by_name, substitute_leaves, substitute_operators,
    substitute_placeholders,
};
use crate::test_utils::add_op;

fn subs(pairs: &[(&str, Expr)]) -> HashMap<String, Expr> {
    pairs
        .iter()
        .map(|(key, expr)| ((*key).to_owned(), expr.clone()))
        .collect()
}

#[test]
fn leaves_are_replaced_and_input_untouched() {
    let add = add_op("test.add");
    let expr = Expr::call(&add, [Expr::leaf("x"), Expr::leaf("y")]).unwrap();
    let before = expr.fingerprint();

    let result = substitute_leaves(&expr, &subs(&[("x", Expr::literal(1))])).unwrap();

    assert_eq!(expr.fingerprint(), before);
    assert_eq!(result.leaf_keys(), vec!["y"]);
    assert_eq!(result.deps()[0].qvalue(), Some(&QValue::from(1)));
}

#[test]
fn typed_leaves_match_by_key() {
    let add = add_op("test.add");
    let expr = Expr::call(&add, [Expr::typed_leaf("x", INT32), Expr::literal(2)]).unwrap();

    let result = substitute_leaves(&expr, &subs(&[("x", Expr::literal(5))])).unwrap();

    assert!(result.leaf_keys().is_empty());
    assert_eq!(result.qtype(), Some(INT32));
}

#[test]
fn shared_subtrees_are_replaced_everywhere() {
    let add = add_op("test.add");
    let shared = Expr::call(&add, [Expr::leaf("x"), Expr::leaf("x")]).unwrap();
    let expr = Expr::call(&add, [shared.clone(), shared]).unwrap();

    let result = substitute_leaves(&expr, &subs(&[("x", Expr::leaf("z"))])).unwrap();

    assert_eq!(result.leaf_keys(), vec!["z"]);
    assert_eq!(result.deps()[0], result.deps()[1]);
}

#[test]
fn placeholders_are_replaced() {
    let add = add_op("test.add");
    let expr = Expr::call(&add, [Expr::placeholder("a"), Expr::leaf("a")]).unwrap();

    let result = substitute_placeholders(&expr, &subs(&[("a", Expr::leaf("b"))])).unwrap();

    assert!(result.placeholder_keys().is_empty());
    assert_eq!(result.leaf_keys(), vec!["a", "b"]);
}

#[test]
fn nodes_are_replaced_by_fingerprint() {
    let add = add_op("test.add");
    let inner = Expr::call(&add, [Expr::leaf("x"), Expr::leaf("y")]).unwrap();
    let expr = Expr::call(&add, [inner.clone(), Expr::leaf("z")]).unwrap();

    let map = HashMap::from([(inner.fingerprint(), Expr::leaf("w"))]);
    let result = substitute_by_fingerprint(&expr, &map).unwrap();

    assert_eq!(result.leaf_keys(), vec!["w", "z"]);
}

#[test]
fn operator_calls_are_replaced_by_name() {
    let add = add_op("test.add");
    let mul = add_op("test.mul");
    let inner = Expr::call(&mul, [Expr::leaf("x"), Expr::leaf("y")]).unwrap();
    let expr = Expr::call(&add, [inner, Expr::leaf("z")]).unwrap();

    let result = substitute_by_name(&expr, &subs(&[("test.mul", Expr::leaf("m"))])).unwrap();

    assert_eq!(result.leaf_keys(), vec!["m", "z"]);
}

#[test]
fn operators_are_swapped_keeping_deps() {
    let add = add_op("test.add");
    let other = add_op("test.other");
    let expr = Expr::call(&add, [Expr::leaf("x"), Expr::leaf("y")]).unwrap();

    let ops = HashMap::from([("test.add".to_owned(), other.clone())]);
    let result = substitute_operators(&expr, &ops).unwrap();

    assert_eq!(result.op(), Some(&other));
    assert_eq!(result.deps(), expr.deps());
}

#[test]
fn absent_subexpression_leaves_graph_unchanged() {
    let add = add_op("test.add");
    let expr = Expr::call(&add, [Expr::leaf("x"), Expr::leaf("y")]).unwrap();
    let elsewhere = Expr::call(&add, [Expr::leaf("p"), Expr::leaf("q")]).unwrap();

    let map = HashMap::from([(elsewhere.fingerprint(), Expr::leaf("w"))]);
    let result = substitute_by_fingerprint(&expr, &map).unwrap();
    assert_eq!(result, expr);

    let result = substitute_leaves(&expr, &subs(&[("nope", Expr::leaf("w"))])).unwrap();
    assert_eq!(result, expr);
}

#[test]
fn disjoint_leaf_and_placeholder_substitutions_commute() {
    let add = add_op("test.add");
    let left = Expr::call(&add, [Expr::leaf("a"), Expr::placeholder("x")]).unwrap();
    let right = Expr::call(&add, [Expr::placeholder("y"), Expr::leaf("b")]).unwrap();
    let expr = Expr::call(&add, [left, right]).unwrap();
    let leaves = subs(&[("a", Expr::literal(1)), ("b", Expr::literal(2))]);
    let placeholders = subs(&[("x", Expr::leaf("c")), ("y", Expr::literal(3))]);

    let leaves_first =
        substitute_placeholders(&substitute_leaves(&expr, &leaves).unwrap(), &placeholders)
            .unwrap();
    let placeholders_first =
        substitute_leaves(&substitute_placeholders(&expr, &placeholders).unwrap(), &leaves)
            .unwrap();

    assert_eq!(leaves_first, placeholders_first);
    assert_eq!(leaves_first.leaf_keys(), vec!["c"]);
}

#[test]
fn empty_substitution_returns_same_graph() {
    let expr = Expr::leaf("x");
    let result = substitute_leaves(&expr, &HashMap::new()).unwrap();
    assert_eq!(result.fingerprint(), expr.fingerprint());
}
