use std::sync::Arc;

use arolla_core::qtype::{FLOAT32, INT32};
use arolla_core::{QValue, clear_all_caches};
use arolla_expr::{Expr, Registry, Signature};
use serial_test::serial;

use crate::cache::{CACHE_HOOK_NAME, clear_eval_compile_cache, compile_cache_len};
use crate::compiler::compile;
use crate::options::CompileOptions;
use crate::test_utils::add_op;

fn expr() -> Expr {
    Expr::call(&add_op(), [Expr::leaf("x"), Expr::leaf("y")]).unwrap()
}

#[test]
#[serial]
fn repeated_compile_hits_cache() {
    let expr = expr();
    let first = compile(&expr, &[("x", INT32), ("y", INT32)], CompileOptions::default()).unwrap();
    let second = compile(&expr, &[("y", INT32), ("x", INT32)], CompileOptions::default()).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
#[serial]
fn key_includes_qtypes_and_options() {
    let expr = expr();
    let ints = compile(&expr, &[("x", INT32), ("y", INT32)], CompileOptions::default()).unwrap();
    let floats =
        compile(&expr, &[("x", FLOAT32), ("y", FLOAT32)], CompileOptions::default()).unwrap();
    let unfolded = compile(
        &expr,
        &[("x", INT32), ("y", INT32)],
        CompileOptions::new().fold_literals(false),
    )
    .unwrap();

    assert!(!Arc::ptr_eq(&ints, &floats));
    assert!(!Arc::ptr_eq(&ints, &unfolded));
}

#[test]
#[serial]
fn clear_all_caches_empties_compile_cache() {
    let expr = expr();
    let inputs = [("x", INT32), ("y", INT32)];
    let before = compile(&expr, &inputs, CompileOptions::default()).unwrap();
    assert!(compile_cache_len() > 0);
    assert!(arolla_core::cache::registered_cache_hooks().contains(&CACHE_HOOK_NAME));

    clear_all_caches();
    assert_eq!(compile_cache_len(), 0);

    let after = compile(&expr, &inputs, CompileOptions::default()).unwrap();
    assert!(!Arc::ptr_eq(&before, &after));
    let values = [("x", QValue::from(2)), ("y", QValue::from(3))];
    assert_eq!(
        before.execute(&values).unwrap(),
        after.execute(&values).unwrap()
    );
}

#[test]
#[serial]
fn registry_mutation_invalidates_late_bound_entries() {
    let registry = Registry::new();
    registry.register(add_op()).unwrap();
    let late = registry.late_bound("test.add").unwrap();
    let expr = Expr::call(&late, [Expr::leaf("x"), Expr::leaf("y")]).unwrap();
    let inputs = [("x", INT32), ("y", INT32)];

    let before = compile(&expr, &inputs, CompileOptions::default()).unwrap();
    registry
        .register_overloaded("test.unrelated", Signature::from_names(&["x"]), "")
        .unwrap();
    let len = compile_cache_len();
    let after = compile(&expr, &inputs, CompileOptions::default()).unwrap();

    assert!(!Arc::ptr_eq(&before, &after));
    assert_eq!(compile_cache_len(), len);
    let again = compile(&expr, &inputs, CompileOptions::default()).unwrap();
    assert!(Arc::ptr_eq(&after, &again));
}

#[test]
#[serial]
fn unrelated_registry_mutation_keeps_entries() {
    clear_eval_compile_cache();
    let expr = expr();
    let inputs = [("x", INT32), ("y", INT32)];
    let before = compile(&expr, &inputs, CompileOptions::default()).unwrap();

    for i in 0..16 {
        Registry::new()
            .register_overloaded(&format!("test.scratch{i}"), Signature::from_names(&["x"]), "")
            .unwrap();
        let after = compile(&expr, &inputs, CompileOptions::default()).unwrap();
        assert!(Arc::ptr_eq(&before, &after));
    }
    assert_eq!(compile_cache_len(), 1);
}

#[test]
#[serial]
fn late_bound_entry_survives_mutation_of_another_registry() {
    let registry = Registry::new();
    registry.register(add_op()).unwrap();
    let late = registry.late_bound("test.add").unwrap();
    let expr = Expr::call(&late, [Expr::leaf("x"), Expr::leaf("y")]).unwrap();
    let inputs = [("x", INT32), ("y", INT32)];

    let before = compile(&expr, &inputs, CompileOptions::default()).unwrap();
    Registry::new().register(add_op()).unwrap();
    let after = compile(&expr, &inputs, CompileOptions::default()).unwrap();

    assert!(Arc::ptr_eq(&before, &after));
}

#[test]
#[serial]
fn explicit_clear() {
    compile(&expr(), &[("x", INT32), ("y", INT32)], CompileOptions::default()).unwrap();
    clear_eval_compile_cache();
    assert_eq!(compile_cache_len(), 0);
}
