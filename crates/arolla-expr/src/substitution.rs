//! Structure-preserving substitution.
//!
//! Every function returns a new graph; the input is never modified. Nodes
//! outside the rewritten region are shared with the input.

use std::collections::HashMap;

use arolla_core::Fingerprint;

use crate::error::Result;
use crate::expr::Expr;
use crate::operator::Operator;
use crate::visitors::transform;

/// Replace nodes by fingerprint.
pub fn substitute_by_fingerprint(expr: &Expr, subs: &HashMap<Fingerprint, Expr>) -> Result<Expr> {
    if subs.is_empty() {
        return Ok(expr.clone());
    }
    transform(expr, |original, rebuilt| {
        Ok(subs.get(&original.fingerprint()).cloned().unwrap_or(rebuilt))
    })
}

/// Replace every call of an operator named like a key of `subs`.
pub fn substitute_by_name(expr: &Expr, subs: &HashMap<String, Expr>) -> Result<Expr> {
    if subs.is_empty() {
        return Ok(expr.clone());
    }
    transform(expr, |original, rebuilt| {
        let replacement = original.op().and_then(|op| subs.get(op.name()));
        Ok(replacement.cloned().unwrap_or(rebuilt))
    })
}

/// Replace leaves, typed or not, by key.
pub fn substitute_leaves(expr: &Expr, subs: &HashMap<String, Expr>) -> Result<Expr> {
    substitute_keyed(expr, subs, Expr::leaf_key)
}

/// Replace placeholders by key.
pub fn substitute_placeholders(expr: &Expr, subs: &HashMap<String, Expr>) -> Result<Expr> {
    substitute_keyed(expr, subs, Expr::placeholder_key)
}

fn substitute_keyed(
    expr: &Expr,
    subs: &HashMap<String, Expr>,
    key: impl Fn(&Expr) -> Option<&str>,
) -> Result<Expr> {
    if subs.is_empty() {
        return Ok(expr.clone());
    }
    transform(expr, |original, rebuilt| {
        let replacement = key(original).and_then(|k| subs.get(k));
        Ok(replacement.cloned().unwrap_or(rebuilt))
    })
}

/// Swap the operator of every node whose operator is named like a key of
/// `ops`, keeping the node's dependencies.
pub fn substitute_operators(expr: &Expr, ops: &HashMap<String, Operator>) -> Result<Expr> {
    if ops.is_empty() {
        return Ok(expr.clone());
    }
    transform(expr, |_, rebuilt| {
        let replacement = rebuilt.op().and_then(|op| ops.get(op.name()));
        match replacement {
            Some(op) => Expr::from_deps(op, rebuilt.deps().to_vec()),
            None => Ok(rebuilt),
        }
    })
}
