//! Graph traversal and structure-preserving rewrites.

use std::collections::{HashMap, HashSet};

use arolla_core::Fingerprint;

use crate::error::Result;
use crate::expr::Expr;

/// Unique nodes of `expr`, every node after all of its dependencies. Shared
/// subtrees appear once.
pub fn post_order(expr: &Expr) -> Vec<Expr> {
    let mut order = Vec::new();
    let mut visited: HashSet<Fingerprint> = HashSet::new();
    let mut stack = vec![(expr.clone(), false)];
    while let Some((node, deps_done)) = stack.pop() {
        if deps_done {
            order.push(node);
            continue;
        }
        if !visited.insert(node.fingerprint()) {
            continue;
        }
        stack.push((node.clone(), true));
        for dep in node.deps().iter().rev() {
            if !visited.contains(&dep.fingerprint()) {
                stack.push((dep.clone(), false));
            }
        }
    }
    order
}

/// Rebuild `expr` bottom-up.
///
/// `rewrite` receives each original node and the node rebuilt over already
/// rewritten dependencies, and returns the replacement. Each unique node is
/// visited once; untouched subgraphs keep their identity.
pub fn transform<F>(expr: &Expr, mut rewrite: F) -> Result<Expr>
where
    F: FnMut(&Expr, Expr) -> Result<Expr>,
{
    let mut done: HashMap<Fingerprint, Expr> = HashMap::new();
    for node in post_order(expr) {
        let rebuilt = if node.is_op() {
            let new_deps = node
                .deps()
                .iter()
                .map(|dep| done[&dep.fingerprint()].clone())
                .collect();
            node.with_new_deps(new_deps)?
        } else {
            node.clone()
        };
        let result = rewrite(&node, rebuilt)?;
        done.insert(node.fingerprint(), result);
    }
    Ok(done
        .remove(&expr.fingerprint())
        .expect("post order ends with the root"))
}
