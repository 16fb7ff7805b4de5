//! Lowering to terminal operators.

use crate::error::Result;
use crate::expr::Expr;
use crate::operator::ExpansionGuard;
use crate::visitors::transform;

/// Rewrite `expr` until every operator node is terminal: lambdas are
/// expanded, overloads dispatched and late-bound names resolved. Output
/// qtypes are preserved.
///
/// Nodes whose input qtypes are still unknown cannot be dispatched and are
/// kept as they are.
pub fn to_lowest(expr: &Expr) -> Result<Expr> {
    transform(expr, |_, rebuilt| lower_node(rebuilt))
}

fn lower_node(node: Expr) -> Result<Expr> {
    let Some(op) = node.op() else {
        return Ok(node);
    };
    match op.lower(node.deps())? {
        None => Ok(node),
        Some(lowered) => {
            let _guard = ExpansionGuard::enter(op.name())?;
            tracing::trace!(operator = op.name(), "lowered node");
            to_lowest(&lowered)
        }
    }
}
