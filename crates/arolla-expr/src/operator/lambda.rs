use std::collections::HashMap;

use crate::error::Result;
use crate::expr::Expr;
use crate::signature::Signature;
use crate::substitution::substitute_placeholders;

/// Operator defined by an expression over placeholders, one per parameter.
#[derive(Clone, Debug)]
pub struct LambdaOperator {
    body: Expr,
}

impl LambdaOperator {
    pub(crate) fn new(body: Expr) -> Self {
        Self { body }
    }

    pub fn body(&self) -> &Expr {
        &self.body
    }

    /// The body with each parameter placeholder replaced by its dependency.
    pub(crate) fn expand(&self, signature: &Signature, deps: &[Expr]) -> Result<Expr> {
        let bindings: HashMap<String, Expr> = signature
            .positional()
            .iter()
            .map(|p| p.name.clone())
            .zip(deps.iter().cloned())
            .collect();
        substitute_placeholders(&self.body, &bindings)
    }
}
