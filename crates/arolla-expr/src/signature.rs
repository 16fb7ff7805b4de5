//! Operator signatures and argument binding.

use std::collections::HashSet;

use arolla_core::{FingerprintHasher, QType, QValue};

use crate::error::{ExprError, Result};
use crate::expr::Expr;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParameterKind {
    Positional,
    /// Collects every remaining positional argument. Always last.
    Variadic,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub kind: ParameterKind,
    pub default: Option<QValue>,
}

/// Ordered parameter list of an operator.
///
/// Built with [`Signature::new`] and the chained `param*` methods, then
/// checked by [`Signature::validate`] when an operator is created.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Signature {
    params: Vec<Parameter>,
}

impl Signature {
    pub fn new() -> Self {
        Self::default()
    }

    /// Positional parameters with no defaults.
    pub fn from_names(names: &[&str]) -> Self {
        names.iter().fold(Self::new(), |sig, name| sig.param(name))
    }

    pub fn param(mut self, name: &str) -> Self {
        self.params.push(Parameter {
            name: name.to_owned(),
            kind: ParameterKind::Positional,
            default: None,
        });
        self
    }

    pub fn param_with_default(mut self, name: &str, default: impl Into<QValue>) -> Self {
        self.params.push(Parameter {
            name: name.to_owned(),
            kind: ParameterKind::Positional,
            default: Some(default.into()),
        });
        self
    }

    pub fn variadic(mut self, name: &str) -> Self {
        self.params.push(Parameter {
            name: name.to_owned(),
            kind: ParameterKind::Variadic,
            default: None,
        });
        self
    }

    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    pub fn positional(&self) -> &[Parameter] {
        match self.variadic_param() {
            Some(_) => &self.params[..self.params.len() - 1],
            None => &self.params,
        }
    }

    pub fn variadic_param(&self) -> Option<&Parameter> {
        self.params.last().filter(|p| p.kind == ParameterKind::Variadic)
    }

    pub fn is_variadic(&self) -> bool {
        self.variadic_param().is_some()
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        let mut seen_default = false;
        for (i, param) in self.params.iter().enumerate() {
            if !is_identifier(&param.name) {
                return Err(ExprError::InvalidSignature(format!(
                    "parameter name {:?} is not an identifier",
                    param.name
                )));
            }
            if !seen.insert(param.name.as_str()) {
                return Err(ExprError::InvalidSignature(format!(
                    "duplicate parameter name {:?}",
                    param.name
                )));
            }
            match param.kind {
                ParameterKind::Variadic if i + 1 != self.params.len() => {
                    return Err(ExprError::InvalidSignature(format!(
                        "variadic parameter {:?} must be last",
                        param.name
                    )));
                }
                ParameterKind::Variadic => {}
                ParameterKind::Positional if param.default.is_some() => seen_default = true,
                ParameterKind::Positional if seen_default => {
                    return Err(ExprError::InvalidSignature(format!(
                        "parameter {:?} without a default follows one with a default",
                        param.name
                    )));
                }
                ParameterKind::Positional => {}
            }
        }
        Ok(())
    }

    /// Whether a node with `n` dependencies fits this signature.
    pub fn accepts_arity(&self, n: usize) -> bool {
        let fixed = self.positional().len();
        if self.is_variadic() { n >= fixed } else { n == fixed }
    }

    pub(crate) fn check_arity(&self, operator: &str, n: usize) -> Result<()> {
        if self.accepts_arity(n) {
            return Ok(());
        }
        let fixed = self.positional().len();
        let expected = if self.is_variadic() {
            format!("at least {fixed}")
        } else {
            fixed.to_string()
        };
        Err(ExprError::Binding {
            operator: operator.to_owned(),
            message: format!("expected {expected} dependencies, got {n}"),
        })
    }

    /// Bind call arguments to a flat dependency list: one entry per
    /// positional parameter (defaults filled in as literals) followed by
    /// every variadic argument.
    pub fn bind(
        &self,
        operator: &str,
        args: Vec<Expr>,
        kwargs: Vec<(String, Expr)>,
    ) -> Result<Vec<Expr>> {
        let binding_error = |message: String| ExprError::Binding {
            operator: operator.to_owned(),
            message,
        };
        let positional = self.positional();
        let mut slots: Vec<Option<Expr>> = vec![None; positional.len()];
        let mut rest = Vec::new();

        for (i, arg) in args.into_iter().enumerate() {
            if i < slots.len() {
                slots[i] = Some(arg);
            } else if self.is_variadic() {
                rest.push(arg);
            } else {
                return Err(binding_error(format!(
                    "too many positional arguments: expected at most {}",
                    positional.len()
                )));
            }
        }

        for (name, arg) in kwargs {
            let Some(index) = positional.iter().position(|p| p.name == name) else {
                return Err(binding_error(format!("unexpected keyword argument {name:?}")));
            };
            if slots[index].is_some() {
                return Err(binding_error(format!("multiple values for argument {name:?}")));
            }
            slots[index] = Some(arg);
        }

        let mut deps = Vec::with_capacity(slots.len() + rest.len());
        for (param, slot) in positional.iter().zip(slots) {
            match (slot, &param.default) {
                (Some(arg), _) => deps.push(arg),
                (None, Some(default)) => deps.push(Expr::literal(default.clone())),
                (None, None) => {
                    return Err(binding_error(format!(
                        "missing required argument {:?}",
                        param.name
                    )));
                }
            }
        }
        deps.extend(rest);
        Ok(deps)
    }

    /// Parameter name for each of `n` dependencies; variadic positions are
    /// rendered as `name[i]`.
    pub fn dep_names(&self, n: usize) -> Vec<String> {
        let positional = self.positional();
        (0..n)
            .map(|i| match (positional.get(i), self.variadic_param()) {
                (Some(param), _) => param.name.clone(),
                (None, Some(variadic)) => format!("{}[{}]", variadic.name, i - positional.len()),
                (None, None) => format!("_{i}"),
            })
            .collect()
    }

    /// Indices of the dependencies bound to parameter `name`.
    pub fn dep_indices(&self, name: &str, n: usize) -> Vec<usize> {
        let positional = self.positional();
        if let Some(i) = positional.iter().position(|p| p.name == name) {
            return if i < n { vec![i] } else { Vec::new() };
        }
        match self.variadic_param() {
            Some(v) if v.name == name => (positional.len()..n).collect(),
            _ => Vec::new(),
        }
    }

    pub fn has_param(&self, name: &str) -> bool {
        self.params.iter().any(|p| p.name == name)
    }

    /// `obj: FLOAT32, key: TEXT` style listing used in dispatch errors.
    pub(crate) fn describe_args(&self, qtypes: &[QType]) -> String {
        self.dep_names(qtypes.len())
            .iter()
            .zip(qtypes)
            .map(|(name, qtype)| format!("{name}: {qtype}"))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub(crate) fn hash_into(&self, hasher: &mut FingerprintHasher) {
        hasher.combine_u64(self.params.len() as u64);
        for param in &self.params {
            hasher
                .combine_str(&param.name)
                .combine_bool(param.kind == ParameterKind::Variadic)
                .combine_bool(param.default.is_some());
            if let Some(default) = &param.default {
                hasher.combine_fingerprint(default.fingerprint());
            }
        }
    }
}

/// ASCII identifier: a letter or underscore, then letters, digits or
/// underscores.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
