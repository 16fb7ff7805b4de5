//! Operators: the functions at the inner nodes of an expression.
//!
//! Every operator has a name, a doc string, a [`Signature`] and a fingerprint.
//! Its [`OperatorKind`] decides how the output attr is inferred and how the
//! operator lowers:
//!
//! - `Backend` - terminal; a qtype rule plus a kernel
//! - `Lambda` - expands into its body
//! - `Overloaded` - dispatches on input qtypes
//! - `GetNth` - terminal; extracts a tuple field
//! - `Dummy` - fixed output qtype, no implementation
//! - `Registered` - resolves a registry name at every use

mod backend;
mod lambda;
mod overloaded;

#[cfg(test)]
mod operator_tests;

use std::cell::Cell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use arolla_core::{Fingerprint, FingerprintHasher, QType, QValue};

use crate::attr::Attr;
use crate::error::{ExprError, Result};
use crate::expr::Expr;
use crate::registry::RegisteredOperator;
use crate::signature::Signature;

pub use backend::{BackendOperator, KernelError, KernelFn, QTypeRule};
pub use lambda::LambdaOperator;
pub use overloaded::{Overload, OverloadCondition, OverloadedOperator};

/// Nesting limit for lambda expansion, overload dispatch and late-bound
/// resolution.
pub const MAX_EXPANSION_DEPTH: usize = 100;

/// Name of the tuple field extraction operator.
pub const GET_NTH_NAME: &str = "core.get_nth";

#[derive(Clone, Debug)]
pub enum OperatorKind {
    Backend(BackendOperator),
    Lambda(LambdaOperator),
    Overloaded(OverloadedOperator),
    GetNth(usize),
    Dummy(QType),
    Registered(RegisteredOperator),
}

impl OperatorKind {
    fn tag(&self) -> &'static str {
        match self {
            Self::Backend(_) => "backend",
            Self::Lambda(_) => "lambda",
            Self::Overloaded(_) => "overloaded",
            Self::GetNth(_) => "get_nth",
            Self::Dummy(_) => "dummy",
            Self::Registered(_) => "registered",
        }
    }
}

struct OperatorDef {
    name: String,
    doc: String,
    signature: Signature,
    kind: OperatorKind,
    fingerprint: Fingerprint,
}

/// Shared handle to an immutable operator definition.
#[derive(Clone)]
pub struct Operator(Arc<OperatorDef>);

impl Operator {
    pub fn builder(name: impl Into<String>) -> OperatorBuilder {
        OperatorBuilder {
            name: name.into(),
            doc: String::new(),
            signature: None,
        }
    }

    /// Operator extracting field `index` of a tuple.
    pub fn get_nth(index: usize) -> Self {
        Self::from_parts(
            GET_NTH_NAME.to_owned(),
            format!("Returns field {index} of a tuple."),
            Signature::from_names(&["x"]),
            OperatorKind::GetNth(index),
        )
    }

    pub(crate) fn from_parts(
        name: String,
        doc: String,
        signature: Signature,
        kind: OperatorKind,
    ) -> Self {
        let mut hasher = FingerprintHasher::new("operator");
        hasher.combine_str(kind.tag()).combine_str(&name);
        signature.hash_into(&mut hasher);
        match &kind {
            OperatorKind::Backend(backend) => {
                hasher.combine_u64(backend.uid());
            }
            OperatorKind::Lambda(lambda) => {
                hasher.combine_fingerprint(lambda.body().fingerprint());
            }
            OperatorKind::Overloaded(overloaded) => overloaded.hash_into(&mut hasher),
            OperatorKind::GetNth(index) => {
                hasher.combine_u64(*index as u64);
            }
            OperatorKind::Dummy(qtype) => {
                hasher.combine_fingerprint(qtype.fingerprint());
            }
            OperatorKind::Registered(registered) => registered.hash_into(&mut hasher),
        }
        let fingerprint = hasher.finish();
        Self(Arc::new(OperatorDef {
            name,
            doc,
            signature,
            kind,
            fingerprint,
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn doc(&self) -> &str {
        &self.0.doc
    }

    pub fn signature(&self) -> &Signature {
        &self.0.signature
    }

    pub fn kind(&self) -> &OperatorKind {
        &self.0.kind
    }

    pub fn fingerprint(&self) -> Fingerprint {
        self.0.fingerprint
    }

    /// Whether nodes of this operator are left untouched by lowering.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.0.kind,
            OperatorKind::Backend(_) | OperatorKind::GetNth(_) | OperatorKind::Dummy(_)
        )
    }

    /// Output attr for the given dependencies. Unknown when it depends on an
    /// input qtype that is not known yet.
    pub fn infer_attr(&self, deps: &[Expr]) -> Result<Attr> {
        match &self.0.kind {
            OperatorKind::Backend(backend) => {
                let Some(qtypes) = known_qtypes(deps) else {
                    return Ok(Attr::unknown());
                };
                backend
                    .output_qtype(&qtypes)
                    .map(Attr::from_qtype)
                    .map_err(|message| ExprError::TypeMismatch {
                        operator: self.name().to_owned(),
                        message,
                    })
            }
            OperatorKind::Lambda(lambda) => {
                let _guard = ExpansionGuard::enter(self.name())?;
                Ok(lambda.expand(self.signature(), deps)?.attr().clone())
            }
            OperatorKind::Overloaded(overloaded) => {
                let _guard = ExpansionGuard::enter(self.name())?;
                match overloaded.select(self, deps)? {
                    Some(candidate) => candidate.infer_attr(deps),
                    None => Ok(Attr::unknown()),
                }
            }
            OperatorKind::GetNth(index) => get_nth_attr(self.name(), *index, deps),
            OperatorKind::Dummy(qtype) => Ok(Attr::from_qtype(*qtype)),
            OperatorKind::Registered(registered) => {
                let _guard = ExpansionGuard::enter(self.name())?;
                let resolved = registered.resolve()?;
                resolved.signature().check_arity(resolved.name(), deps.len())?;
                resolved.infer_attr(deps)
            }
        }
    }

    /// One lowering step for a node of this operator over `deps`. `None`
    /// when the node is already lowest or cannot be lowered yet.
    pub fn lower(&self, deps: &[Expr]) -> Result<Option<Expr>> {
        match &self.0.kind {
            OperatorKind::Lambda(lambda) => Ok(Some(lambda.expand(self.signature(), deps)?)),
            OperatorKind::Overloaded(overloaded) => match overloaded.select(self, deps)? {
                Some(candidate) => Ok(Some(Expr::from_deps(&candidate, deps.to_vec())?)),
                None => Ok(None),
            },
            OperatorKind::Registered(registered) => {
                let resolved = registered.resolve()?;
                Ok(Some(Expr::from_deps(&resolved, deps.to_vec())?))
            }
            OperatorKind::Backend(_) | OperatorKind::GetNth(_) | OperatorKind::Dummy(_) => {
                Ok(None)
            }
        }
    }
}

pub(crate) fn known_qtypes(deps: &[Expr]) -> Option<Vec<QType>> {
    deps.iter().map(Expr::qtype).collect()
}

fn get_nth_attr(operator: &str, index: usize, deps: &[Expr]) -> Result<Attr> {
    let type_error = |message: String| ExprError::TypeMismatch {
        operator: operator.to_owned(),
        message,
    };
    let Some(input) = deps.first() else {
        return Err(type_error("expected one dependency".to_owned()));
    };
    let Some(qtype) = input.qtype() else {
        return Ok(Attr::unknown());
    };
    let Some(fields) = qtype.fields() else {
        return Err(type_error(format!("expected a tuple, got {qtype}")));
    };
    let Some(field) = fields.get(index) else {
        return Err(type_error(format!(
            "index {index} out of range for {qtype}"
        )));
    };
    let value = input
        .qvalue()
        .and_then(QValue::as_tuple)
        .and_then(|values| values.get(index));
    Ok(match value {
        Some(value) => Attr::from_value(value.clone()),
        None => Attr::from_qtype(*field),
    })
}

impl PartialEq for Operator {
    fn eq(&self, other: &Self) -> bool {
        self.0.fingerprint == other.0.fingerprint
    }
}

impl Eq for Operator {}

impl Hash for Operator {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.fingerprint.hash(state);
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.name)
    }
}

impl fmt::Debug for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operator")
            .field("name", &self.0.name)
            .field("kind", &self.0.kind.tag())
            .field("fingerprint", &self.0.fingerprint.short())
            .finish()
    }
}

/// Builder for named operators.
///
/// ```ignore
/// let add = Operator::builder("math.add")
///     .signature(Signature::from_names(&["x", "y"]))
///     .doc("Returns x + y.")
///     .backend(rule, kernel)?;
/// ```
pub struct OperatorBuilder {
    name: String,
    doc: String,
    signature: Option<Signature>,
}

impl OperatorBuilder {
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    pub fn signature(mut self, signature: Signature) -> Self {
        self.signature = Some(signature);
        self
    }

    pub fn backend<R, K>(self, rule: R, kernel: K) -> Result<Operator>
    where
        R: Fn(&[QType]) -> std::result::Result<QType, String> + Send + Sync + 'static,
        K: Fn(&[QValue], QType) -> std::result::Result<QValue, KernelError>
            + Send
            + Sync
            + 'static,
    {
        let backend = BackendOperator::new(Arc::new(rule), Arc::new(kernel));
        self.build(OperatorKind::Backend(backend))
    }

    /// Lambda over `body`. Without an explicit signature, the parameters are
    /// the body's placeholder keys in sorted order.
    pub fn lambda(mut self, body: Expr) -> Result<Operator> {
        let signature = match self.signature.take() {
            Some(signature) => signature,
            None => {
                let keys = body.placeholder_keys();
                let names: Vec<&str> = keys.iter().map(String::as_str).collect();
                Signature::from_names(&names)
            }
        };
        if let Some(variadic) = signature.variadic_param() {
            return Err(ExprError::InvalidSignature(format!(
                "lambda {} cannot take variadic parameter {:?}",
                self.name, variadic.name
            )));
        }
        if let Some(unknown) = body
            .placeholder_keys()
            .into_iter()
            .find(|key| !signature.has_param(key))
        {
            return Err(ExprError::UnknownPlaceholder {
                operator: self.name,
                placeholder: unknown,
            });
        }
        self.signature = Some(signature);
        self.build(OperatorKind::Lambda(LambdaOperator::new(body)))
    }

    pub fn overloaded(self, overloads: Vec<Overload>) -> Result<Operator> {
        let signature = self.signature.clone().unwrap_or_default();
        for overload in &overloads {
            if let OverloadCondition::QTypes(condition) = &overload.condition
                && let Some(unknown) = condition
                    .param_names()
                    .into_iter()
                    .find(|name| !signature.has_param(name))
            {
                return Err(ExprError::InvalidSignature(format!(
                    "overload condition of {} refers to unknown parameter {unknown:?}",
                    self.name
                )));
            }
        }
        self.build(OperatorKind::Overloaded(OverloadedOperator::new(overloads)))
    }

    /// Operator with a fixed output qtype that cannot be evaluated.
    pub fn dummy(self, output: QType) -> Result<Operator> {
        self.build(OperatorKind::Dummy(output))
    }

    pub(crate) fn build(self, kind: OperatorKind) -> Result<Operator> {
        if self.name.is_empty() {
            return Err(ExprError::InvalidSignature(
                "operator name must not be empty".to_owned(),
            ));
        }
        let signature = self.signature.unwrap_or_default();
        signature.validate()?;
        Ok(Operator::from_parts(self.name, self.doc, signature, kind))
    }
}

thread_local! {
    static EXPANSION_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Counts nested expansions on the current thread.
pub(crate) struct ExpansionGuard(());

impl ExpansionGuard {
    pub(crate) fn enter(operator: &str) -> Result<Self> {
        EXPANSION_DEPTH.with(|depth| {
            if depth.get() >= MAX_EXPANSION_DEPTH {
                return Err(ExprError::RecursionLimitExceeded {
                    operator: operator.to_owned(),
                    limit: MAX_EXPANSION_DEPTH,
                });
            }
            depth.set(depth.get() + 1);
            Ok(Self(()))
        })
    }
}

impl Drop for ExpansionGuard {
    fn drop(&mut self) {
        EXPANSION_DEPTH.with(|depth| depth.set(depth.get() - 1));
    }
}
