//! Immutable expression graphs.
//!
//! Nodes are shared through [`Arc`]; identical subtrees may appear many times
//! in a graph and are identified by their [`Fingerprint`]. Each node caches
//! its [`Attr`], computed from the attrs of its dependencies when the node is
//! built.

use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use arolla_core::{Fingerprint, FingerprintHasher, QType, QValue};

use crate::attr::Attr;
use crate::error::Result;
use crate::operator::Operator;
use crate::visitors::post_order;

#[derive(Clone, Debug)]
pub enum ExprKind {
    /// Named input, bound at evaluation time.
    Leaf(String),
    /// Named hole, bound by substitution. Used in lambda bodies.
    Placeholder(String),
    Literal(QValue),
    Operator { op: Operator, deps: Vec<Expr> },
}

struct ExprNode {
    kind: ExprKind,
    attr: Attr,
    fingerprint: Fingerprint,
}

/// Handle to an immutable expression node.
#[derive(Clone)]
pub struct Expr(Arc<ExprNode>);

impl Expr {
    fn from_node(kind: ExprKind, attr: Attr, fingerprint: Fingerprint) -> Self {
        Self(Arc::new(ExprNode {
            kind,
            attr,
            fingerprint,
        }))
    }

    pub fn leaf(key: impl Into<String>) -> Self {
        let key = key.into();
        let fingerprint = FingerprintHasher::new("leaf").combine_str(&key).finish();
        Self::from_node(ExprKind::Leaf(key), Attr::unknown(), fingerprint)
    }

    /// Leaf with a declared qtype. Distinct from the untyped leaf of the
    /// same key.
    pub fn typed_leaf(key: impl Into<String>, qtype: QType) -> Self {
        let key = key.into();
        let fingerprint = FingerprintHasher::new("leaf")
            .combine_str(&key)
            .combine_fingerprint(qtype.fingerprint())
            .finish();
        Self::from_node(ExprKind::Leaf(key), Attr::from_qtype(qtype), fingerprint)
    }

    pub fn placeholder(key: impl Into<String>) -> Self {
        let key = key.into();
        let fingerprint = FingerprintHasher::new("placeholder")
            .combine_str(&key)
            .finish();
        Self::from_node(ExprKind::Placeholder(key), Attr::unknown(), fingerprint)
    }

    pub fn literal(value: impl Into<QValue>) -> Self {
        let value = value.into();
        let fingerprint = FingerprintHasher::new("literal")
            .combine_fingerprint(value.fingerprint())
            .finish();
        Self::from_node(
            ExprKind::Literal(value.clone()),
            Attr::from_value(value),
            fingerprint,
        )
    }

    /// Call `op` with positional arguments, binding them to its signature.
    pub fn call(op: &Operator, args: impl IntoIterator<Item = Expr>) -> Result<Self> {
        Self::call_with_kwargs(op, args.into_iter().collect(), Vec::new())
    }

    pub fn call_with_kwargs(
        op: &Operator,
        args: Vec<Expr>,
        kwargs: Vec<(String, Expr)>,
    ) -> Result<Self> {
        let deps = op.signature().bind(op.name(), args, kwargs)?;
        Self::from_deps(op, deps)
    }

    /// Build an operator node from an already bound dependency list.
    pub fn from_deps(op: &Operator, deps: Vec<Expr>) -> Result<Self> {
        op.signature().check_arity(op.name(), deps.len())?;
        let attr = op.infer_attr(&deps)?;
        let mut hasher = FingerprintHasher::new("operator_node");
        hasher
            .combine_fingerprint(op.fingerprint())
            .combine_u64(deps.len() as u64);
        for dep in &deps {
            hasher.combine_fingerprint(dep.fingerprint());
        }
        let fingerprint = hasher.finish();
        Ok(Self::from_node(
            ExprKind::Operator {
                op: op.clone(),
                deps,
            },
            attr,
            fingerprint,
        ))
    }

    /// Same operator over new dependencies. Returns `self` when nothing
    /// changed.
    pub fn with_new_deps(&self, new_deps: Vec<Expr>) -> Result<Self> {
        match &self.0.kind {
            ExprKind::Operator { op, deps } => {
                let unchanged = deps.len() == new_deps.len()
                    && deps
                        .iter()
                        .zip(&new_deps)
                        .all(|(a, b)| a.fingerprint() == b.fingerprint());
                if unchanged {
                    Ok(self.clone())
                } else {
                    Self::from_deps(op, new_deps)
                }
            }
            _ => Ok(self.clone()),
        }
    }

    pub fn kind(&self) -> &ExprKind {
        &self.0.kind
    }

    pub fn attr(&self) -> &Attr {
        &self.0.attr
    }

    pub fn qtype(&self) -> Option<QType> {
        self.0.attr.qtype()
    }

    pub fn qvalue(&self) -> Option<&QValue> {
        self.0.attr.value()
    }

    pub fn fingerprint(&self) -> Fingerprint {
        self.0.fingerprint
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.0.kind, ExprKind::Leaf(_))
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self.0.kind, ExprKind::Placeholder(_))
    }

    pub fn is_literal(&self) -> bool {
        matches!(self.0.kind, ExprKind::Literal(_))
    }

    pub fn is_op(&self) -> bool {
        matches!(self.0.kind, ExprKind::Operator { .. })
    }

    pub fn leaf_key(&self) -> Option<&str> {
        match &self.0.kind {
            ExprKind::Leaf(key) => Some(key),
            _ => None,
        }
    }

    pub fn placeholder_key(&self) -> Option<&str> {
        match &self.0.kind {
            ExprKind::Placeholder(key) => Some(key),
            _ => None,
        }
    }

    pub fn op(&self) -> Option<&Operator> {
        match &self.0.kind {
            ExprKind::Operator { op, .. } => Some(op),
            _ => None,
        }
    }

    pub fn deps(&self) -> &[Expr] {
        match &self.0.kind {
            ExprKind::Operator { deps, .. } => deps,
            _ => &[],
        }
    }

    /// Sorted, deduplicated leaf keys.
    pub fn leaf_keys(&self) -> Vec<String> {
        self.collect_keys(Expr::leaf_key)
    }

    /// Sorted, deduplicated placeholder keys.
    pub fn placeholder_keys(&self) -> Vec<String> {
        self.collect_keys(Expr::placeholder_key)
    }

    fn collect_keys(&self, key: impl Fn(&Expr) -> Option<&str>) -> Vec<String> {
        let nodes = post_order(self);
        let keys: BTreeSet<&str> = nodes.iter().filter_map(|n| key(n)).collect();
        keys.into_iter().map(str::to_owned).collect()
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        self.0.fingerprint == other.0.fingerprint
    }
}

impl Eq for Expr {}

impl Hash for Expr {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.fingerprint.hash(state);
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::repr::to_debug_string(self))
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Expr({self})")
    }
}

impl From<QValue> for Expr {
    fn from(value: QValue) -> Self {
        Self::literal(value)
    }
}

macro_rules! literal_conversions {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Expr {
                fn from(value: $ty) -> Self {
                    Self::literal(value)
                }
            }
        )*
    };
}

literal_conversions!(bool, i32, i64, f32, f64, String, &str);
