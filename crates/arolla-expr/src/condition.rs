//! Qtype conditions selecting overload candidates.

use arolla_core::qtype::{
    self, FOREIGN_OBJECT, QTypeKind, is_dense_array_qtype, is_derived_qtype,
    is_floating_point_qtype, is_integral_qtype, is_numeric_qtype, is_optional_qtype,
    is_scalar_qtype, is_tuple_qtype,
};
use arolla_core::{Fingerprint, FingerprintHasher, QType, ScalarKind};

use crate::signature::Signature;

/// A test applied to the qtype of one argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QTypeTest {
    Is(QType),
    Numeric,
    FloatingPoint,
    Integral,
    /// Scalar, optional or array over BOOLEAN.
    Boolean,
    /// Scalar, optional or array over TEXT.
    Text,
    Scalar,
    Optional,
    DenseArray,
    Tuple,
    Sequence,
    Derived,
    ForeignObject,
}

impl QTypeTest {
    pub fn matches(self, qtype: QType) -> bool {
        match self {
            Self::Is(expected) => qtype == expected,
            Self::Numeric => is_numeric_qtype(qtype),
            Self::FloatingPoint => is_floating_point_qtype(qtype),
            Self::Integral => is_integral_qtype(qtype),
            Self::Boolean => scalar_kind_is(qtype, ScalarKind::Boolean),
            Self::Text => scalar_kind_is(qtype, ScalarKind::Text),
            Self::Scalar => is_scalar_qtype(qtype),
            Self::Optional => is_optional_qtype(qtype),
            Self::DenseArray => is_dense_array_qtype(qtype),
            Self::Tuple => is_tuple_qtype(qtype),
            Self::Sequence => matches!(qtype.kind(), QTypeKind::Sequence(_)),
            Self::Derived => is_derived_qtype(qtype),
            Self::ForeignObject => qtype == FOREIGN_OBJECT,
        }
    }

    fn hash_into(self, hasher: &mut FingerprintHasher) {
        match self {
            Self::Is(q) => {
                hasher.combine_str("is").combine_fingerprint(q.fingerprint());
            }
            other => {
                hasher.combine_str(&format!("{other:?}"));
            }
        }
    }
}

fn scalar_kind_is(qtype: QType, kind: ScalarKind) -> bool {
    qtype::scalar_qtype_of(qtype).and_then(QType::scalar_kind) == Some(kind)
}

/// Boolean formula over argument qtypes, addressed by parameter name.
///
/// A test on a variadic parameter must hold for every variadic argument.
#[derive(Clone, Debug, PartialEq)]
pub enum QTypeCondition {
    Always,
    Param { name: String, test: QTypeTest },
    All(Vec<QTypeCondition>),
    Any(Vec<QTypeCondition>),
    Not(Box<QTypeCondition>),
}

impl QTypeCondition {
    pub fn param(name: &str, test: QTypeTest) -> Self {
        Self::Param {
            name: name.to_owned(),
            test,
        }
    }

    pub fn is(name: &str, qtype: QType) -> Self {
        Self::param(name, QTypeTest::Is(qtype))
    }

    pub fn and(self, other: QTypeCondition) -> Self {
        match self {
            Self::All(mut all) => {
                all.push(other);
                Self::All(all)
            }
            first => Self::All(vec![first, other]),
        }
    }

    pub fn or(self, other: QTypeCondition) -> Self {
        match self {
            Self::Any(mut any) => {
                any.push(other);
                Self::Any(any)
            }
            first => Self::Any(vec![first, other]),
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Self::Not(Box::new(self))
    }

    pub fn eval(&self, signature: &Signature, qtypes: &[QType]) -> bool {
        match self {
            Self::Always => true,
            Self::Param { name, test } => {
                let indices = signature.dep_indices(name, qtypes.len());
                if signature.variadic_param().is_some_and(|v| v.name == *name) {
                    indices.iter().all(|&i| test.matches(qtypes[i]))
                } else {
                    !indices.is_empty() && indices.iter().all(|&i| test.matches(qtypes[i]))
                }
            }
            Self::All(all) => all.iter().all(|c| c.eval(signature, qtypes)),
            Self::Any(any) => any.iter().any(|c| c.eval(signature, qtypes)),
            Self::Not(inner) => !inner.eval(signature, qtypes),
        }
    }

    /// Parameter names the condition refers to.
    pub fn param_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_param_names(&mut names);
        names
    }

    fn collect_param_names<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Self::Always => {}
            Self::Param { name, .. } => names.push(name),
            Self::All(items) | Self::Any(items) => {
                for item in items {
                    item.collect_param_names(names);
                }
            }
            Self::Not(inner) => inner.collect_param_names(names),
        }
    }

    pub fn fingerprint(&self) -> Fingerprint {
        let mut hasher = FingerprintHasher::new("qtype_condition");
        self.hash_into(&mut hasher);
        hasher.finish()
    }

    fn hash_into(&self, hasher: &mut FingerprintHasher) {
        match self {
            Self::Always => {
                hasher.combine_str("always");
            }
            Self::Param { name, test } => {
                hasher.combine_str("param").combine_str(name);
                test.hash_into(hasher);
            }
            Self::All(items) | Self::Any(items) => {
                hasher
                    .combine_str(if matches!(self, Self::All(_)) { "all" } else { "any" })
                    .combine_u64(items.len() as u64);
                for item in items {
                    item.hash_into(hasher);
                }
            }
            Self::Not(inner) => {
                hasher.combine_str("not");
                inner.hash_into(hasher);
            }
        }
    }
}
