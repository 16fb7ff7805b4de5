//! Process-wide qtype catalogue.
//!
//! Composite and derived qtypes are created on first request and never
//! destroyed. Lookups take a read lock; a miss re-checks under the write
//! lock before creating, so racing first uses still agree on one instance.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use parking_lot::RwLock;

use super::builtin::builtin_families;
use super::{QType, QTypeInfo, QTypeKind};
use crate::error::{QTypeError, Result};

#[derive(Clone, PartialEq, Eq, Hash)]
enum QTypeKey {
    Optional(QType),
    DenseArray(QType),
    Tuple(Vec<QType>),
    NamedTuple(Vec<String>, QType),
    Sequence(QType),
    Labeled(String, QType),
}

struct QTypeRegistry {
    entries: RwLock<HashMap<QTypeKey, QType>>,
}

impl QTypeRegistry {
    fn with_builtins() -> Self {
        let mut entries = HashMap::new();
        for (scalar, optional, array) in builtin_families() {
            entries.insert(QTypeKey::Optional(scalar), optional);
            entries.insert(QTypeKey::DenseArray(scalar), array);
        }
        Self {
            entries: RwLock::new(entries),
        }
    }

    fn lookup_or_register(&self, key: QTypeKey, make: impl FnOnce() -> QTypeInfo) -> QType {
        if let Some(&qtype) = self.entries.read().get(&key) {
            return qtype;
        }

        let mut entries = self.entries.write();
        *entries.entry(key).or_insert_with(|| {
            let info: &'static QTypeInfo = Box::leak(Box::new(make()));
            tracing::trace!(qtype = %info.name, "registered qtype");
            QType::from_static(info)
        })
    }
}

static REGISTRY: LazyLock<QTypeRegistry> = LazyLock::new(QTypeRegistry::with_builtins);

/// Optional form of a scalar qtype. Optional qtypes map to themselves.
pub fn optional_qtype(qtype: QType) -> Result<QType> {
    match qtype.kind() {
        QTypeKind::Optional(_) => Ok(qtype),
        QTypeKind::Scalar(_) if qtype != super::QTYPE => Ok(REGISTRY
            .lookup_or_register(QTypeKey::Optional(qtype), || {
                QTypeInfo::derived(
                    format!("OPTIONAL_{}", qtype.name()),
                    QTypeKind::Optional(qtype),
                )
            })),
        _ => Err(QTypeError::IncompatibleBase {
            constructor: "optional",
            base: qtype,
            reason: "expected a scalar qtype".into(),
        }),
    }
}

/// Dense array of a scalar qtype. Optional element qtypes decay to their
/// payload, arrays map to themselves.
pub fn dense_array_qtype(qtype: QType) -> Result<QType> {
    match qtype.kind() {
        QTypeKind::DenseArray(_) => Ok(qtype),
        QTypeKind::Optional(value) => dense_array_qtype(*value),
        QTypeKind::Scalar(_) if qtype != super::QTYPE => Ok(REGISTRY
            .lookup_or_register(QTypeKey::DenseArray(qtype), || {
                QTypeInfo::derived(
                    format!("DENSE_ARRAY_{}", qtype.name()),
                    QTypeKind::DenseArray(qtype),
                )
            })),
        _ => Err(QTypeError::IncompatibleBase {
            constructor: "dense_array",
            base: qtype,
            reason: "expected a scalar qtype".into(),
        }),
    }
}

/// Tuple over the given field qtypes.
pub fn tuple_qtype(fields: &[QType]) -> QType {
    REGISTRY.lookup_or_register(QTypeKey::Tuple(fields.to_vec()), || {
        let names: Vec<&str> = fields.iter().map(|f| f.name()).collect();
        QTypeInfo::derived(
            format!("tuple<{}>", names.join(",")),
            QTypeKind::Tuple(fields.to_vec()),
        )
    })
}

/// Named tuple deriving from an existing tuple qtype.
pub fn named_tuple_qtype(field_names: &[&str], tuple: QType) -> Result<QType> {
    let QTypeKind::Tuple(fields) = tuple.kind() else {
        return Err(QTypeError::mismatch("a tuple qtype", tuple));
    };
    if fields.len() != field_names.len() {
        return Err(QTypeError::FieldCountMismatch {
            expected: fields.len(),
            actual: field_names.len(),
        });
    }
    let mut seen = HashSet::new();
    for name in field_names {
        if !seen.insert(*name) {
            return Err(QTypeError::DuplicateFieldName((*name).to_owned()));
        }
    }

    let names: Vec<String> = field_names.iter().map(|n| (*n).to_owned()).collect();
    Ok(REGISTRY.lookup_or_register(QTypeKey::NamedTuple(names.clone(), tuple), || {
        let rendered: Vec<String> = names
            .iter()
            .zip(fields)
            .map(|(name, field)| format!("{name}={field}"))
            .collect();
        QTypeInfo::derived(
            format!("namedtuple<{}>", rendered.join(",")),
            QTypeKind::NamedTuple {
                field_names: names.clone(),
                base: tuple,
            },
        )
    }))
}

/// Named tuple from `(name, qtype)` pairs.
pub fn make_named_tuple_qtype(fields: &[(&str, QType)]) -> Result<QType> {
    let qtypes: Vec<QType> = fields.iter().map(|(_, q)| *q).collect();
    let names: Vec<&str> = fields.iter().map(|(n, _)| *n).collect();
    named_tuple_qtype(&names, tuple_qtype(&qtypes))
}

/// Sequence of values of the given qtype.
pub fn sequence_qtype(value_qtype: QType) -> QType {
    REGISTRY.lookup_or_register(QTypeKey::Sequence(value_qtype), || {
        QTypeInfo::derived(
            format!("SEQUENCE[{value_qtype}]"),
            QTypeKind::Sequence(value_qtype),
        )
    })
}

/// Labeled qtype deriving from `base`.
///
/// Foreign objects and other derived qtypes cannot be labeled; a label always
/// decays in one step to a concrete representation.
pub fn labeled_qtype(base: QType, label: &str) -> Result<QType> {
    if matches!(base.kind(), QTypeKind::ForeignObject) || super::is_derived_qtype(base) {
        return Err(QTypeError::mismatch("a concrete non-opaque qtype", base));
    }
    if label.is_empty() {
        return Err(QTypeError::IncompatibleBase {
            constructor: "labeled",
            base,
            reason: "label must not be empty".into(),
        });
    }
    Ok(REGISTRY.lookup_or_register(QTypeKey::Labeled(label.to_owned(), base), || {
        QTypeInfo::derived(
            format!("LABEL[{label}]"),
            QTypeKind::Labeled {
                label: label.to_owned(),
                base,
            },
        )
    }))
}
