//! Canonical value types.
//!
//! A [`QType`] is a handle to a process-wide, never-freed descriptor. Two
//! handles are equal iff they point to the same descriptor, so comparing
//! qtypes is a pointer comparison. Builtin qtypes are statics; composite and
//! derived qtypes are created on first use by the [`registry`] and leaked.

mod builtin;
mod predicates;
pub mod registry;


use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::fingerprint::{Fingerprint, FingerprintHasher};

pub use builtin::*;
pub use predicates::{
    broadcast_qtype, common_scalar_qtype, decay_derived_qtype, is_dense_array_qtype,
    is_derived_qtype, is_floating_point_qtype, is_integral_qtype, is_numeric_qtype,
    is_optional_qtype, is_scalar_qtype, is_tuple_qtype, scalar_qtype_of, QTypeShape,
};
pub use registry::{
    dense_array_qtype, labeled_qtype, make_named_tuple_qtype, named_tuple_qtype, optional_qtype,
    sequence_qtype, tuple_qtype,
};

/// Scalar value families.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[repr(u8)]
pub enum ScalarKind {
    Unit = 0,
    Boolean = 1,
    Int32 = 2,
    Int64 = 3,
    Float32 = 4,
    Float64 = 5,
    Bytes = 6,
    Text = 7,
    /// A qtype used as a value.
    QType = 8,
}

impl ScalarKind {
    /// Numeric promotion rank. `None` for non-numeric kinds.
    pub fn numeric_rank(self) -> Option<u8> {
        match self {
            Self::Int32 => Some(0),
            Self::Int64 => Some(1),
            Self::Float32 => Some(2),
            Self::Float64 => Some(3),
            _ => None,
        }
    }

    pub fn is_floating_point(self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }

    pub fn is_integral(self) -> bool {
        matches!(self, Self::Int32 | Self::Int64)
    }
}

/// Structure of a qtype.
#[derive(Debug)]
pub enum QTypeKind {
    Scalar(ScalarKind),
    /// Presence flag plus a scalar payload.
    Optional(QType),
    /// Homogeneous array of optional scalars.
    DenseArray(QType),
    /// Heterogeneous fixed-arity tuple.
    Tuple(Vec<QType>),
    /// Tuple with field names. Derived: decays to `base`.
    NamedTuple { field_names: Vec<String>, base: QType },
    /// Homogeneous variable-length list of qvalues.
    Sequence(QType),
    /// Labeled wrapper. Derived: decays to `base`.
    Labeled { label: String, base: QType },
    /// Opaque host payload.
    ForeignObject,
}

/// Descriptor behind a [`QType`] handle.
#[derive(Debug)]
pub struct QTypeInfo {
    name: Cow<'static, str>,
    kind: QTypeKind,
}

impl QTypeInfo {
    pub(crate) const fn builtin(name: &'static str, kind: QTypeKind) -> Self {
        Self {
            name: Cow::Borrowed(name),
            kind,
        }
    }

    pub(crate) fn derived(name: String, kind: QTypeKind) -> Self {
        Self {
            name: Cow::Owned(name),
            kind,
        }
    }
}

/// Handle to a canonical qtype descriptor.
#[derive(Clone, Copy)]
pub struct QType(&'static QTypeInfo);

impl QType {
    pub(crate) const fn from_static(info: &'static QTypeInfo) -> Self {
        Self(info)
    }

    pub fn name(self) -> &'static str {
        match &self.0.name {
            Cow::Borrowed(name) => *name,
            Cow::Owned(name) => name.as_str(),
        }
    }

    pub fn kind(self) -> &'static QTypeKind {
        &self.0.kind
    }

    /// Scalar family, for scalar qtypes only.
    pub fn scalar_kind(self) -> Option<ScalarKind> {
        match self.kind() {
            QTypeKind::Scalar(kind) => Some(*kind),
            _ => None,
        }
    }

    /// Payload qtype of an optional, element qtype of an array or sequence.
    pub fn value_qtype(self) -> Option<QType> {
        match self.kind() {
            QTypeKind::Optional(value)
            | QTypeKind::DenseArray(value)
            | QTypeKind::Sequence(value) => Some(*value),
            _ => None,
        }
    }

    /// Field qtypes of a tuple or named tuple.
    pub fn fields(self) -> Option<&'static [QType]> {
        match self.decay().kind() {
            QTypeKind::Tuple(fields) => Some(fields.as_slice()),
            _ => None,
        }
    }

    /// Field names of a named tuple.
    pub fn field_names(self) -> Option<&'static [String]> {
        match self.kind() {
            QTypeKind::NamedTuple { field_names, .. } => Some(field_names.as_slice()),
            _ => None,
        }
    }

    /// The base qtype of a derived qtype; the qtype itself otherwise.
    pub fn decay(self) -> QType {
        match self.kind() {
            QTypeKind::NamedTuple { base, .. } | QTypeKind::Labeled { base, .. } => base.decay(),
            _ => self,
        }
    }

    /// Structural fingerprint: the kind plus the fingerprints of every
    /// component qtype.
    pub fn fingerprint(self) -> Fingerprint {
        let mut hasher = FingerprintHasher::new("qtype");
        match self.kind() {
            QTypeKind::Scalar(kind) => {
                hasher.combine_str("scalar").combine_u64(*kind as u64);
            }
            QTypeKind::Optional(value) => {
                hasher
                    .combine_str("optional")
                    .combine_fingerprint(value.fingerprint());
            }
            QTypeKind::DenseArray(value) => {
                hasher
                    .combine_str("dense_array")
                    .combine_fingerprint(value.fingerprint());
            }
            QTypeKind::Tuple(fields) => {
                hasher.combine_str("tuple").combine_u64(fields.len() as u64);
                for field in fields {
                    hasher.combine_fingerprint(field.fingerprint());
                }
            }
            QTypeKind::NamedTuple { field_names, base } => {
                hasher
                    .combine_str("named_tuple")
                    .combine_u64(field_names.len() as u64);
                for name in field_names {
                    hasher.combine_str(name);
                }
                hasher.combine_fingerprint(base.fingerprint());
            }
            QTypeKind::Sequence(value) => {
                hasher
                    .combine_str("sequence")
                    .combine_fingerprint(value.fingerprint());
            }
            QTypeKind::Labeled { label, base } => {
                hasher
                    .combine_str("labeled")
                    .combine_str(label)
                    .combine_fingerprint(base.fingerprint());
            }
            QTypeKind::ForeignObject => {
                hasher.combine_str("foreign_object");
            }
        }
        hasher.finish()
    }
}

impl PartialEq for QType {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.0, other.0)
    }
}

impl Eq for QType {}

impl Hash for QType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(self.0, state);
    }
}

impl fmt::Display for QType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Debug for QType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
