//! Immutable typed values.
//!
//! A [`QValue`] pairs a [`QType`] with shared, immutable data. Cloning is a
//! reference count bump. Derived qtypes share the representation of their
//! base: a downcast only swaps the qtype tag.

mod foreign;
mod repr;


use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::error::{QTypeError, Result};
use crate::fingerprint::{Fingerprint, FingerprintHasher};
use crate::qtype::{
    self, BOOLEAN, BYTES, FLOAT32, FLOAT64, FOREIGN_OBJECT, INT32, INT64, QTYPE, QType,
    QTypeKind, ScalarKind, TEXT, UNIT,
};

pub use foreign::ForeignObject;

/// A single scalar payload.
#[derive(Clone, Debug)]
pub enum Scalar {
    Unit,
    Boolean(bool),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Bytes(Vec<u8>),
    Text(String),
    QType(QType),
}

impl Scalar {
    pub fn kind(&self) -> ScalarKind {
        match self {
            Self::Unit => ScalarKind::Unit,
            Self::Boolean(_) => ScalarKind::Boolean,
            Self::Int32(_) => ScalarKind::Int32,
            Self::Int64(_) => ScalarKind::Int64,
            Self::Float32(_) => ScalarKind::Float32,
            Self::Float64(_) => ScalarKind::Float64,
            Self::Bytes(_) => ScalarKind::Bytes,
            Self::Text(_) => ScalarKind::Text,
            Self::QType(_) => ScalarKind::QType,
        }
    }

    /// The builtin scalar qtype of this payload.
    pub fn qtype(&self) -> QType {
        scalar_qtype_for(self.kind())
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    /// Integral payloads widened to i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int32(v) => Some(*v as i64),
            Self::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric payloads widened to f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int32(v) => Some(*v as f64),
            Self::Int64(v) => Some(*v as f64),
            Self::Float32(v) => Some(*v as f64),
            Self::Float64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_qtype(&self) -> Option<QType> {
        match self {
            Self::QType(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric conversion into `kind`. Non-numeric payloads only convert to
    /// their own kind.
    pub fn cast(&self, kind: ScalarKind) -> Option<Scalar> {
        if self.kind() == kind {
            return Some(self.clone());
        }
        match kind {
            ScalarKind::Int32 => self.as_i64().and_then(|v| i32::try_from(v).ok()).map(Self::Int32),
            ScalarKind::Int64 => self.as_i64().map(Self::Int64),
            ScalarKind::Float32 => self.as_f64().map(|v| Self::Float32(v as f32)),
            ScalarKind::Float64 => self.as_f64().map(Self::Float64),
            _ => None,
        }
    }

    fn hash_into(&self, hasher: &mut FingerprintHasher) {
        hasher.combine_u64(self.kind() as u64);
        match self {
            Self::Unit => {}
            Self::Boolean(v) => {
                hasher.combine_bool(*v);
            }
            Self::Int32(v) => {
                hasher.combine_u64(*v as i64 as u64);
            }
            Self::Int64(v) => {
                hasher.combine_u64(*v as u64);
            }
            Self::Float32(v) => {
                hasher.combine_u64(v.to_bits() as u64);
            }
            Self::Float64(v) => {
                hasher.combine_u64(v.to_bits());
            }
            Self::Bytes(v) => {
                hasher.combine_bytes(v);
            }
            Self::Text(v) => {
                hasher.combine_str(v);
            }
            Self::QType(v) => {
                hasher.combine_fingerprint(v.fingerprint());
            }
        }
    }
}

/// Floats compare by bit pattern, so `NaN == NaN` and `0.0 != -0.0`.
impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Unit, Self::Unit) => true,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Int32(a), Self::Int32(b)) => a == b,
            (Self::Int64(a), Self::Int64(b)) => a == b,
            (Self::Float32(a), Self::Float32(b)) => a.to_bits() == b.to_bits(),
            (Self::Float64(a), Self::Float64(b)) => a.to_bits() == b.to_bits(),
            (Self::Bytes(a), Self::Bytes(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::QType(a), Self::QType(b)) => a == b,
            _ => false,
        }
    }
}

/// Builtin scalar qtype of a scalar kind.
pub fn scalar_qtype_for(kind: ScalarKind) -> QType {
    match kind {
        ScalarKind::Unit => UNIT,
        ScalarKind::Boolean => BOOLEAN,
        ScalarKind::Int32 => INT32,
        ScalarKind::Int64 => INT64,
        ScalarKind::Float32 => FLOAT32,
        ScalarKind::Float64 => FLOAT64,
        ScalarKind::Bytes => BYTES,
        ScalarKind::Text => TEXT,
        ScalarKind::QType => QTYPE,
    }
}

#[derive(Debug)]
pub(crate) enum Data {
    Scalar(Scalar),
    Optional(Option<Scalar>),
    DenseArray(Vec<Option<Scalar>>),
    Tuple(Vec<QValue>),
    Sequence(Vec<QValue>),
    Foreign(ForeignObject),
}

/// An immutable value tagged with its qtype.
#[derive(Clone)]
pub struct QValue {
    qtype: QType,
    data: Arc<Data>,
}

impl QValue {
    fn new(qtype: QType, data: Data) -> Self {
        Self {
            qtype,
            data: Arc::new(data),
        }
    }

    pub fn scalar(value: Scalar) -> Self {
        Self::new(value.qtype(), Data::Scalar(value))
    }

    pub fn unit() -> Self {
        Self::scalar(Scalar::Unit)
    }

    pub fn bytes(value: impl Into<Vec<u8>>) -> Self {
        Self::scalar(Scalar::Bytes(value.into()))
    }

    /// A qtype used as a value.
    pub fn from_qtype(value: QType) -> Self {
        Self::scalar(Scalar::QType(value))
    }

    /// Optional value over `value_qtype` (a scalar qtype).
    pub fn optional(value_qtype: QType, value: Option<Scalar>) -> Result<Self> {
        let qtype = qtype::optional_qtype(value_qtype)?;
        let scalar = qtype.value_qtype().unwrap_or(value_qtype);
        if let Some(v) = &value {
            check_scalar(scalar, v)?;
        }
        Ok(Self::new(qtype, Data::Optional(value)))
    }

    pub fn present(value: Scalar) -> Self {
        let qtype = value.qtype();
        // Every builtin scalar except QTYPE has an optional form.
        match qtype::optional_qtype(qtype) {
            Ok(optional) => Self::new(optional, Data::Optional(Some(value))),
            Err(_) => Self::scalar(value),
        }
    }

    /// Missing optional value of the given scalar qtype.
    pub fn missing(value_qtype: QType) -> Result<Self> {
        Self::optional(value_qtype, None)
    }

    /// Dense array over `value_qtype`; `None` elements are missing.
    pub fn dense_array(value_qtype: QType, values: Vec<Option<Scalar>>) -> Result<Self> {
        let qtype = qtype::dense_array_qtype(value_qtype)?;
        let scalar = qtype.value_qtype().unwrap_or(value_qtype);
        for v in values.iter().flatten() {
            check_scalar(scalar, v)?;
        }
        Ok(Self::new(qtype, Data::DenseArray(values)))
    }

    pub fn tuple(fields: Vec<QValue>) -> Self {
        let qtypes: Vec<QType> = fields.iter().map(QValue::qtype).collect();
        Self::new(qtype::tuple_qtype(&qtypes), Data::Tuple(fields))
    }

    pub fn named_tuple(fields: Vec<(&str, QValue)>) -> Result<Self> {
        let names: Vec<&str> = fields.iter().map(|(n, _)| *n).collect();
        let tuple = Self::tuple(fields.into_iter().map(|(_, v)| v).collect());
        let qtype = qtype::named_tuple_qtype(&names, tuple.qtype)?;
        Ok(tuple.with_qtype(qtype))
    }

    /// Sequence of values, each of exactly `value_qtype`.
    pub fn sequence(value_qtype: QType, values: Vec<QValue>) -> Result<Self> {
        if let Some(bad) = values.iter().find(|v| v.qtype != value_qtype) {
            return Err(QTypeError::mismatch(value_qtype.name(), bad.qtype));
        }
        Ok(Self::new(
            qtype::sequence_qtype(value_qtype),
            Data::Sequence(values),
        ))
    }

    pub fn foreign(object: ForeignObject) -> Self {
        Self::new(FOREIGN_OBJECT, Data::Foreign(object))
    }

    pub fn qtype(&self) -> QType {
        self.qtype
    }

    pub fn fingerprint(&self) -> Fingerprint {
        let mut hasher = FingerprintHasher::new("qvalue");
        self.hash_into(&mut hasher);
        hasher.finish()
    }

    fn hash_into(&self, hasher: &mut FingerprintHasher) {
        hasher.combine_fingerprint(self.qtype.fingerprint());
        match self.data.as_ref() {
            Data::Scalar(v) => v.hash_into(hasher),
            Data::Optional(v) => {
                hasher.combine_bool(v.is_some());
                if let Some(v) = v {
                    v.hash_into(hasher);
                }
            }
            Data::DenseArray(values) => {
                hasher.combine_u64(values.len() as u64);
                for v in values {
                    hasher.combine_bool(v.is_some());
                    if let Some(v) = v {
                        v.hash_into(hasher);
                    }
                }
            }
            Data::Tuple(values) | Data::Sequence(values) => {
                hasher.combine_u64(values.len() as u64);
                for v in values {
                    v.hash_into(hasher);
                }
            }
            Data::Foreign(object) => {
                hasher.combine_u64(object.id());
            }
        }
    }

    pub(crate) fn data(&self) -> &Data {
        &self.data
    }

    /// Same representation under another qtype. Callers guarantee that the
    /// two qtypes decay to the same base.
    fn with_qtype(&self, qtype: QType) -> Self {
        Self {
            qtype,
            data: Arc::clone(&self.data),
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self.data.as_ref() {
            Data::Scalar(v) => Some(v),
            _ => None,
        }
    }

    /// `Some(None)` for a missing optional, `None` for non-optionals.
    pub fn as_optional(&self) -> Option<Option<&Scalar>> {
        match self.data.as_ref() {
            Data::Optional(v) => Some(v.as_ref()),
            _ => None,
        }
    }

    pub fn as_dense_array(&self) -> Option<&[Option<Scalar>]> {
        match self.data.as_ref() {
            Data::DenseArray(v) => Some(v),
            _ => None,
        }
    }

    /// Fields of a tuple or named tuple.
    pub fn as_tuple(&self) -> Option<&[QValue]> {
        match self.data.as_ref() {
            Data::Tuple(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[QValue]> {
        match self.data.as_ref() {
            Data::Sequence(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_foreign(&self) -> Option<&ForeignObject> {
        match self.data.as_ref() {
            Data::Foreign(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_qtype(&self) -> Option<QType> {
        self.as_scalar().and_then(Scalar::as_qtype)
    }

    /// Named tuple field by name.
    pub fn field(&self, name: &str) -> Option<&QValue> {
        let index = self.qtype.field_names()?.iter().position(|n| n == name)?;
        self.as_tuple()?.get(index)
    }

    /// Scalar payload of a scalar or present optional.
    pub fn payload(&self) -> Option<&Scalar> {
        match self.data.as_ref() {
            Data::Scalar(v) => Some(v),
            Data::Optional(v) => v.as_ref(),
            _ => None,
        }
    }
}

fn check_scalar(expected: QType, value: &Scalar) -> Result<()> {
    if expected.scalar_kind() == Some(value.kind()) {
        Ok(())
    } else {
        Err(QTypeError::mismatch(expected.name(), value.qtype()))
    }
}

/// View a base-qtype value as a value of the derived qtype `derived`.
pub fn downcast(derived: QType, value: &QValue) -> Result<QValue> {
    if !qtype::is_derived_qtype(derived) {
        return Err(QTypeError::mismatch("a derived qtype", derived));
    }
    if derived.decay() != value.qtype.decay() {
        return Err(QTypeError::mismatch(derived.decay().name(), value.qtype));
    }
    Ok(value.with_qtype(derived))
}

/// Base representation of a (possibly derived) value.
pub fn upcast(value: &QValue) -> QValue {
    match value.qtype.kind() {
        QTypeKind::NamedTuple { .. } | QTypeKind::Labeled { .. } => {
            value.with_qtype(value.qtype.decay())
        }
        _ => value.clone(),
    }
}

impl PartialEq for QValue {
    fn eq(&self, other: &Self) -> bool {
        self.qtype == other.qtype && self.fingerprint() == other.fingerprint()
    }
}

impl Eq for QValue {}

impl Hash for QValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.fingerprint().hash(state);
    }
}

impl fmt::Debug for QValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QValue({}: {})", self.qtype, self)
    }
}

impl From<Scalar> for QValue {
    fn from(value: Scalar) -> Self {
        Self::scalar(value)
    }
}

impl From<QType> for QValue {
    fn from(value: QType) -> Self {
        Self::from_qtype(value)
    }
}

impl From<ForeignObject> for QValue {
    fn from(value: ForeignObject) -> Self {
        Self::foreign(value)
    }
}

macro_rules! scalar_conversions {
    ($( $ty:ty => |$v:ident| $scalar:expr ),* $(,)?) => {
        $(
            impl From<$ty> for Scalar {
                fn from($v: $ty) -> Self {
                    $scalar
                }
            }

            impl From<$ty> for QValue {
                fn from(v: $ty) -> Self {
                    QValue::scalar(Scalar::from(v))
                }
            }

            impl From<Option<$ty>> for QValue {
                fn from(v: Option<$ty>) -> Self {
                    match v {
                        Some(v) => QValue::present(Scalar::from(v)),
                        None => {
                            let qtype = Scalar::from(<$ty>::default()).qtype();
                            QValue::new(
                                qtype::optional_qtype(qtype).unwrap_or(qtype),
                                Data::Optional(None),
                            )
                        }
                    }
                }
            }
        )*
    };
}

scalar_conversions! {
    () => |_v| Scalar::Unit,
    bool => |v| Scalar::Boolean(v),
    i32 => |v| Scalar::Int32(v),
    i64 => |v| Scalar::Int64(v),
    f32 => |v| Scalar::Float32(v),
    f64 => |v| Scalar::Float64(v),
    String => |v| Scalar::Text(v),
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Text(v.to_owned())
    }
}

impl From<&str> for QValue {
    fn from(v: &str) -> Self {
        QValue::scalar(Scalar::from(v))
    }
}
