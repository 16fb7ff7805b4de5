//! QType classification and shape lifting.

use super::{QType, QTypeKind, ScalarKind, dense_array_qtype, optional_qtype};
use crate::error::{QTypeError, Result};

pub fn is_scalar_qtype(qtype: QType) -> bool {
    matches!(qtype.kind(), QTypeKind::Scalar(_))
}

pub fn is_optional_qtype(qtype: QType) -> bool {
    matches!(qtype.kind(), QTypeKind::Optional(_))
}

pub fn is_dense_array_qtype(qtype: QType) -> bool {
    matches!(qtype.kind(), QTypeKind::DenseArray(_))
}

pub fn is_tuple_qtype(qtype: QType) -> bool {
    matches!(qtype.decay().kind(), QTypeKind::Tuple(_))
}

pub fn is_derived_qtype(qtype: QType) -> bool {
    matches!(
        qtype.kind(),
        QTypeKind::NamedTuple { .. } | QTypeKind::Labeled { .. }
    )
}

/// Scalar, optional or array qtype over a numeric scalar.
pub fn is_numeric_qtype(qtype: QType) -> bool {
    scalar_kind_of(qtype).and_then(ScalarKind::numeric_rank).is_some()
}

pub fn is_floating_point_qtype(qtype: QType) -> bool {
    scalar_kind_of(qtype).is_some_and(ScalarKind::is_floating_point)
}

pub fn is_integral_qtype(qtype: QType) -> bool {
    scalar_kind_of(qtype).is_some_and(ScalarKind::is_integral)
}

pub fn decay_derived_qtype(qtype: QType) -> QType {
    qtype.decay()
}

/// Underlying scalar of a scalar, optional or dense array qtype.
pub fn scalar_qtype_of(qtype: QType) -> Option<QType> {
    match qtype.kind() {
        QTypeKind::Scalar(_) => Some(qtype),
        QTypeKind::Optional(value) | QTypeKind::DenseArray(value) => Some(*value),
        _ => None,
    }
}

fn scalar_kind_of(qtype: QType) -> Option<ScalarKind> {
    scalar_qtype_of(qtype).and_then(QType::scalar_kind)
}

/// Pointwise shape of a scalar-like qtype.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum QTypeShape {
    Scalar,
    Optional,
    DenseArray,
}

impl QTypeShape {
    pub fn of(qtype: QType) -> Option<Self> {
        match qtype.kind() {
            QTypeKind::Scalar(_) => Some(Self::Scalar),
            QTypeKind::Optional(_) => Some(Self::Optional),
            QTypeKind::DenseArray(_) => Some(Self::DenseArray),
            _ => None,
        }
    }

    /// Wrap a scalar qtype into this shape.
    pub fn apply(self, scalar: QType) -> Result<QType> {
        match self {
            Self::Scalar => Ok(scalar),
            Self::Optional => optional_qtype(scalar),
            Self::DenseArray => dense_array_qtype(scalar),
        }
    }
}

/// Result qtype of a pointwise operation producing `scalar` values.
///
/// Any dense array input makes the result an array, otherwise any optional
/// input makes it optional.
pub fn broadcast_qtype(inputs: &[QType], scalar: QType) -> Result<QType> {
    let mut shape = QTypeShape::Scalar;
    for &input in inputs {
        let input_shape = QTypeShape::of(input)
            .ok_or_else(|| QTypeError::mismatch("scalar, optional or array", input))?;
        shape = shape.max(input_shape);
    }
    shape.apply(scalar)
}

/// Common numeric scalar of the inputs: INT32 < INT64 < FLOAT32 < FLOAT64.
pub fn common_scalar_qtype(inputs: &[QType]) -> Result<QType> {
    let mut best: Option<(u8, QType)> = None;
    for &input in inputs {
        let scalar =
            scalar_qtype_of(input).ok_or_else(|| QTypeError::mismatch("numeric", input))?;
        let rank = scalar
            .scalar_kind()
            .and_then(ScalarKind::numeric_rank)
            .ok_or_else(|| QTypeError::mismatch("numeric", input))?;
        if best.is_none_or(|(best_rank, _)| rank > best_rank) {
            best = Some((rank, scalar));
        }
    }
    best.map(|(_, qtype)| qtype)
        .ok_or(QTypeError::EmptyInputs("common_scalar_qtype"))
}
