//! Serde mirror of qtypes and qvalues.
//!
//! A body is two flat tables. Qtypes are stored structurally, once each, and
//! re-interned on decode, so a value read back carries the same canonical
//! qtype handle it was written with. Values form a tree in post-order: every
//! node refers to earlier nodes by index and the root is the last one.
//! Nothing in the wire format nests, so parsing never recurses.

use arolla_core::qtype::{
    FOREIGN_OBJECT, QType, QTypeKind, ScalarKind, dense_array_qtype, labeled_qtype,
    named_tuple_qtype, optional_qtype, sequence_qtype, tuple_qtype,
};
use arolla_core::qvalue::scalar_qtype_for;
use arolla_core::Scalar;
use serde::{Deserialize, Serialize};

use crate::error::{CodecError, Result};

/// Index into one of the body tables.
pub(crate) type NodeId = u32;

#[derive(Serialize, Deserialize, Debug, PartialEq, Default)]
pub(crate) struct BodyProto {
    pub(crate) qtypes: Vec<QTypeNode>,
    pub(crate) values: Vec<ValueNode>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ScalarKindProto {
    Unit,
    Boolean,
    Int32,
    Int64,
    Float32,
    Float64,
    Bytes,
    Text,
    QType,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub(crate) enum QTypeNode {
    Scalar(ScalarKindProto),
    Optional(NodeId),
    DenseArray(NodeId),
    Tuple(Vec<NodeId>),
    NamedTuple {
        field_names: Vec<String>,
        base: NodeId,
    },
    Sequence(NodeId),
    Labeled {
        label: String,
        base: NodeId,
    },
    ForeignObject,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub(crate) enum ScalarProto {
    Unit,
    Boolean(bool),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Bytes(Vec<u8>),
    Text(String),
    QType(NodeId),
}

/// Qtype references point into [`BodyProto::qtypes`], value references into
/// [`BodyProto::values`].
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub(crate) enum ValueNode {
    Scalar(ScalarProto),
    Optional {
        value_qtype: NodeId,
        value: Option<ScalarProto>,
    },
    DenseArray {
        value_qtype: NodeId,
        values: Vec<Option<ScalarProto>>,
    },
    Tuple {
        qtype: NodeId,
        fields: Vec<NodeId>,
    },
    Sequence {
        qtype: NodeId,
        values: Vec<NodeId>,
    },
    /// A named tuple or labeled value, stored as its base value.
    Derived {
        qtype: NodeId,
        base: NodeId,
    },
    Foreign {
        codec: String,
        payload: Vec<u8>,
    },
}

impl From<ScalarKind> for ScalarKindProto {
    fn from(kind: ScalarKind) -> Self {
        match kind {
            ScalarKind::Unit => Self::Unit,
            ScalarKind::Boolean => Self::Boolean,
            ScalarKind::Int32 => Self::Int32,
            ScalarKind::Int64 => Self::Int64,
            ScalarKind::Float32 => Self::Float32,
            ScalarKind::Float64 => Self::Float64,
            ScalarKind::Bytes => Self::Bytes,
            ScalarKind::Text => Self::Text,
            ScalarKind::QType => Self::QType,
        }
    }
}

impl From<ScalarKindProto> for ScalarKind {
    fn from(kind: ScalarKindProto) -> Self {
        match kind {
            ScalarKindProto::Unit => Self::Unit,
            ScalarKindProto::Boolean => Self::Boolean,
            ScalarKindProto::Int32 => Self::Int32,
            ScalarKindProto::Int64 => Self::Int64,
            ScalarKindProto::Float32 => Self::Float32,
            ScalarKindProto::Float64 => Self::Float64,
            ScalarKindProto::Bytes => Self::Bytes,
            ScalarKindProto::Text => Self::Text,
            ScalarKindProto::QType => Self::QType,
        }
    }
}

pub(crate) fn node_id(index: usize) -> Result<NodeId> {
    NodeId::try_from(index).map_err(|_| CodecError::Invalid(format!("node index {index} does not fit in 32 bits")))
}

/// The already interned qtype `id` refers to.
pub(crate) fn qtype_at(qtypes: &[QType], id: NodeId) -> Result<QType> {
    qtypes
        .get(id as usize)
        .copied()
        .ok_or_else(|| CodecError::Invalid(format!("reference to unknown qtype #{id}")))
}

impl QTypeNode {
    /// Node describing `qtype`; `component` assigns ids to its components.
    pub(crate) fn from_qtype(
        qtype: QType,
        mut component: impl FnMut(QType) -> Result<NodeId>,
    ) -> Result<Self> {
        Ok(match qtype.kind() {
            QTypeKind::Scalar(kind) => Self::Scalar((*kind).into()),
            QTypeKind::Optional(value) => Self::Optional(component(*value)?),
            QTypeKind::DenseArray(value) => Self::DenseArray(component(*value)?),
            QTypeKind::Tuple(fields) => Self::Tuple(
                fields
                    .iter()
                    .map(|field| component(*field))
                    .collect::<Result<_>>()?,
            ),
            QTypeKind::NamedTuple { field_names, base } => Self::NamedTuple {
                field_names: field_names.clone(),
                base: component(*base)?,
            },
            QTypeKind::Sequence(value) => Self::Sequence(component(*value)?),
            QTypeKind::Labeled { label, base } => Self::Labeled {
                label: label.clone(),
                base: component(*base)?,
            },
            QTypeKind::ForeignObject => Self::ForeignObject,
        })
    }

    pub(crate) fn components(&self) -> &[NodeId] {
        match self {
            Self::Scalar(_) | Self::ForeignObject => &[],
            Self::Optional(id)
            | Self::DenseArray(id)
            | Self::Sequence(id)
            | Self::NamedTuple { base: id, .. }
            | Self::Labeled { base: id, .. } => std::slice::from_ref(id),
            Self::Tuple(fields) => fields,
        }
    }

    /// Bytes of names and labels stored in the node itself.
    pub(crate) fn text_len(&self) -> usize {
        match self {
            Self::NamedTuple { field_names, .. } => field_names.iter().map(String::len).sum(),
            Self::Labeled { label, .. } => label.len(),
            _ => 0,
        }
    }

    /// Intern the described qtype; components come from `qtypes`.
    pub(crate) fn intern(&self, qtypes: &[QType]) -> Result<QType> {
        let at = |id: &NodeId| qtype_at(qtypes, *id);
        Ok(match self {
            Self::Scalar(kind) => scalar_qtype_for((*kind).into()),
            Self::Optional(value) => optional_qtype(at(value)?)?,
            Self::DenseArray(value) => dense_array_qtype(at(value)?)?,
            Self::Tuple(fields) => {
                let fields = fields.iter().map(at).collect::<Result<Vec<_>>>()?;
                tuple_qtype(&fields)
            }
            Self::NamedTuple { field_names, base } => {
                let names: Vec<&str> = field_names.iter().map(String::as_str).collect();
                named_tuple_qtype(&names, at(base)?)?
            }
            Self::Sequence(value) => sequence_qtype(at(value)?),
            Self::Labeled { label, base } => labeled_qtype(at(base)?, label)?,
            Self::ForeignObject => FOREIGN_OBJECT,
        })
    }
}

impl ScalarProto {
    pub(crate) fn from_scalar(
        value: &Scalar,
        mut qtype_id: impl FnMut(QType) -> Result<NodeId>,
    ) -> Result<Self> {
        Ok(match value {
            Scalar::Unit => Self::Unit,
            Scalar::Boolean(v) => Self::Boolean(*v),
            Scalar::Int32(v) => Self::Int32(*v),
            Scalar::Int64(v) => Self::Int64(*v),
            Scalar::Float32(v) => Self::Float32(*v),
            Scalar::Float64(v) => Self::Float64(*v),
            Scalar::Bytes(v) => Self::Bytes(v.clone()),
            Scalar::Text(v) => Self::Text(v.clone()),
            Scalar::QType(v) => Self::QType(qtype_id(*v)?),
        })
    }

    pub(crate) fn into_scalar(self, qtypes: &[QType]) -> Result<Scalar> {
        Ok(match self {
            Self::Unit => Scalar::Unit,
            Self::Boolean(v) => Scalar::Boolean(v),
            Self::Int32(v) => Scalar::Int32(v),
            Self::Int64(v) => Scalar::Int64(v),
            Self::Float32(v) => Scalar::Float32(v),
            Self::Float64(v) => Scalar::Float64(v),
            Self::Bytes(v) => Scalar::Bytes(v),
            Self::Text(v) => Scalar::Text(v),
            Self::QType(id) => Scalar::QType(qtype_at(qtypes, id)?),
        })
    }
}

impl ValueNode {
    /// Value nodes this node takes ownership of.
    pub(crate) fn children(&self) -> &[NodeId] {
        match self {
            Self::Tuple { fields: ids, .. } | Self::Sequence { values: ids, .. } => ids,
            Self::Derived { base, .. } => std::slice::from_ref(base),
            Self::Scalar(_)
            | Self::Optional { .. }
            | Self::DenseArray { .. }
            | Self::Foreign { .. } => &[],
        }
    }
}
