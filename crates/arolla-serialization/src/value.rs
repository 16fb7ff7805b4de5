//! Whole-value encoding.

use std::collections::HashMap;

use arolla_core::qtype::{QType, QTypeKind};
use arolla_core::{QTypeError, QValue, Scalar, downcast, upcast};

use crate::envelope;
use crate::error::{CodecError, Result};
use crate::options::DecodeOptions;
use crate::proto::{BodyProto, NodeId, QTypeNode, ScalarProto, ValueNode, node_id, qtype_at};
use crate::registry::CodecRegistry;

/// Serialize `value` into a checksummed envelope.
///
/// Every foreign object inside must name a codec registered in `registry`.
pub fn encode_value(value: &QValue, registry: &CodecRegistry) -> Result<Vec<u8>> {
    let mut encoder = Encoder {
        registry,
        body: BodyProto::default(),
        qtype_ids: HashMap::new(),
    };
    encoder.value(value)?;
    let body = postcard::to_allocvec(&encoder.body)?;
    tracing::trace!(qtype = %value.qtype(), len = body.len(), "encoded qvalue");
    envelope::seal(&body)
}

/// Read a value written by [`encode_value`].
///
/// The envelope is validated before the body is parsed, and the declared
/// qtypes are checked against `options` before any of them is interned.
/// Foreign objects are rebuilt by the codecs registered in `registry` under
/// the names they were written with.
pub fn decode_value(
    bytes: &[u8],
    registry: &CodecRegistry,
    options: &DecodeOptions,
) -> Result<QValue> {
    let body = envelope::open(bytes)?;
    let proto: BodyProto = postcard::from_bytes(body)?;
    let qtypes = intern_qtypes(&proto.qtypes, options)?;
    let value = build_values(proto.values, &qtypes, registry, options)?;
    tracing::trace!(qtype = %value.qtype(), len = body.len(), "decoded qvalue");
    Ok(value)
}

struct Encoder<'a> {
    registry: &'a CodecRegistry,
    body: BodyProto,
    qtype_ids: HashMap<QType, NodeId>,
}

impl Encoder<'_> {
    fn qtype(&mut self, qtype: QType) -> Result<NodeId> {
        if let Some(&id) = self.qtype_ids.get(&qtype) {
            return Ok(id);
        }
        let node = QTypeNode::from_qtype(qtype, |component| self.qtype(component))?;
        let id = node_id(self.body.qtypes.len())?;
        self.body.qtypes.push(node);
        self.qtype_ids.insert(qtype, id);
        Ok(id)
    }

    fn scalar(&mut self, scalar: &Scalar) -> Result<ScalarProto> {
        ScalarProto::from_scalar(scalar, |qtype| self.qtype(qtype))
    }

    /// Append `value` after its children; returns its id.
    fn value(&mut self, value: &QValue) -> Result<NodeId> {
        let qtype = value.qtype();
        // Constructors keep qtype and payload consistent.
        let malformed = || QTypeError::mismatch(format!("{qtype} payload"), qtype);
        let node = match qtype.kind() {
            QTypeKind::Scalar(_) => {
                ValueNode::Scalar(self.scalar(value.as_scalar().ok_or_else(malformed)?)?)
            }
            QTypeKind::Optional(value_qtype) => {
                let present = value.as_optional().ok_or_else(malformed)?;
                ValueNode::Optional {
                    value_qtype: self.qtype(*value_qtype)?,
                    value: present.map(|scalar| self.scalar(scalar)).transpose()?,
                }
            }
            QTypeKind::DenseArray(value_qtype) => {
                let elements = value.as_dense_array().ok_or_else(malformed)?;
                ValueNode::DenseArray {
                    value_qtype: self.qtype(*value_qtype)?,
                    values: elements
                        .iter()
                        .map(|element| element.as_ref().map(|s| self.scalar(s)).transpose())
                        .collect::<Result<_>>()?,
                }
            }
            QTypeKind::Tuple(_) => {
                let fields = value
                    .as_tuple()
                    .ok_or_else(malformed)?
                    .iter()
                    .map(|field| self.value(field))
                    .collect::<Result<_>>()?;
                ValueNode::Tuple {
                    qtype: self.qtype(qtype)?,
                    fields,
                }
            }
            QTypeKind::Sequence(_) => {
                let values = value
                    .as_sequence()
                    .ok_or_else(malformed)?
                    .iter()
                    .map(|element| self.value(element))
                    .collect::<Result<_>>()?;
                ValueNode::Sequence {
                    qtype: self.qtype(qtype)?,
                    values,
                }
            }
            QTypeKind::ForeignObject => {
                let object = value.as_foreign().ok_or_else(malformed)?;
                let (codec, payload) = self.registry.encode(object)?;
                ValueNode::Foreign { codec, payload }
            }
            QTypeKind::NamedTuple { .. } | QTypeKind::Labeled { .. } => {
                let base = self.value(&upcast(value))?;
                ValueNode::Derived {
                    qtype: self.qtype(qtype)?,
                    base,
                }
            }
        };
        let id = node_id(self.body.values.len())?;
        self.body.values.push(node);
        Ok(id)
    }
}

#[derive(Clone, Copy)]
struct QTypeShape {
    depth: usize,
    size: usize,
}

/// Check every declared qtype against the limits, then intern them in order.
fn intern_qtypes(nodes: &[QTypeNode], options: &DecodeOptions) -> Result<Vec<QType>> {
    let limit = options.get_max_qtypes();
    if nodes.len() > limit {
        return Err(CodecError::TooManyQTypes {
            count: nodes.len(),
            limit,
        });
    }

    let mut shapes: Vec<QTypeShape> = Vec::with_capacity(nodes.len());
    for node in nodes {
        let mut shape = QTypeShape {
            depth: 1,
            size: 1usize.saturating_add(node.text_len()),
        };
        for &id in node.components() {
            let component = shapes.get(id as usize).ok_or_else(|| {
                CodecError::Invalid(format!(
                    "qtype #{} refers to qtype #{id}, which is not declared before it",
                    shapes.len()
                ))
            })?;
            shape.depth = shape.depth.max(component.depth + 1);
            shape.size = shape.size.saturating_add(component.size);
        }
        if shape.depth > options.get_max_depth() {
            return Err(CodecError::DepthExceeded {
                limit: options.get_max_depth(),
            });
        }
        if shape.size > options.get_max_qtype_size() {
            return Err(CodecError::QTypeTooLarge {
                size: shape.size,
                limit: options.get_max_qtype_size(),
            });
        }
        shapes.push(shape);
    }

    let mut qtypes = Vec::with_capacity(nodes.len());
    for node in nodes {
        let qtype = node.intern(&qtypes)?;
        qtypes.push(qtype);
    }
    Ok(qtypes)
}

/// Build the value tree bottom-up. Every node but the last must be used
/// exactly once as a child of a later node.
fn build_values(
    nodes: Vec<ValueNode>,
    qtypes: &[QType],
    registry: &CodecRegistry,
    options: &DecodeOptions,
) -> Result<QValue> {
    let mut slots: Vec<Option<(QValue, usize)>> = Vec::with_capacity(nodes.len());
    for node in nodes {
        let index = slots.len();
        let mut depth = 1;
        let mut children = Vec::with_capacity(node.children().len());
        for &id in node.children() {
            let (child, child_depth) = slots
                .get_mut(id as usize)
                .and_then(Option::take)
                .ok_or_else(|| {
                    CodecError::Invalid(format!(
                        "value #{index} refers to value #{id}, which is undeclared or already used"
                    ))
                })?;
            depth = depth.max(child_depth + 1);
            children.push(child);
        }
        if depth > options.get_max_depth() {
            return Err(CodecError::DepthExceeded {
                limit: options.get_max_depth(),
            });
        }
        let value = build_value(node, children, qtypes, registry, options)?;
        slots.push(Some((value, depth)));
    }

    let (root, _) = slots
        .pop()
        .flatten()
        .ok_or_else(|| CodecError::Invalid("no root value".to_owned()))?;
    if let Some(unused) = slots.iter().position(Option::is_some) {
        return Err(CodecError::Invalid(format!("value #{unused} is never used")));
    }
    Ok(root)
}

fn build_value(
    node: ValueNode,
    children: Vec<QValue>,
    qtypes: &[QType],
    registry: &CodecRegistry,
    options: &DecodeOptions,
) -> Result<QValue> {
    Ok(match node {
        ValueNode::Scalar(scalar) => QValue::scalar(scalar.into_scalar(qtypes)?),
        ValueNode::Optional { value_qtype, value } => {
            let value = value.map(|s| s.into_scalar(qtypes)).transpose()?;
            QValue::optional(qtype_at(qtypes, value_qtype)?, value)?
        }
        ValueNode::DenseArray {
            value_qtype,
            values,
        } => {
            let values = values
                .into_iter()
                .map(|v| v.map(|s| s.into_scalar(qtypes)).transpose())
                .collect::<Result<Vec<_>>>()?;
            QValue::dense_array(qtype_at(qtypes, value_qtype)?, values)?
        }
        ValueNode::Tuple { qtype, .. } => {
            check_tuple_fields(qtype_at(qtypes, qtype)?, &children)?;
            QValue::tuple(children)
        }
        ValueNode::Sequence { qtype, .. } => {
            let qtype = qtype_at(qtypes, qtype)?;
            let QTypeKind::Sequence(value_qtype) = qtype.kind() else {
                return Err(QTypeError::mismatch("a sequence qtype", qtype).into());
            };
            QValue::sequence(*value_qtype, children)?
        }
        ValueNode::Derived { qtype, .. } => {
            let base = children
                .into_iter()
                .next()
                .ok_or_else(|| CodecError::Invalid("derived value without a base".to_owned()))?;
            downcast(qtype_at(qtypes, qtype)?, &base)?
        }
        ValueNode::Foreign { codec, payload } => {
            QValue::foreign(registry.decode(&codec, &payload, options)?)
        }
    })
}

/// Fields must match the declared tuple qtype exactly, so building the tuple
/// finds that qtype instead of interning a new one.
fn check_tuple_fields(qtype: QType, fields: &[QValue]) -> Result<()> {
    let QTypeKind::Tuple(expected) = qtype.kind() else {
        return Err(QTypeError::mismatch("a tuple qtype", qtype).into());
    };
    if expected.len() != fields.len() {
        return Err(QTypeError::FieldCountMismatch {
            expected: expected.len(),
            actual: fields.len(),
        }
        .into());
    }
    for (expected, field) in expected.iter().zip(fields) {
        if field.qtype() != *expected {
            return Err(QTypeError::mismatch(expected.name(), field.qtype()).into());
        }
    }
    Ok(())
}
