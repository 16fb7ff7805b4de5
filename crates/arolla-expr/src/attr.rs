//! Statically known facts about an expression node.

use arolla_core::{QType, QValue};

/// The qtype of a node's result and, when known at construction time, its
/// value. A known value always implies the matching qtype.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Attr {
    qtype: Option<QType>,
    value: Option<QValue>,
}

impl Attr {
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn from_qtype(qtype: QType) -> Self {
        Self {
            qtype: Some(qtype),
            value: None,
        }
    }

    pub fn from_value(value: QValue) -> Self {
        Self {
            qtype: Some(value.qtype()),
            value: Some(value),
        }
    }

    pub fn qtype(&self) -> Option<QType> {
        self.qtype
    }

    pub fn value(&self) -> Option<&QValue> {
        self.value.as_ref()
    }

    pub fn is_unknown(&self) -> bool {
        self.qtype.is_none()
    }
}
