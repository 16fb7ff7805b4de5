use std::sync::Arc;

use arolla_core::qtype::{FLOAT32, INT32, TEXT, labeled_qtype};
use arolla_core::{ForeignObject, QTypeError, QValue, Scalar, downcast};
use insta::assert_snapshot;
use serde::{Deserialize, Serialize};

use crate::codec::JsonCodec;
use crate::envelope::{open, seal};
use crate::error::{CodecError, Result};
use crate::options::DecodeOptions;
use crate::proto::{BodyProto, QTypeNode, ScalarKindProto, ScalarProto, ValueNode};
use crate::registry::CodecRegistry;
use crate::value::{decode_value, encode_value};

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Model {
    name: String,
    weights: Vec<f64>,
}

fn model() -> Model {
    Model {
        name: "linear".to_owned(),
        weights: vec![0.5, -1.25],
    }
}

fn registry_with_model_codec() -> CodecRegistry {
    let registry = CodecRegistry::new();
    registry
        .register("test.model", Arc::new(JsonCodec::<Model>::new("test.model")))
        .unwrap();
    registry
}

fn round_trip(value: &QValue) -> QValue {
    let registry = CodecRegistry::new();
    let bytes = encode_value(value, &registry).unwrap();
    decode_value(&bytes, &registry, &DecodeOptions::default()).unwrap()
}

#[test]
fn scalars_keep_qtype_and_value() {
    for value in [
        QValue::from(1),
        QValue::from(1_i64),
        QValue::from(0.5_f32),
        QValue::from(f64::NAN),
        QValue::from(true),
        QValue::from("text"),
        QValue::bytes(b"\x00\xff".to_vec()),
        QValue::unit(),
        QValue::from_qtype(FLOAT32),
    ] {
        let decoded = round_trip(&value);
        assert_eq!(decoded.qtype(), value.qtype());
        assert_eq!(decoded, value);
    }
}

#[test]
fn containers_keep_structure() {
    let value = QValue::tuple(vec![
        QValue::missing(FLOAT32).unwrap(),
        QValue::present(Scalar::Int32(7)),
        QValue::dense_array(INT32, vec![Some(Scalar::Int32(1)), None]).unwrap(),
        QValue::sequence(TEXT, vec![QValue::from("a"), QValue::from("b")]).unwrap(),
        QValue::sequence(INT32, vec![]).unwrap(),
    ]);

    let decoded = round_trip(&value);

    assert_eq!(decoded, value);
    assert_snapshot!(decoded, @"(optional_float32{NA}, optional_int32{7}, dense_array([1, NA]), sequence('a', 'b', value_qtype=TEXT), sequence(value_qtype=INT32))");
}

#[test]
fn derived_values_keep_their_qtype() {
    let named = QValue::named_tuple(vec![("a", QValue::from(1)), ("b", QValue::from(2.0_f32))])
        .unwrap();
    let labeled = downcast(labeled_qtype(INT32, "meters").unwrap(), &QValue::from(3)).unwrap();

    for value in [named, labeled] {
        let decoded = round_trip(&value);
        assert_eq!(decoded.qtype(), value.qtype());
        assert_eq!(decoded, value);
    }
}

#[test]
fn foreign_payload_survives_a_fresh_registry() {
    let writer = registry_with_model_codec();
    let value = QValue::foreign(ForeignObject::with_codec(model(), "test.model"));
    let bytes = encode_value(&value, &writer).unwrap();

    let reader = registry_with_model_codec();
    let decoded = decode_value(&bytes, &reader, &DecodeOptions::default()).unwrap();

    let object = decoded.as_foreign().unwrap();
    assert_eq!(object.downcast_ref::<Model>(), Some(&model()));
    assert_eq!(object.codec(), Some("test.model"));
}

#[test]
fn foreign_payload_inside_a_tuple() {
    let registry = registry_with_model_codec();
    let value = QValue::tuple(vec![
        QValue::from(1),
        QValue::foreign(ForeignObject::with_codec(model(), "test.model")),
    ]);

    let bytes = encode_value(&value, &registry).unwrap();
    let decoded = decode_value(&bytes, &registry, &DecodeOptions::default()).unwrap();

    assert_eq!(decoded.qtype(), value.qtype());
    let fields = decoded.as_tuple().unwrap();
    assert_eq!(fields[0], QValue::from(1));
    let object = fields[1].as_foreign().unwrap();
    assert_eq!(object.downcast_ref::<Model>(), Some(&model()));
}

#[test]
fn decoding_without_the_codec_fails() {
    let writer = registry_with_model_codec();
    let value = QValue::foreign(ForeignObject::with_codec(model(), "test.model"));
    let bytes = encode_value(&value, &writer).unwrap();

    let err = decode_value(&bytes, &CodecRegistry::new(), &DecodeOptions::default()).unwrap_err();

    assert!(matches!(&err, CodecError::NotFound(name) if name == "test.model"));
}

#[test]
fn encoding_requires_a_resolvable_codec() {
    let value = QValue::foreign(ForeignObject::with_codec(model(), "test.model"));

    let err = encode_value(&value, &CodecRegistry::new()).unwrap_err();

    assert_snapshot!(err, @r#"codec "test.model" is not registered"#);
}

#[test]
fn corrupted_envelope_is_rejected_before_parsing() {
    let registry = CodecRegistry::new();
    let mut bytes = encode_value(&QValue::from("hello"), &registry).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0x01;

    let err = decode_value(&bytes, &registry, &DecodeOptions::default()).unwrap_err();

    assert!(matches!(err, CodecError::ChecksumMismatch { .. }));
}

fn decode_body(body: &BodyProto, options: &DecodeOptions) -> Result<QValue> {
    let bytes = seal(&postcard::to_allocvec(body).unwrap()).unwrap();
    decode_value(&bytes, &CodecRegistry::new(), options)
}

fn int32_body(qtypes: Vec<QTypeNode>, values: Vec<ValueNode>) -> BodyProto {
    let mut all = vec![QTypeNode::Scalar(ScalarKindProto::Int32)];
    all.extend(qtypes);
    BodyProto {
        qtypes: all,
        values,
    }
}

#[test]
fn repeated_qtypes_are_written_once() {
    let value = QValue::tuple(vec![QValue::from(1), QValue::from(2), QValue::from(3)]);
    let bytes = encode_value(&value, &CodecRegistry::new()).unwrap();

    let body: BodyProto = postcard::from_bytes(open(&bytes).unwrap()).unwrap();

    assert_eq!(body.qtypes.len(), 2);
    assert_eq!(body.values.len(), 4);
}

#[test]
fn nesting_deeper_than_the_limit_is_rejected() {
    let value = QValue::tuple(vec![QValue::tuple(vec![QValue::tuple(vec![QValue::from(1)])])]);
    let bytes = encode_value(&value, &CodecRegistry::new()).unwrap();

    assert_eq!(
        decode_value(&bytes, &CodecRegistry::new(), &DecodeOptions::default()).unwrap(),
        value
    );
    let err = decode_value(
        &bytes,
        &CodecRegistry::new(),
        &DecodeOptions::new().max_depth(3),
    )
    .unwrap_err();
    assert_snapshot!(err, @"nesting exceeds the depth limit of 3");
}

#[test]
fn very_deep_body_fails_without_recursing() {
    const DEPTH: u32 = 100_000;
    let qtypes = (0..DEPTH).map(|i| QTypeNode::Tuple(vec![i])).collect();
    let mut values = vec![ValueNode::Scalar(ScalarProto::Int32(1))];
    values.extend((0..DEPTH).map(|i| ValueNode::Tuple {
        qtype: i + 1,
        fields: vec![i],
    }));

    let err = decode_body(&int32_body(qtypes, values), &DecodeOptions::default()).unwrap_err();

    assert!(matches!(err, CodecError::DepthExceeded { limit: 100 }));
}

#[test]
fn too_many_declared_qtypes_are_rejected() {
    let qtypes = (0..2000)
        .map(|i| QTypeNode::Labeled {
            label: format!("unit{i}"),
            base: 0,
        })
        .collect();
    let values = vec![ValueNode::Scalar(ScalarProto::Int32(1))];

    let err = decode_body(&int32_body(qtypes, values), &DecodeOptions::default()).unwrap_err();

    assert!(matches!(
        err,
        CodecError::TooManyQTypes {
            count: 2001,
            limit: 1024
        }
    ));
}

#[test]
fn exponentially_shared_qtype_is_rejected_by_size() {
    let qtypes = (0..40).map(|i| QTypeNode::Tuple(vec![i, i])).collect();
    let values = vec![ValueNode::Scalar(ScalarProto::Int32(1))];

    let err = decode_body(&int32_body(qtypes, values), &DecodeOptions::default()).unwrap_err();

    assert_snapshot!(err, @"qtype of size 131071 exceeds the limit of 65536");
}

#[test]
fn references_must_point_backwards() {
    let body = BodyProto {
        qtypes: vec![
            QTypeNode::Tuple(vec![1]),
            QTypeNode::Scalar(ScalarKindProto::Int32),
        ],
        values: vec![ValueNode::Scalar(ScalarProto::Int32(1))],
    };

    let err = decode_body(&body, &DecodeOptions::default()).unwrap_err();

    assert_snapshot!(err, @"invalid body: qtype #0 refers to qtype #1, which is not declared before it");
}

#[test]
fn value_nodes_form_a_tree() {
    let shared = int32_body(
        vec![QTypeNode::Tuple(vec![0, 0])],
        vec![
            ValueNode::Scalar(ScalarProto::Int32(1)),
            ValueNode::Tuple {
                qtype: 1,
                fields: vec![0, 0],
            },
        ],
    );
    let err = decode_body(&shared, &DecodeOptions::default()).unwrap_err();
    assert_snapshot!(err, @"invalid body: value #1 refers to value #0, which is undeclared or already used");

    let dangling = int32_body(
        vec![],
        vec![
            ValueNode::Scalar(ScalarProto::Int32(1)),
            ValueNode::Scalar(ScalarProto::Int32(2)),
        ],
    );
    let err = decode_body(&dangling, &DecodeOptions::default()).unwrap_err();
    assert_snapshot!(err, @"invalid body: value #0 is never used");

    let err = decode_body(&BodyProto::default(), &DecodeOptions::default()).unwrap_err();
    assert_snapshot!(err, @"invalid body: no root value");
}

#[test]
fn tuple_fields_must_match_declared_qtype() {
    let body = int32_body(
        vec![
            QTypeNode::Scalar(ScalarKindProto::Float32),
            QTypeNode::Tuple(vec![1]),
        ],
        vec![
            ValueNode::Scalar(ScalarProto::Int32(1)),
            ValueNode::Tuple {
                qtype: 2,
                fields: vec![0],
            },
        ],
    );

    let err = decode_body(&body, &DecodeOptions::default()).unwrap_err();

    assert!(matches!(
        err,
        CodecError::QType(QTypeError::TypeMismatch { .. })
    ));
}
