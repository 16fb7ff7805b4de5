//! Text representation of qvalues.
//!
//! INT32, FLOAT32, BOOLEAN, TEXT and BYTES print as bare literals; other
//! scalars carry their type, e.g. `int64{1}`.

use std::fmt::{self, Write as _};

use super::{Data, QValue, Scalar};
use crate::qtype::{QType, QTypeKind, ScalarKind};

impl fmt::Display for QValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        format_qvalue(&mut out, self);
        f.write_str(&out)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        format_scalar(&mut out, self);
        f.write_str(&out)
    }
}

fn format_qvalue(out: &mut String, value: &QValue) {
    match (value.qtype.kind(), value.data()) {
        (QTypeKind::Scalar(_), Data::Scalar(s)) => format_scalar(out, s),
        (QTypeKind::Optional(scalar), Data::Optional(v)) => format_optional(out, *scalar, v),
        (QTypeKind::DenseArray(scalar), Data::DenseArray(values)) => {
            format_dense_array(out, *scalar, values)
        }
        (QTypeKind::Tuple(_), Data::Tuple(fields)) => format_tuple(out, fields),
        (QTypeKind::NamedTuple { .. }, Data::Tuple(fields)) => {
            let _ = write!(out, "{}{{", value.qtype);
            format_tuple(out, fields);
            out.push('}');
        }
        (QTypeKind::Sequence(value_qtype), Data::Sequence(values)) => {
            out.push_str("sequence(");
            for v in values {
                format_qvalue(out, v);
                out.push_str(", ");
            }
            let _ = write!(out, "value_qtype={value_qtype})");
        }
        (QTypeKind::Labeled { .. }, _) => {
            let _ = write!(out, "{}{{", value.qtype);
            format_qvalue(out, &super::upcast(value));
            out.push('}');
        }
        (_, Data::Foreign(object)) => {
            let _ = write!(out, "foreign_object<{}>", object.type_name());
            if let Some(codec) = object.codec() {
                let _ = write!(out, "{{codec={codec}}}");
            }
        }
        (kind, data) => {
            // Constructors keep qtype and data consistent.
            let _ = write!(out, "<malformed {kind:?}: {data:?}>");
        }
    }
}

fn is_bare_kind(kind: ScalarKind) -> bool {
    matches!(
        kind,
        ScalarKind::Int32
            | ScalarKind::Float32
            | ScalarKind::Boolean
            | ScalarKind::Text
            | ScalarKind::Bytes
    )
}

fn format_scalar(out: &mut String, value: &Scalar) {
    match value {
        Scalar::Int64(_) | Scalar::Float64(_) => {
            let _ = write!(out, "{}{{", value.kind_name());
            format_payload(out, value);
            out.push('}');
        }
        _ => format_payload(out, value),
    }
}

/// Payload without type decoration.
fn format_payload(out: &mut String, value: &Scalar) {
    match value {
        Scalar::Unit => out.push_str("unit"),
        Scalar::Boolean(v) => {
            let _ = write!(out, "{v}");
        }
        Scalar::Int32(v) => {
            let _ = write!(out, "{v}");
        }
        Scalar::Int64(v) => {
            let _ = write!(out, "{v}");
        }
        Scalar::Float32(v) => format_float(out, *v as f64, v.to_string()),
        Scalar::Float64(v) => format_float(out, *v, v.to_string()),
        Scalar::Bytes(v) => {
            out.push_str("b'");
            for &b in v {
                match b {
                    b'\'' => out.push_str("\\'"),
                    b'\\' => out.push_str("\\\\"),
                    0x20..=0x7e => out.push(b as char),
                    _ => {
                        let _ = write!(out, "\\x{b:02x}");
                    }
                }
            }
            out.push('\'');
        }
        Scalar::Text(v) => {
            out.push('\'');
            for c in v.chars() {
                match c {
                    '\'' => out.push_str("\\'"),
                    '\\' => out.push_str("\\\\"),
                    '\n' => out.push_str("\\n"),
                    _ => out.push(c),
                }
            }
            out.push('\'');
        }
        Scalar::QType(v) => out.push_str(v.name()),
    }
}

/// `shortest` is the shortest round-trip text of the float at its own width.
fn format_float(out: &mut String, value: f64, shortest: String) {
    if value.is_nan() {
        out.push_str("nan");
    } else if value.is_infinite() {
        out.push_str(if value > 0.0 { "inf" } else { "-inf" });
    } else {
        out.push_str(&shortest);
        if !shortest.contains(['.', 'e']) {
            out.push('.');
        }
    }
}

fn format_optional(out: &mut String, scalar: QType, value: &Option<Scalar>) {
    if scalar.scalar_kind() == Some(ScalarKind::Unit) {
        out.push_str(if value.is_some() { "present" } else { "missing" });
        return;
    }
    let _ = write!(out, "optional_{}{{", scalar.name().to_ascii_lowercase());
    match value {
        Some(v) => format_payload(out, v),
        None => out.push_str("NA"),
    }
    out.push('}');
}

fn format_dense_array(out: &mut String, scalar: QType, values: &[Option<Scalar>]) {
    out.push_str("dense_array([");
    for (i, v) in values.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        match v {
            Some(v) => format_payload(out, v),
            None => out.push_str("NA"),
        }
    }
    out.push(']');
    let bare = scalar.scalar_kind().is_some_and(is_bare_kind);
    if values.is_empty() || !bare {
        let _ = write!(out, ", value_qtype={scalar}");
    }
    out.push(')');
}

fn format_tuple(out: &mut String, fields: &[QValue]) {
    out.push('(');
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        format_qvalue(out, field);
    }
    if fields.len() == 1 {
        out.push(',');
    }
    out.push(')');
}

impl Scalar {
    fn kind_name(&self) -> &'static str {
        match self.kind() {
            ScalarKind::Unit => "unit",
            ScalarKind::Boolean => "boolean",
            ScalarKind::Int32 => "int32",
            ScalarKind::Int64 => "int64",
            ScalarKind::Float32 => "float32",
            ScalarKind::Float64 => "float64",
            ScalarKind::Bytes => "bytes",
            ScalarKind::Text => "text",
            ScalarKind::QType => "qtype",
        }
    }
}
