//! Builtin qtypes, available as statics.

use super::{QType, QTypeInfo, QTypeKind, ScalarKind};

macro_rules! scalar_qtypes {
    ($( $kind:ident => $scalar:ident, $scalar_info:ident, $optional:ident, $optional_info:ident, $array:ident, $array_info:ident; )*) => {
        $(
            static $scalar_info: QTypeInfo =
                QTypeInfo::builtin(stringify!($scalar), QTypeKind::Scalar(ScalarKind::$kind));
            pub static $scalar: QType = QType::from_static(&$scalar_info);

            static $optional_info: QTypeInfo = QTypeInfo::builtin(
                stringify!($optional),
                QTypeKind::Optional(QType::from_static(&$scalar_info)),
            );
            pub static $optional: QType = QType::from_static(&$optional_info);

            static $array_info: QTypeInfo = QTypeInfo::builtin(
                stringify!($array),
                QTypeKind::DenseArray(QType::from_static(&$scalar_info)),
            );
            pub static $array: QType = QType::from_static(&$array_info);
        )*

        /// Every builtin scalar qtype with its optional and array forms.
        pub(crate) fn builtin_families() -> Vec<(QType, QType, QType)> {
            vec![$( ($scalar, $optional, $array) ),*]
        }
    };
}

scalar_qtypes! {
    Unit => UNIT, UNIT_INFO, OPTIONAL_UNIT, OPTIONAL_UNIT_INFO, DENSE_ARRAY_UNIT, DENSE_ARRAY_UNIT_INFO;
    Boolean => BOOLEAN, BOOLEAN_INFO, OPTIONAL_BOOLEAN, OPTIONAL_BOOLEAN_INFO, DENSE_ARRAY_BOOLEAN, DENSE_ARRAY_BOOLEAN_INFO;
    Int32 => INT32, INT32_INFO, OPTIONAL_INT32, OPTIONAL_INT32_INFO, DENSE_ARRAY_INT32, DENSE_ARRAY_INT32_INFO;
    Int64 => INT64, INT64_INFO, OPTIONAL_INT64, OPTIONAL_INT64_INFO, DENSE_ARRAY_INT64, DENSE_ARRAY_INT64_INFO;
    Float32 => FLOAT32, FLOAT32_INFO, OPTIONAL_FLOAT32, OPTIONAL_FLOAT32_INFO, DENSE_ARRAY_FLOAT32, DENSE_ARRAY_FLOAT32_INFO;
    Float64 => FLOAT64, FLOAT64_INFO, OPTIONAL_FLOAT64, OPTIONAL_FLOAT64_INFO, DENSE_ARRAY_FLOAT64, DENSE_ARRAY_FLOAT64_INFO;
    Bytes => BYTES, BYTES_INFO, OPTIONAL_BYTES, OPTIONAL_BYTES_INFO, DENSE_ARRAY_BYTES, DENSE_ARRAY_BYTES_INFO;
    Text => TEXT, TEXT_INFO, OPTIONAL_TEXT, OPTIONAL_TEXT_INFO, DENSE_ARRAY_TEXT, DENSE_ARRAY_TEXT_INFO;
}

static QTYPE_INFO: QTypeInfo = QTypeInfo::builtin("QTYPE", QTypeKind::Scalar(ScalarKind::QType));
/// The qtype of qtype values.
pub static QTYPE: QType = QType::from_static(&QTYPE_INFO);

static FOREIGN_OBJECT_INFO: QTypeInfo =
    QTypeInfo::builtin("FOREIGN_OBJECT", QTypeKind::ForeignObject);
/// Opaque host-language payloads.
pub static FOREIGN_OBJECT: QType = QType::from_static(&FOREIGN_OBJECT_INFO);
