//! Argument decoding: raw JSON into the typed value a parameter expects.

use base64::prelude::{Engine as _, BASE64_STANDARD};
use bytes::Bytes;
use serde_json::Value;
use thiserror::Error;

use crate::types::{PrimitiveKind, TypeDescriptor};
use crate::value::TypedValue;

/// A supplied value could not be coerced to its declared type.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("expected base64 text, found {found}")]
    ExpectedString { found: &'static str },

    #[error("expected an array, found {found}")]
    ExpectedArray { found: &'static str },

    #[error("invalid {record}: {source}")]
    InvalidRecord {
        record: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("expected {expected}: {source}")]
    Json {
        expected: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("expected {expected}, found {found}")]
    Mismatch {
        expected: &'static str,
        found: &'static str,
    },
}

/// Decode `raw` against `ty`.
///
/// Records are constructed, binary values are base64-decoded, sequences are
/// decoded element-wise whenever their element needs it, and everything else
/// is passed through as JSON. Unions with several non-null branches are passed
/// through untouched since no single branch can be chosen.
pub fn decode(raw: Value, ty: &TypeDescriptor) -> Result<TypedValue, DecodeError> {
    if raw.is_null() {
        return Ok(TypedValue::Null);
    }

    match ty.collapsed() {
        TypeDescriptor::Record(record) => record
            .construct(raw)
            .map(TypedValue::Record)
            .map_err(|source| DecodeError::InvalidRecord {
                record: record.name(),
                source,
            }),
        TypeDescriptor::Primitive(PrimitiveKind::Binary) => match raw {
            Value::String(text) => Ok(TypedValue::Bytes(Bytes::from(BASE64_STANDARD.decode(text)?))),
            other => Err(DecodeError::ExpectedString {
                found: json_kind(&other),
            }),
        },
        TypeDescriptor::Sequence(element) if needs_decoding(element) => match raw {
            Value::Array(items) => items
                .into_iter()
                .map(|item| decode(item, element))
                .collect::<Result<Vec<_>, _>>()
                .map(TypedValue::Sequence),
            other => Err(DecodeError::ExpectedArray {
                found: json_kind(&other),
            }),
        },
        _ => Ok(TypedValue::Json(raw)),
    }
}

/// Whether values of `ty` differ from their raw JSON form once decoded.
fn needs_decoding(ty: &TypeDescriptor) -> bool {
    match ty.collapsed() {
        TypeDescriptor::Record(_) | TypeDescriptor::Primitive(PrimitiveKind::Binary) => true,
        TypeDescriptor::Sequence(element) => needs_decoding(element),
        _ => false,
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
