//! Result encoding: any operation output into JSON text.

use base64::prelude::{Engine as _, BASE64_STANDARD};
use serde_json::{json, Value};

use crate::value::TypedValue;

/// Key wrapping base64-encoded binary results.
pub const BASE64_KEY: &str = "_base64";

/// Encode an operation's result as JSON text. Never fails.
pub fn encode(value: TypedValue) -> String {
    to_json(value).to_string()
}

/// Canonical JSON form of a typed value.
///
/// Records that cannot be serialized fall back to their debug representation.
pub fn to_json(value: TypedValue) -> Value {
    match value {
        TypedValue::Null => Value::Null,
        TypedValue::Bytes(bytes) => json!({ BASE64_KEY: BASE64_STANDARD.encode(&bytes) }),
        TypedValue::Record(record) => record.to_json().unwrap_or_else(|e| {
            tracing::debug!(record = record.record_name(), "Falling back to string form: {}", e);
            Value::String(format!("{:?}", record))
        }),
        TypedValue::Sequence(items) => Value::Array(items.into_iter().map(to_json).collect()),
        TypedValue::Json(value) => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode;
    use crate::record::RecordType;
    use crate::types::TypeDescriptor;
    use crate::value::{FromTypedValue, IntoTypedValue};
    use crate::Record;
    use bytes::Bytes;
    use pretty_assertions::assert_eq;
    use schemars::JsonSchema;
    use serde::{Deserialize, Serialize, Serializer};
    use std::collections::BTreeMap;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Record)]
    struct User {
        id: String,
        age: Option<u32>,
    }

    #[derive(Debug)]
    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("not representable"))
        }
    }

    fn user(id: &str) -> User {
        User {
            id: id.to_string(),
            age: Some(30),
        }
    }

    #[test]
    fn test_bytes_are_wrapped_exactly() {
        let text = encode(Bytes::from_static(b"\x00\x01").into_typed_value());
        assert_eq!(text, r#"{"_base64":"AAE="}"#);
    }

    #[test]
    fn test_null() {
        assert_eq!(encode(TypedValue::Null), "null");
        assert_eq!(encode(None::<String>.into_typed_value()), "null");
    }

    #[test]
    fn test_record_and_sequence() {
        let value: Value = serde_json::from_str(&encode(user("a").into_typed_value())).unwrap();
        assert_eq!(value, json!({"id": "a", "age": 30}));

        let sequence = TypedValue::Sequence(vec![
            user("a").into_typed_value(),
            TypedValue::Json(json!(7)),
        ]);
        let value: Value = serde_json::from_str(&encode(sequence)).unwrap();
        assert_eq!(value, json!([{"id": "a", "age": 30}, 7]));
    }

    #[test]
    fn test_unserializable_record_falls_back_to_string() {
        let value = to_json(TypedValue::Record(Box::new(Unserializable)));
        assert_eq!(value, json!("Unserializable"));
    }

    #[test]
    fn test_plain_json() {
        let mut map = BTreeMap::new();
        map.insert("k", 1);
        let value = TypedValue::Json(serde_json::to_value(map).unwrap());
        assert_eq!(encode(value), r#"{"k":1}"#);
    }

    #[test]
    fn test_round_trip_through_decode() {
        let record_type = TypeDescriptor::Record(RecordType::of::<User>());

        let bytes = Bytes::from_static(b"\xff\x00binary");
        let encoded: Value = serde_json::from_str(&encode(bytes.clone().into_typed_value())).unwrap();
        let decoded = decode(encoded[BASE64_KEY].clone(), &TypeDescriptor::binary()).unwrap();
        assert_eq!(Bytes::from_typed_value(decoded).unwrap(), bytes);

        let encoded: Value = serde_json::from_str(&encode(user("a").into_typed_value())).unwrap();
        let decoded = decode(encoded, &record_type).unwrap();
        assert_eq!(User::from_typed_value(decoded).unwrap(), user("a"));

        let users = vec![user("a"), user("b")];
        let encoded: Value = serde_json::from_str(&encode(users.clone().into_typed_value())).unwrap();
        let decoded = decode(encoded, &TypeDescriptor::sequence(record_type)).unwrap();
        assert_eq!(Vec::<User>::from_typed_value(decoded).unwrap(), users);

        let encoded: Value = serde_json::from_str(&encode(42i64.into_typed_value())).unwrap();
        let decoded = decode(encoded, &TypeDescriptor::integer()).unwrap();
        assert_eq!(i64::from_typed_value(decoded).unwrap(), 42);
    }
}
