//! JSON schema construction for [`TypeDescriptor`]s.

use serde_json::{json, Map, Value};

use crate::types::{PrimitiveKind, TypeDescriptor};

/// A JSON object, as used for schemas and `$defs`.
pub type JsonObject = Map<String, Value>;

/// Build the schema describing values of `ty`, plus the named sub-schemas it
/// references.
///
/// Never fails: anything unrecognized is described as a string.
pub fn build_schema(ty: &TypeDescriptor) -> (JsonObject, JsonObject) {
    let mut defs = JsonObject::new();
    let schema = build_into(ty, &mut defs);
    (schema, defs)
}

fn build_into(ty: &TypeDescriptor, defs: &mut JsonObject) -> JsonObject {
    match ty {
        TypeDescriptor::Null => object(json!({"type": "null"})),
        TypeDescriptor::Optional(_) | TypeDescriptor::Union(_) => {
            match ty.non_null_alternatives().as_slice() {
                [] => object(json!({"type": "null"})),
                [only] => build_into(only, defs),
                alternatives => {
                    let any_of: Vec<Value> = alternatives
                        .iter()
                        .map(|alternative| Value::Object(build_into(alternative, defs)))
                        .collect();
                    object(json!({ "anyOf": any_of }))
                }
            }
        }
        TypeDescriptor::Sequence(element) => match element.as_ref() {
            TypeDescriptor::Unknown => object(json!({"type": "array"})),
            element => object(json!({
                "type": "array",
                "items": Value::Object(build_into(element, defs)),
            })),
        },
        TypeDescriptor::Mapping => object(json!({"type": "object"})),
        TypeDescriptor::Record(record) => {
            let (schema, nested) = record.schema();
            defs.extend(nested);
            schema
        }
        TypeDescriptor::Primitive(kind) => primitive_schema(*kind),
        TypeDescriptor::Unknown => primitive_schema(PrimitiveKind::String),
    }
}

/// The fixed schema of a primitive kind.
pub fn primitive_schema(kind: PrimitiveKind) -> JsonObject {
    object(match kind {
        PrimitiveKind::String => json!({"type": "string"}),
        PrimitiveKind::Integer => json!({"type": "integer"}),
        PrimitiveKind::Number => json!({"type": "number"}),
        PrimitiveKind::Boolean => json!({"type": "boolean"}),
        PrimitiveKind::Binary => json!({
            "type": "string",
            "description": "Base64-encoded binary data",
        }),
    })
}

fn object(value: Value) -> JsonObject {
    match value {
        Value::Object(map) => map,
        _ => JsonObject::new(),
    }
}
