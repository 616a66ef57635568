//! Structured records: named, schema-validated composite values.

use std::any::{type_name, Any};
use std::fmt;

use schemars::gen::SchemaSettings;
use schemars::schema::RootSchema;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

/// A constructed record value, type-erased.
pub trait Record: Any + Send + Sync + fmt::Debug {
    /// Fully qualified Rust type name of the record.
    fn record_name(&self) -> &'static str;

    /// Canonical field-by-field JSON representation.
    fn to_json(&self) -> Result<Value, serde_json::Error>;

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send>;
}

impl<T> Record for T
where
    T: Serialize + fmt::Debug + Send + Sync + 'static,
{
    fn record_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn to_json(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
        self
    }
}

/// Schema derivation and validating constructor of one record type.
#[derive(Clone, Copy)]
pub struct RecordType {
    name: &'static str,
    root_schema: fn() -> RootSchema,
    construct: fn(Value) -> Result<Box<dyn Record>, serde_json::Error>,
}

impl RecordType {
    pub fn of<T>() -> Self
    where
        T: JsonSchema + DeserializeOwned + Record,
    {
        Self {
            name: type_name::<T>(),
            root_schema: root_schema_for::<T>,
            construct: construct::<T>,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Validate `raw` against the record and build it.
    pub fn construct(&self, raw: Value) -> Result<Box<dyn Record>, serde_json::Error> {
        (self.construct)(raw)
    }

    /// The record's inline schema plus its nested definitions.
    ///
    /// Nested records are referenced as `#/$defs/<Name>` and only appear in the
    /// second map.
    pub fn schema(&self) -> (Map<String, Value>, Map<String, Value>) {
        let root = (self.root_schema)();

        let mut schema = match serde_json::to_value(&root.schema) {
            Ok(Value::Object(schema)) => schema,
            Ok(other) => {
                tracing::warn!(record = self.name, "Record schema is not an object: {}", other);
                string_schema()
            }
            Err(e) => {
                tracing::warn!(record = self.name, "Failed to serialize record schema: {}", e);
                string_schema()
            }
        };
        schema.remove("$schema");

        let mut defs = Map::new();
        for key in ["$defs", "definitions"] {
            if let Some(Value::Object(inline)) = schema.remove(key) {
                defs.extend(inline);
            }
        }
        for (name, definition) in root.definitions {
            match serde_json::to_value(&definition) {
                Ok(value) => {
                    defs.insert(name, value);
                }
                Err(e) => {
                    tracing::warn!(record = self.name, definition = %name, "Dropping definition: {}", e)
                }
            }
        }

        (schema, defs)
    }
}

impl fmt::Debug for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RecordType").field(&self.name).finish()
    }
}

impl PartialEq for RecordType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

fn root_schema_for<T: JsonSchema>() -> RootSchema {
    SchemaSettings::draft2019_09()
        .into_generator()
        .into_root_schema_for::<T>()
}

fn construct<T>(raw: Value) -> Result<Box<dyn Record>, serde_json::Error>
where
    T: DeserializeOwned + Record,
{
    let record: T = serde_json::from_value(raw)?;
    Ok(Box::new(record))
}

fn string_schema() -> Map<String, Value> {
    let mut schema = Map::new();
    schema.insert("type".to_string(), Value::from("string"));
    schema
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize, JsonSchema)]
    struct Tag {
        label: String,
    }

    #[derive(Debug, Serialize, Deserialize, JsonSchema)]
    struct Note {
        text: String,
        tag: Tag,
    }

    #[test]
    fn test_nested_definitions_are_lifted() {
        let (schema, defs) = RecordType::of::<Note>().schema();

        assert_eq!(schema["properties"]["tag"], json!({"$ref": "#/$defs/Tag"}));
        assert!(!schema.contains_key("$defs"));
        assert!(!schema.contains_key("definitions"));
        assert!(!schema.contains_key("$schema"));
        assert_eq!(defs["Tag"]["properties"]["label"], json!({"type": "string"}));
    }

    #[test]
    fn test_construct_validates() {
        let ty = RecordType::of::<Tag>();
        let record = ty.construct(json!({"label": "x"})).unwrap();
        assert_eq!(record.to_json().unwrap(), json!({"label": "x"}));
        assert!(ty.construct(json!({"label": 1})).is_err());
    }

    #[test]
    fn test_record_types_compare_by_name() {
        assert_eq!(RecordType::of::<Tag>(), RecordType::of::<Tag>());
        assert_ne!(RecordType::of::<Tag>(), RecordType::of::<Note>());
    }
}
