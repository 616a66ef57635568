use bytes::Bytes;
use owui_mcp::{discover, resource, InvocationError, Record, Resources, TypeDescriptor};
use pretty_assertions::assert_eq;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Record)]
struct Note {
    title: String,
    #[serde(default)]
    tags: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
#[error("note {0} not found")]
struct NotFound(i64);

impl From<NotFound> for InvocationError {
    fn from(err: NotFound) -> Self {
        InvocationError::failed("NotFound", err.to_string())
    }
}

struct Notebook;

#[resource]
impl Notebook {
    /// Add a note.
    ///
    /// Returns the stored note.
    pub async fn add(&self, note: Note) -> Note {
        note
    }

    /// List notes.
    pub async fn list(&self, #[default(10)] limit: i64, tag: Option<String>) -> Vec<Value> {
        vec![json!({"limit": limit, "tag": tag})]
    }

    pub async fn get(&self, id: i64) -> Result<Note, NotFound> {
        Err(NotFound(id))
    }

    /// Raw attachment bytes.
    pub async fn attachment(&self) -> Bytes {
        Bytes::from_static(b"hi")
    }

    /// Not exposed.
    pub async fn _reindex(&self) -> i64 {
        0
    }

    pub fn page_size(&self) -> i64 {
        10
    }
}

fn notebook() -> Resources {
    Resources::new().resource("notes", Notebook)
}

fn args(value: Value) -> Option<serde_json::Map<String, Value>> {
    value.as_object().cloned()
}

fn parse(text: &str) -> Value {
    serde_json::from_str(text).unwrap()
}

#[test]
fn test_public_async_methods_become_tools() {
    let (descriptors, registry) = discover(&notebook());

    let names: Vec<&str> = descriptors.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["notes__add", "notes__attachment", "notes__get", "notes__list"]);
    assert_eq!(registry.len(), 4);
    assert_eq!(Notebook.page_size(), 10);
}

#[test]
fn test_doc_comments_become_descriptions() {
    let (descriptors, _) = discover(&notebook());

    assert_eq!(descriptors[0].description, "Add a note.\n\nReturns the stored note.");
    assert_eq!(descriptors[2].description, "notes.get");
}

#[test]
fn test_parameter_schemas() {
    let (descriptors, _) = discover(&notebook());

    let list = &descriptors[3];
    assert_eq!(
        Value::Object(list.input_schema.clone()),
        json!({
            "type": "object",
            "properties": {
                "limit": {"type": "integer"},
                "tag": {"type": "string"},
            },
        })
    );
    let flags: Vec<(&str, bool, bool)> = list
        .parameters
        .iter()
        .map(|p| (p.name.as_str(), p.has_default, p.required))
        .collect();
    assert_eq!(flags, vec![("limit", true, false), ("tag", false, false)]);

    let add = &descriptors[0];
    assert_eq!(add.input_schema["required"], json!(["note"]));
    assert_eq!(add.input_schema["properties"]["note"]["type"], json!("object"));
    assert_eq!(add.input_schema["properties"]["note"]["required"], json!(["title"]));
    assert!(matches!(add.returns, TypeDescriptor::Record(_)));

    let attachment = &descriptors[1];
    assert_eq!(attachment.returns, TypeDescriptor::binary());
}

#[tokio::test]
async fn test_invoke_generated_operations() {
    let (_, registry) = discover(&notebook());

    let added = registry
        .invoke("notes__add", args(json!({"note": {"title": "groceries"}})))
        .await;
    assert_eq!(parse(&added), json!({"title": "groceries", "tags": []}));

    let listed = registry.invoke("notes__list", args(json!({}))).await;
    assert_eq!(parse(&listed), json!([{"limit": 10, "tag": null}]));

    let listed = registry
        .invoke("notes__list", args(json!({"limit": 2, "tag": "home"})))
        .await;
    assert_eq!(parse(&listed), json!([{"limit": 2, "tag": "home"}]));

    let attachment = registry.invoke("notes__attachment", None).await;
    assert_eq!(parse(&attachment), json!({"_base64": "aGk="}));
}

#[tokio::test]
async fn test_generated_operation_errors() {
    let (_, registry) = discover(&notebook());

    let missing = registry.invoke("notes__get", args(json!({}))).await;
    assert_eq!(parse(&missing), json!({"error": "MissingArgument: missing required argument `id`"}));

    let failed = registry.invoke("notes__get", args(json!({"id": 3}))).await;
    assert_eq!(parse(&failed), json!({"error": "NotFound: note 3 not found"}));

    let invalid = registry
        .invoke("notes__add", args(json!({"note": {"tags": []}})))
        .await;
    let message = parse(&invalid)["error"].as_str().unwrap().to_string();
    assert!(message.starts_with("DecodeError: argument `note`"), "{}", message);
}
