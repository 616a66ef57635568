//! Operation discovery over a resource graph.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use itertools::Itertools;
use rmcp::model::Tool;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::registry::{RegisteredTool, ToolRegistry};
use crate::resource::{DiscoveryError, Operation, ResourceGraph};
use crate::schema::{build_schema, JsonObject};
use crate::types::TypeDescriptor;

/// Schema-level description of one parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDescriptor {
    pub name: String,
    pub ty: TypeDescriptor,
    pub has_default: bool,
    /// No default and not optional.
    pub required: bool,
}

/// A discovered operation, ready to be listed as a tool.
#[derive(Clone)]
pub struct OperationDescriptor {
    /// `<resource>__<method>`
    pub name: String,
    pub description: String,
    pub parameters: Vec<ParameterDescriptor>,
    pub input_schema: JsonObject,
    pub returns: TypeDescriptor,
    pub operation: Arc<dyn Operation>,
}

impl OperationDescriptor {
    pub fn to_tool(&self) -> Tool {
        Tool::new(
            self.name.clone(),
            self.description.clone(),
            Arc::new(self.input_schema.clone()),
        )
    }
}

impl fmt::Debug for OperationDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationDescriptor")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("parameters", &self.parameters)
            .field("input_schema", &self.input_schema)
            .field("returns", &self.returns)
            .finish_non_exhaustive()
    }
}

/// Walk `graph` and describe every public operation of every public resource.
///
/// Resources and their operations are visited in lexicographic order. An
/// operation whose introspection fails is logged and left out; the rest of the
/// graph is unaffected.
pub fn discover(graph: &dyn ResourceGraph) -> (Vec<OperationDescriptor>, ToolRegistry) {
    let mut descriptors = Vec::new();
    let mut tools = IndexMap::new();

    let resources = graph
        .resources()
        .into_iter()
        .filter(|(name, _)| is_public(name))
        .sorted_by(|(a, _), (b, _)| a.cmp(b));

    for (resource_name, resource) in resources {
        let operations = resource
            .operations()
            .into_iter()
            .filter(|operation| is_public(operation.name()))
            .sorted_by(|a, b| a.name().cmp(b.name()));

        for operation in operations {
            let tool_name = format!("{}__{}", resource_name, operation.name());

            if tools.contains_key(&tool_name) {
                warn!("Skipping tool {}: name already registered", tool_name);
                continue;
            }

            match describe(&resource_name, &tool_name, operation) {
                Ok(descriptor) => {
                    debug!("Registered tool {}", tool_name);
                    tools.insert(
                        tool_name,
                        RegisteredTool {
                            operation: Arc::clone(&descriptor.operation),
                            parameters: descriptor
                                .parameters
                                .iter()
                                .map(|p| (p.name.clone(), p.ty.clone()))
                                .collect(),
                        },
                    );
                    descriptors.push(descriptor);
                }
                Err(e) => warn!("Skipping tool {}: introspection failed: {}", tool_name, e),
            }
        }
    }

    info!("Discovered {} tools", descriptors.len());
    (descriptors, ToolRegistry::new(tools))
}

fn describe(
    resource_name: &str,
    tool_name: &str,
    operation: Arc<dyn Operation>,
) -> Result<OperationDescriptor, DiscoveryError> {
    let description = operation
        .doc()
        .filter(|doc| !doc.trim().is_empty())
        .unwrap_or_else(|| format!("{}.{}", resource_name, operation.name()));

    let mut properties = JsonObject::new();
    let mut required = Vec::new();
    let mut defs = JsonObject::new();
    let mut parameters = Vec::new();

    for parameter in operation.parameters()? {
        let ty = parameter.ty.unwrap_or_else(TypeDescriptor::string);
        let (schema, parameter_defs) = build_schema(&ty);
        defs.extend(parameter_defs);
        properties.insert(parameter.name.clone(), Value::Object(schema));

        let is_required = !parameter.has_default && !ty.is_optional();
        if is_required {
            required.push(Value::from(parameter.name.clone()));
        }

        parameters.push(ParameterDescriptor {
            name: parameter.name,
            ty,
            has_default: parameter.has_default,
            required: is_required,
        });
    }

    let mut input_schema = JsonObject::new();
    input_schema.insert("type".to_string(), Value::from("object"));
    input_schema.insert("properties".to_string(), Value::Object(properties));
    if !required.is_empty() {
        input_schema.insert("required".to_string(), Value::Array(required));
    }
    if !defs.is_empty() {
        input_schema.insert("$defs".to_string(), Value::Object(defs));
    }

    Ok(OperationDescriptor {
        name: tool_name.to_string(),
        description,
        parameters,
        input_schema,
        returns: operation.returns(),
        operation,
    })
}

fn is_public(name: &str) -> bool {
    !name.starts_with('_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordType;
    use crate::resource::{FnOperation, OperationSet, Parameter, Resource, Resources};
    use crate::value::{Arguments, InvocationError, TypedValue};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use schemars::JsonSchema;
    use serde::{Deserialize, Serialize};
    use serde_json::json;
    use tracing_test::traced_test;

    #[derive(Debug, Serialize, Deserialize, JsonSchema)]
    struct Meta {
        tags: Vec<String>,
    }

    #[derive(Debug, Serialize, Deserialize, JsonSchema)]
    struct Form {
        title: String,
        meta: Meta,
    }

    async fn noop(_args: Arguments) -> Result<TypedValue, InvocationError> {
        Ok(TypedValue::Null)
    }

    struct Broken;

    #[async_trait]
    impl Operation for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn parameters(&self) -> Result<Vec<Parameter>, DiscoveryError> {
            Err(DiscoveryError::UnresolvedAnnotation {
                parameter: "x".to_string(),
                annotation: "Missing".to_string(),
            })
        }

        async fn call(&self, _args: Arguments) -> Result<TypedValue, InvocationError> {
            Ok(TypedValue::Null)
        }
    }

    fn graph() -> Resources {
        let chats = OperationSet::new()
            .operation(
                FnOperation::new("list", noop)
                    .with_doc("List chats.")
                    .with_parameter(Parameter::new("limit", TypeDescriptor::integer()))
                    .with_parameter(
                        Parameter::new("tag", TypeDescriptor::optional(TypeDescriptor::string()))
                            .with_default(),
                    )
                    .with_parameter(Parameter::new("page", TypeDescriptor::integer()).with_default()),
            )
            .operation(
                FnOperation::new("create", noop)
                    .with_parameter(Parameter::new("form", TypeDescriptor::Record(RecordType::of::<Form>())))
                    .with_parameter(Parameter::untyped("note")),
            )
            .operation(FnOperation::new("_hidden", noop));

        let files = OperationSet::new()
            .operation(FnOperation::new("upload", noop).with_parameter(Parameter::new("file", TypeDescriptor::binary())))
            .operation(FnOperation::new("content", noop));

        Resources::new()
            .resource("files", files)
            .resource("chats", chats)
            .resource("_internal", OperationSet::new().operation(FnOperation::new("secret", noop)))
    }

    fn names(descriptors: &[OperationDescriptor]) -> Vec<String> {
        descriptors.iter().map(|d| d.name.clone()).collect()
    }

    #[test]
    fn test_discovery_is_sorted_and_deterministic() {
        let (first, registry) = discover(&graph());
        let (second, _) = discover(&graph());

        assert_eq!(
            names(&first),
            vec!["chats__create", "chats__list", "files__content", "files__upload"]
        );
        assert_eq!(names(&first), names(&second));
        assert_eq!(registry.names().collect::<Vec<_>>(), names(&first));
    }

    #[test]
    fn test_required_follows_defaults_and_optionality() {
        let (descriptors, _) = discover(&graph());
        let list = &descriptors[1];

        assert_eq!(list.description, "List chats.");
        assert_eq!(
            Value::Object(list.input_schema.clone()),
            json!({
                "type": "object",
                "properties": {
                    "limit": {"type": "integer"},
                    "tag": {"type": "string"},
                    "page": {"type": "integer"},
                },
                "required": ["limit"],
            })
        );
        let required: Vec<bool> = list.parameters.iter().map(|p| p.required).collect();
        assert_eq!(required, vec![true, false, false]);
    }

    #[test]
    fn test_defs_are_hoisted_and_untyped_falls_back_to_string() {
        let (descriptors, _) = discover(&graph());
        let create = &descriptors[0];

        assert_eq!(create.description, "chats.create");
        let schema = &create.input_schema;
        assert_eq!(schema["properties"]["form"]["properties"]["meta"], json!({"$ref": "#/$defs/Meta"}));
        assert_eq!(schema["properties"]["note"], json!({"type": "string"}));
        assert_eq!(schema["required"], json!(["form", "note"]));
        assert!(schema["$defs"].get("Meta").is_some());
    }

    #[test]
    fn test_no_required_or_defs_keys_when_unneeded() {
        let (descriptors, _) = discover(&graph());
        let content = &descriptors[2];
        assert_eq!(
            Value::Object(content.input_schema.clone()),
            json!({"type": "object", "properties": {}})
        );
    }

    #[test]
    fn test_tool_conversion() {
        let (descriptors, _) = discover(&graph());
        let tool = descriptors[3].to_tool();
        assert_eq!(tool.name, "files__upload");
        assert_eq!(tool.description.as_deref(), Some("files.upload"));
        assert_eq!(
            tool.input_schema["properties"]["file"]["description"],
            json!("Base64-encoded binary data")
        );
    }

    #[test]
    #[traced_test]
    fn test_one_broken_operation_is_skipped() {
        let set = OperationSet::new()
            .operation(FnOperation::new("a", noop))
            .operation(Broken)
            .operation(FnOperation::new("c", noop));
        let graph = Resources::new().resource("things", set);

        let (descriptors, registry) = discover(&graph);

        assert_eq!(names(&descriptors), vec!["things__a", "things__c"]);
        assert!(registry.get("things__broken").is_none());
        logs_assert(|lines: &[&str]| {
            match lines.iter().filter(|line| line.contains("Skipping tool")).count() {
                1 => Ok(()),
                n => Err(format!("expected one skip, found {}", n)),
            }
        });
    }

    #[test]
    fn test_duplicate_names_keep_first() {
        struct Twice;

        impl Resource for Twice {
            fn operations(self: Arc<Self>) -> Vec<Arc<dyn Operation>> {
                vec![
                    Arc::new(FnOperation::new("op", noop).with_doc("first")),
                    Arc::new(FnOperation::new("op", noop).with_doc("second")),
                ]
            }
        }

        let (descriptors, _) = discover(&Resources::new().resource("r", Twice));
        assert_eq!(descriptors.len(), 1);
        assert_eq!(descriptors[0].description, "first");
    }
}
