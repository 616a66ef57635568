//! The tool registry and invocation dispatch.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use indexmap::IndexMap;
use tracing::{debug, error};

use crate::decode::decode;
use crate::encode::encode;
use crate::resource::Operation;
use crate::schema::JsonObject;
use crate::tools::{ErrorPayload, ToolError};
use crate::types::TypeDescriptor;
use crate::value::{Arguments, TypedValue};

/// Invocation metadata of one tool.
#[derive(Clone)]
pub struct RegisteredTool {
    pub operation: Arc<dyn Operation>,
    /// Declared parameters in declaration order.
    pub parameters: IndexMap<String, TypeDescriptor>,
}

/// Immutable lookup from tool name to invocation metadata.
///
/// Built once by [`discover`](crate::discovery::discover) and shared read-only
/// by every in-flight call.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: IndexMap<String, RegisteredTool>,
}

impl ToolRegistry {
    pub(crate) fn new(tools: IndexMap<String, RegisteredTool>) -> Self {
        Self { tools }
    }

    pub fn get(&self, name: &str) -> Option<&RegisteredTool> {
        self.tools.get(name)
    }

    /// Tool names in discovery order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Invoke `name` with a raw argument bag, returning the JSON text payload.
    ///
    /// Failures of any kind come back as an error payload rather than an `Err`.
    pub async fn invoke(&self, name: &str, args: Option<JsonObject>) -> String {
        match self.dispatch(name, args).await {
            Ok(value) => encode(value),
            Err(err) => {
                if !matches!(err, ToolError::UnknownTool(_)) {
                    error!("Tool {} failed: {}", name, err);
                }
                ErrorPayload::from(&err).to_text()
            }
        }
    }

    /// Resolve, decode, and call, without encoding the outcome.
    pub async fn dispatch(&self, name: &str, args: Option<JsonObject>) -> Result<TypedValue, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;

        let mut raw = args.unwrap_or_default();
        let mut arguments = Arguments::new();
        for (parameter, ty) in &tool.parameters {
            if let Some(value) = raw.remove(parameter) {
                let decoded = decode(value, ty).map_err(|source| ToolError::Decode {
                    parameter: parameter.clone(),
                    source,
                })?;
                arguments.insert(parameter.clone(), decoded);
            }
        }
        if !raw.is_empty() {
            debug!(
                "Ignoring undeclared arguments for {}: {:?}",
                name,
                raw.keys().collect::<Vec<_>>()
            );
        }

        let call = AssertUnwindSafe(tool.operation.call(arguments)).catch_unwind();
        match call.await {
            Ok(result) => Ok(result?),
            Err(panic) => Err(ToolError::Panic(panic_message(panic))),
        }
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "operation panicked".to_string()
    }
}
