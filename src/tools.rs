//! Tool-level service contract and error reporting.

use async_trait::async_trait;
pub use rmcp::model::Tool;
use serde_json::json;

use crate::decode::DecodeError;
use crate::schema::JsonObject;
use crate::value::InvocationError;

/// Error type for a single tool call.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("argument `{parameter}`: {source}")]
    Decode {
        parameter: String,
        #[source]
        source: DecodeError,
    },

    #[error(transparent)]
    Invocation(#[from] InvocationError),

    #[error("{0}")]
    Panic(String),
}

impl ToolError {
    /// Taxonomy name reported to callers.
    pub fn kind(&self) -> &str {
        match self {
            Self::UnknownTool(_) => "UnknownToolError",
            Self::Decode { .. } => "DecodeError",
            Self::Invocation(e) => e.kind(),
            Self::Panic(_) => "Panic",
        }
    }
}

/// Structured failure returned in place of a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorPayload {
    /// `None` when the message already names the failure.
    pub kind: Option<String>,
    pub message: String,
}

impl ErrorPayload {
    pub fn to_text(&self) -> String {
        let error = match &self.kind {
            Some(kind) => format!("{}: {}", kind, self.message),
            None => self.message.clone(),
        };
        json!({ "error": error }).to_string()
    }
}

impl From<&ToolError> for ErrorPayload {
    fn from(err: &ToolError) -> Self {
        match err {
            ToolError::UnknownTool(_) => Self {
                kind: None,
                message: err.to_string(),
            },
            other => Self {
                kind: Some(other.kind().to_string()),
                message: other.to_string(),
            },
        }
    }
}

/// What a transport needs from the tool layer.
#[async_trait]
pub trait ToolService: Send + Sync {
    /// List available tools.
    async fn list_tools(&self) -> Vec<Tool>;

    /// Execute a tool, returning its JSON text payload.
    async fn call_tool(&self, name: &str, args: Option<JsonObject>) -> String;
}
