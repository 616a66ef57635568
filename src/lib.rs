//! # owui-mcp - Open WebUI as Model Context Protocol tools
//!
//! Exposes the operations of an API client as MCP tools: every public
//! operation of every resource becomes one tool, with a JSON Schema derived
//! from its parameter types.
//!
//! ## Architecture
//!
//! 1. **Type-Schema Builder** (`schema`): maps a [`TypeDescriptor`] to JSON Schema.
//! 2. **Operation Discoverer** (`discovery`): walks a [`ResourceGraph`] and
//!    builds the tool list and the [`ToolRegistry`].
//! 3. **Argument Decoder** (`decode`): turns raw JSON arguments into [`TypedValue`]s.
//! 4. **Result Encoder** (`encode`): renders results as JSON text, binary
//!    payloads as `{"_base64": ...}`.
//! 5. **Invocation Dispatcher** (`registry`): resolves, decodes, calls and
//!    encodes, reporting every failure as a structured payload.
//!
//! [`ToolServer`] serves the result over `rmcp`.
//!
//! ## Example
//! ```no_run
//! use owui_mcp::client::OpenWebUi;
//! use owui_mcp::options::ClientOptions;
//! use owui_mcp::ToolServer;
//! use rmcp::ServiceExt;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = OpenWebUi::new(ClientOptions::from_env())?;
//!     let server = ToolServer::discover(&client);
//!
//!     let service = server.serve(rmcp::transport::stdio()).await?;
//!     service.waiting().await?;
//!     Ok(())
//! }
//! ```

extern crate self as owui_mcp;

pub mod api;
pub mod client;
pub mod decode;
pub mod discovery;
pub mod encode;
pub mod http;
pub mod mcp;
pub mod options;
pub mod record;
pub mod registry;
pub mod resource;
pub mod schema;
pub mod tools;
pub mod types;
pub mod value;

pub use client::{ClientError, OpenWebUi};
pub use decode::{decode, DecodeError};
pub use discovery::{discover, OperationDescriptor, ParameterDescriptor};
pub use encode::encode;
pub use mcp::ToolServer;
pub use record::{Record, RecordType};
pub use registry::ToolRegistry;
pub use resource::{
    DiscoveryError, FnOperation, Operation, OperationSet, Parameter, Resource, ResourceGraph, Resources,
};
pub use schema::{build_schema, JsonObject};
pub use tools::{ErrorPayload, Tool, ToolError, ToolService};
pub use types::{Describe, PrimitiveKind, TypeDescriptor};
pub use value::{Arguments, FromTypedValue, IntoTypedValue, InvocationError, TypedValue};

// Re-export rmcp for convenience
pub use rmcp;

// Re-export the proc macros
pub use owui_mcp_macros::{resource, Record};

#[doc(hidden)]
pub mod __private {
    pub use async_trait::async_trait;
}
