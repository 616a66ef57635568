//! MCP transport glue: serves the discovered tools through `rmcp`.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, Implementation, ListToolsResult,
    PaginatedRequestParam, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData, RoleServer, ServerHandler};

use crate::discovery::{discover, OperationDescriptor};
use crate::registry::ToolRegistry;
use crate::resource::ResourceGraph;
use crate::schema::JsonObject;
use crate::tools::ToolService;

pub const SERVER_NAME: &str = "owui-mcp";

/// An MCP server exposing a fixed set of discovered tools.
#[derive(Clone)]
pub struct ToolServer {
    tools: Arc<[Tool]>,
    registry: Arc<ToolRegistry>,
}

impl ToolServer {
    pub fn new(descriptors: &[OperationDescriptor], registry: ToolRegistry) -> Self {
        Self {
            tools: descriptors.iter().map(OperationDescriptor::to_tool).collect(),
            registry: Arc::new(registry),
        }
    }

    /// Discover every operation of `graph` and serve it.
    pub fn discover(graph: &dyn ResourceGraph) -> Self {
        let (descriptors, registry) = discover(graph);
        Self::new(&descriptors, registry)
    }

    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }
}

#[async_trait]
impl ToolService for ToolServer {
    async fn list_tools(&self) -> Vec<Tool> {
        self.tools.to_vec()
    }

    async fn call_tool(&self, name: &str, args: Option<JsonObject>) -> String {
        self.registry.invoke(name, args).await
    }
}

impl ServerHandler for ToolServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: SERVER_NAME.into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ListToolsResult, ErrorData>> + Send + '_ {
        async move {
            let tools = ToolService::list_tools(self).await;
            Ok(ListToolsResult::with_all_items(tools))
        }
    }

    fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<CallToolResult, ErrorData>> + Send + '_ {
        async move {
            let text = ToolService::call_tool(self, &request.name, request.arguments).await;
            Ok(CallToolResult::success(vec![Content::text(text)]))
        }
    }
}
