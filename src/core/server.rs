//! MCP Server implementation and lifecycle management.
//!
//! [`McpServer`] owns the configuration and the tool registry. The HTTP
//! transport dispatches JSON-RPC messages against it directly, while the
//! STDIO transport goes through rmcp's `ServerHandler` implementation below.

use rmcp::{
    ServerHandler, handler::server::tool::ToolRouter, model::*, tool_handler,
};
use std::sync::Arc;

use super::config::Config;
use super::error;
use crate::domains::tools::{ToolError, ToolRegistry, build_tool_router};

/// Instructions returned to clients during initialization.
pub const SERVER_INSTRUCTIONS: &str =
    "A calculator server. Use `add` to sum two numbers or `calculate` for add, subtract, multiply and divide.";

/// The main MCP server handler.
#[derive(Clone)]
pub struct McpServer {
    /// Server configuration.
    config: Arc<Config>,

    /// Registered tools.
    registry: Arc<ToolRegistry>,

    /// Tool router for handling tool calls over rmcp transports.
    tool_router: ToolRouter<Self>,
}

impl McpServer {
    /// Create a new MCP server with the built-in tools.
    ///
    /// Fails if tool registration is inconsistent (e.g. duplicate names).
    pub fn new(config: Config) -> error::Result<Self> {
        let registry = ToolRegistry::with_builtin_tools()?;
        Ok(Self::with_registry(config, registry))
    }

    /// Create a server around an already populated registry.
    pub fn with_registry(config: Config, registry: ToolRegistry) -> Self {
        let registry = Arc::new(registry);
        Self {
            tool_router: build_tool_router::<Self>(registry.clone()),
            config: Arc::new(config),
            registry,
        }
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    /// Names of all registered tools, in registration order.
    pub fn tool_names(&self) -> Vec<&str> {
        self.registry.tool_names()
    }

    /// List all available tools as JSON (for HTTP transport).
    pub fn list_tools(&self) -> Vec<serde_json::Value> {
        self.registry
            .tools()
            .into_iter()
            .map(|t| {
                serde_json::json!({
                    "name": t.name,
                    "description": t.description,
                    "inputSchema": t.input_schema
                })
            })
            .collect()
    }

    /// Call a tool by name (for HTTP transport).
    pub fn call_tool(
        &self,
        name: &str,
        arguments: JsonObject,
    ) -> Result<CallToolResult, ToolError> {
        self.registry.invoke(name, arguments)
    }
}

/// ServerHandler implementation with tool_handler macro for automatic tool routing.
#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(SERVER_INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: self.name().to_string(),
                version: self.version().to_string(),
                ..Implementation::from_build_env()
            },
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::definitions::common::result_text;

    #[test]
    fn test_server_exposes_builtin_tools() {
        let server = McpServer::new(Config::default()).unwrap();
        assert_eq!(server.tool_names(), vec!["add", "calculate"]);

        let tools = server.list_tools();
        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0]["name"], "add");
        assert!(tools[1]["inputSchema"]["properties"]["operation"].is_object());
    }

    #[test]
    fn test_call_tool_via_server() {
        let server = McpServer::new(Config::default()).unwrap();
        let mut args = JsonObject::new();
        args.insert("operation".into(), "multiply".into());
        args.insert("a".into(), 6.into());
        args.insert("b".into(), 7.into());

        let result = server.call_tool("calculate", args).unwrap();
        assert_eq!(result_text(&result), "6 \u{00d7} 7 = 42");
    }

    #[test]
    fn test_get_info_reports_identity() {
        let server = McpServer::new(Config::default()).unwrap();
        let info = server.get_info();
        assert_eq!(info.server_info.name, "Authless Calculator");
        assert!(info.capabilities.tools.is_some());
    }
}
