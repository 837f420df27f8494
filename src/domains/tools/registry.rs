//! Tool Registry - central registration and dispatch for all tools.
//!
//! This module provides:
//! - Registration of named tools with a typed argument schema
//! - Argument validation and dispatch for tool calls
//! - Tool metadata for capability discovery

use rmcp::model::{CallToolResult, JsonObject, Tool};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use tracing::{info, instrument, warn};

use super::ToolError;
use super::definitions::{AddTool, CalculateTool};

type ToolHandlerFn = dyn Fn(JsonObject) -> Result<CallToolResult, ToolError> + Send + Sync;

/// A registered tool: its metadata plus the handler that executes it.
pub struct ToolDefinition {
    tool: Tool,
    handler: Box<ToolHandlerFn>,
}

impl ToolDefinition {
    /// Tool name as exposed to clients.
    pub fn name(&self) -> &str {
        &self.tool.name
    }

    /// Tool metadata (name, description, input schema).
    pub fn tool(&self) -> &Tool {
        &self.tool
    }
}

impl std::fmt::Debug for ToolDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolDefinition")
            .field("name", &self.tool.name)
            .finish_non_exhaustive()
    }
}

/// Tool registry - manages all available tools.
///
/// Tools keep their registration order, which is the order reported by
/// `tools/list` and the health document.
#[derive(Debug, Default)]
pub struct ToolRegistry {
    definitions: Vec<ToolDefinition>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in `add` and `calculate` tools.
    pub fn with_builtin_tools() -> Result<Self, ToolError> {
        let mut registry = Self::new();
        AddTool::register(&mut registry)?;
        CalculateTool::register(&mut registry)?;
        Ok(registry)
    }

    /// Register a tool whose arguments deserialize into `P`.
    ///
    /// Fails if a tool with the same name is already registered.
    pub fn register<P, F>(&mut self, tool: Tool, handler: F) -> Result<(), ToolError>
    where
        P: DeserializeOwned + JsonSchema + 'static,
        F: Fn(P) -> CallToolResult + Send + Sync + 'static,
    {
        if self.get(&tool.name).is_some() {
            return Err(ToolError::already_registered(tool.name.as_ref()));
        }

        let handler = move |arguments: JsonObject| {
            let params: P = serde_json::from_value(serde_json::Value::Object(arguments))
                .map_err(|e| ToolError::invalid_arguments(e.to_string()))?;
            Ok(handler(params))
        };

        self.definitions.push(ToolDefinition {
            tool,
            handler: Box::new(handler),
        });
        Ok(())
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.definitions.iter().find(|d| d.name() == name)
    }

    /// All registered tool definitions, in registration order.
    pub fn definitions(&self) -> &[ToolDefinition] {
        &self.definitions
    }

    /// Get all tool names.
    pub fn tool_names(&self) -> Vec<&str> {
        self.definitions.iter().map(ToolDefinition::name).collect()
    }

    /// Get all tools as Tool models (metadata).
    pub fn tools(&self) -> Vec<Tool> {
        self.definitions.iter().map(|d| d.tool.clone()).collect()
    }

    /// Validate `arguments` and run the named tool.
    #[instrument(skip(self, arguments))]
    pub fn invoke(&self, name: &str, arguments: JsonObject) -> Result<CallToolResult, ToolError> {
        let Some(definition) = self.get(name) else {
            warn!("Unknown tool requested: {}", name);
            return Err(ToolError::not_found(name));
        };

        info!("Invoking tool");
        (definition.handler)(arguments).inspect_err(|e| warn!("Tool call rejected: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::definitions::common::result_text;
    use crate::domains::tools::definitions::{AddParams, AddTool};
    use tokio_test::{assert_err, assert_ok};

    fn arguments(value: serde_json::Value) -> JsonObject {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_builtin_tool_names() {
        let registry = ToolRegistry::with_builtin_tools().unwrap();
        assert_eq!(registry.tool_names(), vec!["add", "calculate"]);
        assert_eq!(registry.tools().len(), 2);
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut registry = ToolRegistry::new();
        assert_ok!(AddTool::register(&mut registry));

        let err = assert_err!(
            registry.register(AddTool::to_tool(), |params: AddParams| AddTool::execute(&params))
        );
        assert!(matches!(err, ToolError::AlreadyRegistered(ref name) if name == "add"));
        assert_eq!(registry.tool_names(), vec!["add"]);
    }

    #[test]
    fn test_invoke_add() {
        let registry = ToolRegistry::with_builtin_tools().unwrap();
        let result = registry
            .invoke("add", arguments(serde_json::json!({ "a": 2, "b": 3 })))
            .unwrap();
        assert_eq!(result_text(&result), "2 + 3 = 5");
    }

    #[test]
    fn test_invoke_calculate_divide_by_zero() {
        let registry = ToolRegistry::with_builtin_tools().unwrap();
        let result = registry
            .invoke(
                "calculate",
                arguments(serde_json::json!({ "operation": "divide", "a": 1, "b": 0 })),
            )
            .unwrap();
        assert_eq!(result_text(&result), "Error: Cannot divide by zero");
    }

    #[test]
    fn test_invoke_unknown_tool() {
        let registry = ToolRegistry::with_builtin_tools().unwrap();
        let err = registry.invoke("sqrt", JsonObject::new()).unwrap_err();
        assert!(matches!(err, ToolError::NotFound(_)));
        assert_eq!(err.code(), -32601);
    }

    #[test]
    fn test_invoke_with_missing_argument() {
        let registry = ToolRegistry::with_builtin_tools().unwrap();
        let err = registry
            .invoke("add", arguments(serde_json::json!({ "a": 1 })))
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
        assert_eq!(err.code(), -32602);
    }
}
