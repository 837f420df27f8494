//! Addition tool.
//!
//! Adds two numbers and reports the equation, e.g. `2 + 3 = 5`.

use rmcp::model::{CallToolResult, Tool};
use rmcp::handler::server::tool::cached_schema_for_type;
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::{info, instrument};

use super::common::{format_equation, text_result};
use crate::domains::tools::{ToolError, ToolRegistry};

/// Parameters for the add tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AddParams {
    /// First operand.
    pub a: f64,

    /// Second operand.
    pub b: f64,
}

/// Add tool - sums two numbers.
pub struct AddTool;

impl AddTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "add";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Add two numbers together.";

    /// Execute the tool logic.
    #[instrument(skip_all, fields(a = params.a, b = params.b))]
    pub fn execute(params: &AddParams) -> CallToolResult {
        let sum = params.a + params.b;
        info!(result = sum, "Add tool called");
        text_result(format_equation(params.a, "+", params.b, sum))
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<AddParams>(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }

    /// Register this tool with the given registry.
    pub fn register(registry: &mut ToolRegistry) -> Result<(), ToolError> {
        registry.register(Self::to_tool(), |params: AddParams| Self::execute(&params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::definitions::common::result_text;

    fn add(a: f64, b: f64) -> String {
        result_text(&AddTool::execute(&AddParams { a, b }))
    }

    #[test]
    fn test_add_integers() {
        assert_eq!(add(2.0, 3.0), "2 + 3 = 5");
    }

    #[test]
    fn test_add_negative_and_fractional() {
        assert_eq!(add(-1.5, 0.25), "-1.5 + 0.25 = -1.25");
        assert_eq!(add(0.1, 0.2), "0.1 + 0.2 = 0.30000000000000004");
    }

    #[test]
    fn test_add_extreme_magnitudes() {
        assert_eq!(add(1e21, 1e-7), "1e+21 + 1e-7 = 1e+21");
    }

    #[test]
    fn test_add_is_never_an_error() {
        let result = AddTool::execute(&AddParams { a: f64::MAX, b: f64::MAX });
        assert_eq!(result.is_error, Some(false));
        assert!(result_text(&result).ends_with("= Infinity"));
    }

    #[test]
    fn test_params_accept_integers() {
        let params: AddParams = serde_json::from_str(r#"{"a": 2, "b": 3}"#).unwrap();
        assert_eq!(params.a, 2.0);
        assert_eq!(params.b, 3.0);
    }

    #[test]
    fn test_params_reject_strings() {
        let result = serde_json::from_str::<AddParams>(r#"{"a": "2", "b": 3}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_schema_lists_both_operands() {
        let tool = AddTool::to_tool();
        let properties = tool.input_schema["properties"].as_object().unwrap();
        assert!(properties.contains_key("a"));
        assert!(properties.contains_key("b"));
    }
}
