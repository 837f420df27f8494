//! Four-function calculator tool.
//!
//! Applies one of `add`, `subtract`, `multiply` or `divide` to two numbers.
//! Division by zero is reported as a regular text result so clients can show
//! it to the user instead of treating it as a protocol failure.

use rmcp::handler::server::tool::cached_schema_for_type;
use rmcp::model::{CallToolResult, Tool};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use super::common::{format_equation, text_result};
use crate::domains::tools::{ToolError, ToolRegistry};

/// Message returned when dividing by zero.
pub const DIVIDE_BY_ZERO_MESSAGE: &str = "Error: Cannot divide by zero";

/// Arithmetic operation supported by the calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operation {
    /// Symbol used when printing the equation.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "\u{2212}",
            Self::Multiply => "\u{00d7}",
            Self::Divide => "\u{00f7}",
        }
    }

    /// Apply the operation. Returns `None` when dividing by zero.
    pub fn apply(self, a: f64, b: f64) -> Option<f64> {
        match self {
            Self::Add => Some(a + b),
            Self::Subtract => Some(a - b),
            Self::Multiply => Some(a * b),
            Self::Divide if b == 0.0 => None,
            Self::Divide => Some(a / b),
        }
    }
}

/// Parameters for the calculate tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CalculateParams {
    /// The operation to perform.
    pub operation: Operation,

    /// Left operand.
    pub a: f64,

    /// Right operand.
    pub b: f64,
}

/// Calculate tool - add, subtract, multiply or divide two numbers.
pub struct CalculateTool;

impl CalculateTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "calculate";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str =
        "Perform a basic arithmetic operation (add, subtract, multiply, divide) on two numbers.";

    /// Execute the tool logic.
    #[instrument(skip_all, fields(operation = ?params.operation, a = params.a, b = params.b))]
    pub fn execute(params: &CalculateParams) -> CallToolResult {
        match params.operation.apply(params.a, params.b) {
            Some(result) => {
                info!(result, "Calculate tool called");
                text_result(format_equation(
                    params.a,
                    params.operation.symbol(),
                    params.b,
                    result,
                ))
            }
            None => {
                warn!("Division by zero requested");
                text_result(DIVIDE_BY_ZERO_MESSAGE)
            }
        }
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<CalculateParams>(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }

    /// Register this tool with the given registry.
    pub fn register(registry: &mut ToolRegistry) -> Result<(), ToolError> {
        registry.register(Self::to_tool(), |params: CalculateParams| {
            Self::execute(&params)
        })
    }
}
