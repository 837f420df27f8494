//! Tools domain module.
//!
//! Tools are executable functions that MCP clients call to perform
//! computations.
//!
//! ## Architecture
//!
//! - `definitions/` - Individual tool implementations (one file per tool)
//! - `registry.rs` - Tool registration, argument validation and dispatch
//! - `router.rs` - rmcp ToolRouter builder for the STDIO transport
//! - `error.rs` - Tool-specific error types
//!
//! ## Adding a New Tool
//!
//! 1. Create a new file in `definitions/` (e.g., `my_tool.rs`)
//! 2. Define params, `execute()`, `to_tool()` and `register()`
//! 3. Export in `definitions/mod.rs`
//! 4. Call `register()` from `ToolRegistry::with_builtin_tools`

pub mod definitions;
mod error;
mod registry;
pub mod router;

pub use error::ToolError;
pub use registry::{ToolDefinition, ToolRegistry};
pub use router::build_tool_router;
