//! Authless Calculator MCP Server Library
//!
//! A Model Context Protocol (MCP) server exposing two arithmetic tools,
//! `add` and `calculate`, over a buffered request/response endpoint (`/mcp`)
//! and a server-push event stream (`/sse`).
//!
//! # Architecture
//!
//! - **core**: configuration, error handling, the MCP server and transports
//!   - **transport::http**: request router, CORS decorator and protocol adapter
//! - **domains**: business logic organized by bounded contexts
//!   - **tools**: tool registry and the calculator tool definitions
//!
//! # Example
//!
//! ```rust,no_run
//! use calculator_mcp_server::{core::McpServer, core::Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let _server = McpServer::new(config)?;
//!     // Start the server...
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, McpServer, Result};
