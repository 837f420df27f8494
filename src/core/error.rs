//! Error types and handling for the MCP server.
//!
//! This module defines a unified error type that can represent errors from
//! all domains and external dependencies.

use thiserror::Error;

/// A specialized Result type for MCP server operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the MCP server.
#[derive(Debug, Error)]
pub enum Error {
    /// Error originating from the tools domain.
    #[error("Tool error: {0}")]
    Tool(#[from] crate::domains::tools::ToolError),

    /// Transport startup or serving failure.
    #[error("Transport error: {0}")]
    Transport(#[from] super::transport::TransportError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transport::TransportError;
    use crate::domains::tools::ToolError;

    #[test]
    fn test_tool_error_is_wrapped() {
        let err: Error = ToolError::already_registered("add").into();
        assert!(matches!(err, Error::Tool(_)));
        assert!(err.to_string().starts_with("Tool error: "));
    }

    #[test]
    fn test_transport_error_is_wrapped() {
        let err: Error = TransportError::init("stdin closed").into();
        assert_eq!(
            err.to_string(),
            "Transport error: Server initialization error: stdin closed"
        );
    }
}
