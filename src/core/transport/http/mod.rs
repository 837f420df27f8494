//! HTTP transport implementation.
//!
//! Serves MCP over two mediums on one listener:
//!
//! - `/mcp`: buffered JSON-RPC request/response over POST
//! - `/sse`: server-push event stream, with messages POSTed to `/sse/message`
//!
//! plus a JSON health document on `/health` and `/`.

pub mod adapter;
pub mod cors;
pub mod jsonrpc;
pub mod router;
pub mod sse;

use tracing::info;

use super::{TransportError, TransportResult, config::HttpConfig};
use crate::core::McpServer;

pub use adapter::{AdapterError, BufferedRequest, BufferedResponse, McpAdapter, SessionAdapter};
pub use router::{AppState, Route, build_app};

/// HTTP transport handler.
pub struct HttpTransport {
    config: HttpConfig,
}

impl HttpTransport {
    /// Create a new HTTP transport with the given config.
    pub fn new(config: HttpConfig) -> Self {
        Self { config }
    }

    /// Get the bind address.
    pub fn address(&self) -> String {
        self.config.address()
    }

    /// Run the HTTP transport.
    pub async fn run(self, server: McpServer) -> TransportResult<()> {
        let addr = self.address();

        let app = build_app(AppState::new(server, self.config.max_body_bytes));

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| TransportError::bind(&addr, e))?;

        info!("Ready - listening on {}", addr);
        info!("  → Request/response: POST {}", router::MCP_BASE_PATH);
        info!("  → Event stream:     GET  {}", router::SSE_BASE_PATH);
        info!("  → Health:           GET  {}", router::HEALTH_PATH);

        axum::serve(listener, app)
            .await
            .map_err(|e| TransportError::http(e.to_string()))?;

        Ok(())
    }
}
