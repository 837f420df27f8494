//! Protocol session adapter.
//!
//! The router never frames protocol messages itself. It hands requests to a
//! [`SessionAdapter`] through one of two entry points:
//!
//! - [`SessionAdapter::serve_request`]: buffered request/response (`/mcp`)
//! - [`SessionAdapter::serve_stream`]: server-push event stream (`/sse`)
//!
//! [`McpAdapter`] is the production implementation. Tests swap in adapters
//! that fail to exercise the router's error handling.

use async_trait::async_trait;
use axum::body::Body;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use http::{HeaderMap, HeaderValue, Method, Request, StatusCode, Uri, header};
use thiserror::Error;
use tracing::{info, instrument, warn};

use super::jsonrpc::{JsonRpcResponse, Outcome, SERVER_ERROR, handle_payload};
use super::sse::SseSessions;
use crate::core::McpServer;

/// Failures raised by a session adapter or while preparing its input.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The request body could not be read.
    #[error("Failed to read request body: {0}")]
    Body(String),

    /// The adapter failed to produce a response.
    #[error("{0}")]
    Failed(String),
}

impl AdapterError {
    /// Create a body read error.
    pub fn body(msg: impl Into<String>) -> Self {
        Self::Body(msg.into())
    }

    /// Create a generic adapter failure.
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }
}

/// A request whose body has been read fully into memory.
///
/// `Bytes` clones are cheap, so the body can be re-read any number of times.
#[derive(Debug, Clone)]
pub struct BufferedRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl BufferedRequest {
    /// Read `request` into memory, accepting at most `limit` body bytes.
    ///
    /// Only POST bodies are read; other methods carry an empty body.
    pub async fn from_request(request: Request<Body>, limit: usize) -> Result<Self, AdapterError> {
        let (parts, body) = request.into_parts();
        let body = if parts.method == Method::POST {
            axum::body::to_bytes(body, limit)
                .await
                .map_err(|e| AdapterError::body(e.to_string()))?
        } else {
            Bytes::new()
        };

        Ok(Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
        })
    }
}

/// A fully buffered response: status, headers and body.
#[derive(Debug, Clone)]
pub struct BufferedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl BufferedResponse {
    /// Create a response with an empty body.
    pub fn empty(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Create a plain-text response.
    pub fn text(status: StatusCode, text: &'static str) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        Self {
            status,
            headers,
            body: Bytes::from_static(text.as_bytes()),
        }
    }

    /// Create a JSON response.
    pub fn json(status: StatusCode, value: &serde_json::Value) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        Self {
            status,
            headers,
            body: Bytes::from(value.to_string()),
        }
    }
}

impl IntoResponse for BufferedResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

/// Entry points the router delegates protocol traffic to.
#[async_trait]
pub trait SessionAdapter: Send + Sync {
    /// Serve one buffered request/response exchange under `base_path`.
    async fn serve_request(
        &self,
        base_path: &str,
        request: BufferedRequest,
    ) -> Result<BufferedResponse, AdapterError>;

    /// Serve the push-stream exchange under `base_path`.
    async fn serve_stream(
        &self,
        base_path: &str,
        request: Request<Body>,
    ) -> Result<Response, AdapterError>;
}

/// MCP adapter over the server's JSON-RPC dispatcher.
#[derive(Clone)]
pub struct McpAdapter {
    server: McpServer,
    sessions: SseSessions,
    max_body_bytes: usize,
}

impl McpAdapter {
    /// Create an adapter serving `server`.
    pub fn new(server: McpServer, max_body_bytes: usize) -> Self {
        Self {
            server,
            sessions: SseSessions::new(),
            max_body_bytes,
        }
    }
}

/// Response for a method the endpoint does not support.
pub(crate) fn method_not_allowed(allow: &'static str) -> BufferedResponse {
    let body = JsonRpcResponse::error(serde_json::Value::Null, SERVER_ERROR, "Method not allowed")
        .to_value();
    let mut response = BufferedResponse::json(StatusCode::METHOD_NOT_ALLOWED, &body);
    response
        .headers
        .insert(header::ALLOW, HeaderValue::from_static(allow));
    response
}

#[async_trait]
impl SessionAdapter for McpAdapter {
    #[instrument(skip_all, fields(method = %request.method, path = %request.uri.path()))]
    async fn serve_request(
        &self,
        _base_path: &str,
        request: BufferedRequest,
    ) -> Result<BufferedResponse, AdapterError> {
        if request.method != Method::POST {
            warn!("Unsupported method on request/response endpoint");
            return Ok(method_not_allowed("POST, OPTIONS"));
        }

        let response = match handle_payload(&self.server, &request.body) {
            Outcome::Accepted => BufferedResponse::empty(StatusCode::ACCEPTED),
            Outcome::Reply(reply) => BufferedResponse::json(StatusCode::OK, &reply),
            Outcome::ParseError(error) => {
                BufferedResponse::json(StatusCode::BAD_REQUEST, &error.to_value())
            }
        };

        info!(status = %response.status, "Request/response exchange complete");
        Ok(response)
    }

    async fn serve_stream(
        &self,
        base_path: &str,
        request: Request<Body>,
    ) -> Result<Response, AdapterError> {
        let message_path = format!("{}/message", base_path);
        let path = request.uri().path().to_string();

        if path == base_path && request.method() == Method::GET {
            return Ok(self.sessions.open(&message_path).await);
        }

        if path == message_path && request.method() == Method::POST {
            let request = BufferedRequest::from_request(request, self.max_body_bytes).await?;
            return Ok(self
                .sessions
                .post_message(&self.server, request)
                .await
                .into_response());
        }

        warn!(%path, method = %request.method(), "Unsupported stream request");
        let allow = if path == base_path { "GET, OPTIONS" } else { "POST, OPTIONS" };
        Ok(method_not_allowed(allow).into_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Config;

    fn adapter() -> McpAdapter {
        McpAdapter::new(McpServer::new(Config::default()).unwrap(), 1024)
    }

    fn post(body: &str) -> BufferedRequest {
        BufferedRequest {
            method: Method::POST,
            uri: Uri::from_static("/mcp"),
            headers: HeaderMap::new(),
            body: Bytes::from(body.to_string()),
        }
    }

    #[tokio::test]
    async fn test_serve_request_tools_call() {
        let response = adapter()
            .serve_request(
                "/mcp",
                post(r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"add","arguments":{"a":2,"b":3}}}"#),
            )
            .await
            .unwrap();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.headers[header::CONTENT_TYPE], "application/json");

        let body: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
        assert_eq!(body["result"]["content"][0]["text"], "2 + 3 = 5");
    }

    #[tokio::test]
    async fn test_serve_request_notification_is_accepted() {
        let response = adapter()
            .serve_request(
                "/mcp",
                post(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#),
            )
            .await
            .unwrap();
        assert_eq!(response.status, StatusCode::ACCEPTED);
        assert!(response.body.is_empty());
    }

    #[tokio::test]
    async fn test_serve_request_parse_error() {
        let response = adapter().serve_request("/mcp", post("{")).await.unwrap();
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_serve_request_get_not_allowed() {
        let mut request = post("");
        request.method = Method::GET;
        let response = adapter().serve_request("/mcp", request).await.unwrap();
        assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers[header::ALLOW], "POST, OPTIONS");
    }

    #[tokio::test]
    async fn test_buffered_request_rejects_oversized_body() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/mcp")
            .body(Body::from(vec![b'x'; 2048]))
            .unwrap();
        let result = BufferedRequest::from_request(request, 1024).await;
        assert!(matches!(result, Err(AdapterError::Body(_))));
    }

    #[tokio::test]
    async fn test_buffered_request_skips_body_for_get() {
        let request = Request::builder()
            .method(Method::GET)
            .uri("/mcp")
            .body(Body::from("ignored"))
            .unwrap();
        let buffered = BufferedRequest::from_request(request, 1024).await.unwrap();
        assert!(buffered.body.is_empty());
    }
}
