//! Request router for the HTTP transport.
//!
//! A single fallback handler classifies every request by method and path and
//! sends it down one of five branches: CORS preflight, event stream,
//! request/response, health document, or not-found. The CORS decorator and
//! a panic guard wrap the whole router, so every branch (and every failure)
//! leaves with the same cross-origin headers.

use std::any::Any;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use bytes::Bytes;
use http::{HeaderValue, Method, Request, StatusCode, header};
use http_body_util::Full;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, instrument, warn};

use super::adapter::{AdapterError, BufferedRequest, McpAdapter, SessionAdapter};
use super::cors;
use super::jsonrpc::JsonRpcResponse;
use crate::core::McpServer;

/// Base path of the request/response protocol endpoint.
pub const MCP_BASE_PATH: &str = "/mcp";
/// Base path of the event stream protocol endpoint.
pub const SSE_BASE_PATH: &str = "/sse";
/// Path the stream clients POST messages to.
pub const SSE_MESSAGE_PATH: &str = "/sse/message";
/// Health document path.
pub const HEALTH_PATH: &str = "/health";
/// Endpoints advertised in not-found responses.
pub const AVAILABLE_ENDPOINTS: [&str; 3] = [MCP_BASE_PATH, SSE_BASE_PATH, HEALTH_PATH];

/// Application state shared across requests.
#[derive(Clone)]
pub struct AppState {
    server: McpServer,
    adapter: Arc<dyn SessionAdapter>,
    max_body_bytes: usize,
}

impl AppState {
    /// Create state backed by the MCP adapter.
    pub fn new(server: McpServer, max_body_bytes: usize) -> Self {
        let adapter = Arc::new(McpAdapter::new(server.clone(), max_body_bytes));
        Self::with_adapter(server, adapter, max_body_bytes)
    }

    /// Create state with a custom session adapter.
    pub fn with_adapter(
        server: McpServer,
        adapter: Arc<dyn SessionAdapter>,
        max_body_bytes: usize,
    ) -> Self {
        Self {
            server,
            adapter,
            max_body_bytes,
        }
    }
}

/// Which branch handles a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Preflight,
    Stream,
    RequestResponse,
    Health,
    NotFound,
}

impl Route {
    /// Classify a request. Rules are checked in order; the first match wins.
    pub fn classify(method: &Method, path: &str) -> Self {
        if method == Method::OPTIONS {
            Self::Preflight
        } else if path == SSE_BASE_PATH || path == SSE_MESSAGE_PATH {
            Self::Stream
        } else if path == MCP_BASE_PATH || path.starts_with("/mcp/") {
            Self::RequestResponse
        } else if path == HEALTH_PATH || path == "/" {
            Self::Health
        } else {
            Self::NotFound
        }
    }
}

/// Build the HTTP application.
pub fn build_app(state: AppState) -> Router {
    let app = Router::new()
        .fallback(route_request)
        .with_state(state)
        .layer(CatchPanicLayer::custom(panic_response));

    cors::apply(app).layer(TraceLayer::new_for_http())
}

/// Top-level handler: route the request and convert any failure into the
/// JSON-RPC internal error envelope.
#[instrument(skip_all, fields(method = %request.method(), path = %request.uri().path()))]
async fn route_request(State(state): State<AppState>, request: Request<Body>) -> Response {
    match dispatch(&state, request).await {
        Ok(response) => response,
        Err(e) => {
            error!("Request handling error: {}", e);
            internal_error_response(e.to_string())
        }
    }
}

async fn dispatch(state: &AppState, request: Request<Body>) -> Result<Response, AdapterError> {
    let path = request.uri().path().to_string();

    match Route::classify(request.method(), &path) {
        Route::Preflight => {
            info!("Answering CORS preflight");
            Ok(cors::preflight())
        }
        Route::Stream => {
            info!("Routing to stream handler");
            state.adapter.serve_stream(SSE_BASE_PATH, request).await
        }
        Route::RequestResponse => {
            info!("Routing to request/response handler");
            Ok(handle_request_response(state, request).await)
        }
        Route::Health => {
            info!("Serving health document");
            Ok(health(&state.server))
        }
        Route::NotFound => {
            warn!("No route matched for: {}", path);
            Ok(not_found(&path))
        }
    }
}

/// Buffer the request, hand it to the adapter, and re-emit its buffered
/// response. Adapter failures become a 500 envelope here.
async fn handle_request_response(state: &AppState, request: Request<Body>) -> Response {
    let result = async {
        let request = BufferedRequest::from_request(request, state.max_body_bytes).await?;
        state.adapter.serve_request(MCP_BASE_PATH, request).await
    }
    .await;

    match result {
        Ok(response) => {
            info!(status = %response.status, "Request/response handler responded");
            response.into_response()
        }
        Err(e) => {
            error!("Request/response handler error: {}", e);
            internal_error_response(e.to_string())
        }
    }
}

/// Health document.
fn health(server: &McpServer) -> Response {
    Json(serde_json::json!({
        "status": "healthy",
        "server": format!("{} MCP Server", server.name()),
        "version": server.version(),
        "tools": server.tool_names(),
        "endpoints": {
            "mcp": MCP_BASE_PATH,
            "sse": SSE_BASE_PATH,
            "health": HEALTH_PATH
        },
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
    .into_response()
}

fn not_found(path: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "error": "Not found",
            "path": path,
            "available_endpoints": AVAILABLE_ENDPOINTS
        })),
    )
        .into_response()
}

/// HTTP 500 carrying the JSON-RPC `-32603` envelope.
pub fn internal_error_response(detail: impl Into<String>) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(JsonRpcResponse::internal_error(detail)),
    )
        .into_response()
}

/// Convert a handler panic into the internal error envelope.
fn panic_response(err: Box<dyn Any + Send + 'static>) -> http::Response<Full<Bytes>> {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };
    error!("Request handler panicked: {}", detail);

    let body = JsonRpcResponse::internal_error(detail).to_value().to_string();
    let mut response = http::Response::new(Full::from(body));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response
}
