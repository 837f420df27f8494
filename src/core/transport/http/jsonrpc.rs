//! JSON-RPC 2.0 message types and the MCP method dispatcher.
//!
//! Both HTTP entry points (`/mcp` and `/sse`) frame messages the same way;
//! only the delivery differs. This module turns a raw request body into the
//! response payload, leaving delivery to the caller.

use rmcp::model::JsonObject;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::core::McpServer;
use crate::core::server::SERVER_INSTRUCTIONS;

/// JSON-RPC protocol version.
pub const JSONRPC_VERSION: &str = "2.0";

/// MCP protocol revisions this server can speak, oldest first.
pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] = &["2024-11-05", "2025-03-26", "2025-06-18"];

/// Parse error.
pub const PARSE_ERROR: i32 = -32700;
/// Invalid request.
pub const INVALID_REQUEST: i32 = -32600;
/// Method not found.
pub const METHOD_NOT_FOUND: i32 = -32601;
/// Invalid params.
pub const INVALID_PARAMS: i32 = -32602;
/// Internal error.
pub const INTERNAL_ERROR: i32 = -32603;
/// Generic server error (transport level).
pub const SERVER_ERROR: i32 = -32000;

/// JSON-RPC request structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    /// `None` when the member is absent; an explicit `null` is `Some(Value::Null)`.
    #[serde(default, deserialize_with = "deserialize_present")]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// JSON-RPC response structure.
///
/// `id` is always serialized; it is `null` when the request id is unknown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    #[serde(default)]
    pub id: Value,
}

/// JSON-RPC error structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcResponse {
    /// Create a success response.
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    /// Create an error response.
    pub fn error(id: Value, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
            id,
        }
    }

    /// Attach a `data` member to the error.
    pub fn with_data(mut self, data: impl Into<Value>) -> Self {
        if let Some(error) = self.error.as_mut() {
            error.data = Some(data.into());
        }
        self
    }

    /// Parse error.
    pub fn parse_error(detail: impl Into<String>) -> Self {
        Self::error(Value::Null, PARSE_ERROR, "Parse error").with_data(detail.into())
    }

    /// Method not found error.
    pub fn method_not_found(id: Value, method: &str) -> Self {
        Self::error(id, METHOD_NOT_FOUND, "Method not found").with_data(method)
    }

    /// Invalid request error.
    pub fn invalid_request(id: Value) -> Self {
        Self::error(id, INVALID_REQUEST, "Invalid Request")
    }

    /// Invalid params error.
    pub fn invalid_params(id: Value, msg: impl Into<String>) -> Self {
        Self::error(id, INVALID_PARAMS, msg)
    }

    /// The `-32603` envelope returned when a request fails unexpectedly.
    pub fn internal_error(detail: impl Into<String>) -> Self {
        Self::error(Value::Null, INTERNAL_ERROR, "Internal error").with_data(detail.into())
    }

    /// Serialize to a JSON value.
    pub fn to_value(&self) -> Value {
        // Every field is plain JSON, so serialization cannot fail.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Result of processing one request body.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// The body held only notifications; nothing to send back.
    Accepted,
    /// A single response or a batch of responses.
    Reply(Value),
    /// The body was not valid JSON.
    ParseError(JsonRpcResponse),
}

/// Process a raw JSON-RPC body (single message or batch).
pub fn handle_payload(server: &McpServer, body: &[u8]) -> Outcome {
    let payload: Value = match serde_json::from_slice(body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!("Rejecting unparseable JSON-RPC body: {}", e);
            return Outcome::ParseError(JsonRpcResponse::parse_error(e.to_string()));
        }
    };

    match payload {
        Value::Array(messages) if messages.is_empty() => {
            Outcome::Reply(JsonRpcResponse::invalid_request(Value::Null).to_value())
        }
        Value::Array(messages) => {
            debug!(count = messages.len(), "Processing JSON-RPC batch");
            let replies: Vec<Value> = messages
                .into_iter()
                .filter_map(|message| dispatch(server, message))
                .map(|response| response.to_value())
                .collect();
            if replies.is_empty() {
                Outcome::Accepted
            } else {
                Outcome::Reply(Value::Array(replies))
            }
        }
        message => match dispatch(server, message) {
            Some(response) => Outcome::Reply(response.to_value()),
            None => Outcome::Accepted,
        },
    }
}

/// Dispatch one JSON-RPC message. Returns `None` for notifications.
pub fn dispatch(server: &McpServer, message: Value) -> Option<JsonRpcResponse> {
    let request: JsonRpcRequest = match serde_json::from_value(message) {
        Ok(request) => request,
        Err(e) => {
            warn!("Malformed JSON-RPC message: {}", e);
            return Some(JsonRpcResponse::invalid_request(Value::Null));
        }
    };

    if request.jsonrpc != JSONRPC_VERSION {
        return Some(JsonRpcResponse::invalid_request(
            request.id.unwrap_or(Value::Null),
        ));
    }

    let Some(id) = request.id.clone() else {
        handle_notification(&request);
        return None;
    };

    if id.is_null() {
        warn!(method = %request.method, "Rejecting request with a null id");
        return Some(JsonRpcResponse::invalid_request(Value::Null));
    }

    Some(process_request(server, id, request))
}

#[instrument(skip_all, fields(method = %request.method))]
fn process_request(server: &McpServer, id: Value, request: JsonRpcRequest) -> JsonRpcResponse {
    match request.method.as_str() {
        "initialize" => handle_initialize(server, id, request.params),
        "ping" => JsonRpcResponse::success(id, serde_json::json!({})),
        "tools/list" => handle_tools_list(server, id),
        "tools/call" => handle_tools_call(server, id, request.params),
        method => {
            warn!("Unknown method: {}", method);
            JsonRpcResponse::method_not_found(id, method)
        }
    }
}

/// Pick the protocol revision to answer `initialize` with.
fn negotiate_protocol_version(requested: Option<&str>) -> &'static str {
    let latest = SUPPORTED_PROTOCOL_VERSIONS[SUPPORTED_PROTOCOL_VERSIONS.len() - 1];
    requested
        .and_then(|v| SUPPORTED_PROTOCOL_VERSIONS.iter().copied().find(|s| *s == v))
        .unwrap_or(latest)
}

fn handle_initialize(server: &McpServer, id: Value, params: Option<Value>) -> JsonRpcResponse {
    let requested = params
        .as_ref()
        .and_then(|p| p.get("protocolVersion"))
        .and_then(Value::as_str);
    let protocol_version = negotiate_protocol_version(requested);
    info!(protocol_version, "Processing initialize request");

    JsonRpcResponse::success(
        id,
        serde_json::json!({
            "protocolVersion": protocol_version,
            "capabilities": {
                "tools": { "listChanged": false }
            },
            "serverInfo": {
                "name": server.name(),
                "version": server.version()
            },
            "instructions": SERVER_INSTRUCTIONS
        }),
    )
}

fn handle_tools_list(server: &McpServer, id: Value) -> JsonRpcResponse {
    info!("Processing tools/list request");
    JsonRpcResponse::success(id, serde_json::json!({ "tools": server.list_tools() }))
}

fn handle_tools_call(server: &McpServer, id: Value, params: Option<Value>) -> JsonRpcResponse {
    let Some(params) = params else {
        return JsonRpcResponse::invalid_params(id, "Missing params");
    };

    let Some(name) = params.get("name").and_then(Value::as_str) else {
        return JsonRpcResponse::invalid_params(id, "Missing tool name");
    };

    let arguments: JsonObject = match params.get("arguments") {
        None | Some(Value::Null) => JsonObject::new(),
        Some(Value::Object(arguments)) => arguments.clone(),
        Some(_) => return JsonRpcResponse::invalid_params(id, "Tool arguments must be an object"),
    };

    info!(tool = name, "Processing tools/call request");

    match server.call_tool(name, arguments) {
        Ok(result) => match serde_json::to_value(&result) {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(e) => JsonRpcResponse::error(id, INTERNAL_ERROR, e.to_string()),
        },
        Err(e) => JsonRpcResponse::error(id, e.code(), e.to_string()),
    }
}

fn handle_notification(request: &JsonRpcRequest) {
    match request.method.as_str() {
        "notifications/initialized" => info!("Client sent initialized notification"),
        method => debug!("Received notification: {}", method),
    }
}
