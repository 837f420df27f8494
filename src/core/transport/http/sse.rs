//! Server-push event stream sessions.
//!
//! A client opens `GET /sse` and receives an `endpoint` event naming the URL
//! to POST its messages to (`/sse/message?sessionId=<id>`). Responses to
//! those messages are pushed back on the stream as `message` events.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;

use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use futures::stream::{self, StreamExt};
use http::StatusCode;
use serde::Deserialize;
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::adapter::{BufferedRequest, BufferedResponse};
use super::jsonrpc::{Outcome, handle_payload};
use crate::core::McpServer;

/// Query string of a message POST.
#[derive(Debug, Deserialize)]
struct SessionQuery {
    #[serde(rename = "sessionId")]
    session_id: Option<String>,
}

/// Open stream sessions, keyed by session id.
///
/// Each entry holds the sending half of the channel feeding that session's
/// event stream. Entries whose stream has gone away are pruned when a new
/// session opens or when a message to them fails.
#[derive(Clone, Default)]
pub struct SseSessions {
    inner: Arc<RwLock<HashMap<String, mpsc::UnboundedSender<String>>>>,
}

impl SseSessions {
    /// Create an empty session table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.inner
            .read()
            .await
            .values()
            .filter(|tx| !tx.is_closed())
            .count()
    }

    /// Whether no session is live.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Open a new session and return its event stream response.
    pub async fn open(&self, message_path: &str) -> Response {
        let session_id = Uuid::new_v4().to_string();
        let (tx, rx) = mpsc::unbounded_channel::<String>();

        {
            let mut sessions = self.inner.write().await;
            sessions.retain(|_, tx| !tx.is_closed());
            sessions.insert(session_id.clone(), tx);
        }
        info!(%session_id, "Opened event stream session");

        let endpoint = Event::default()
            .event("endpoint")
            .data(format!("{}?sessionId={}", message_path, session_id));

        let messages = stream::unfold(rx, |mut rx| async move {
            let message = rx.recv().await?;
            Some((Event::default().event("message").data(message), rx))
        });

        let events = stream::once(async move { endpoint })
            .chain(messages)
            .map(Ok::<_, Infallible>);

        Sse::new(events)
            .keep_alive(KeepAlive::default())
            .into_response()
    }

    /// Handle a message POSTed for a session.
    ///
    /// The JSON-RPC reply, if any, is pushed on the session's stream; the
    /// HTTP response only acknowledges receipt.
    pub async fn post_message(
        &self,
        server: &McpServer,
        request: BufferedRequest,
    ) -> BufferedResponse {
        let query = request.uri.query().unwrap_or_default();
        let session_id = match serde_urlencoded::from_str::<SessionQuery>(query) {
            Ok(SessionQuery {
                session_id: Some(id),
            }) => id,
            _ => {
                warn!("Message posted without a sessionId");
                return BufferedResponse::text(StatusCode::BAD_REQUEST, "Missing sessionId");
            }
        };

        let sender = self.inner.read().await.get(&session_id).cloned();
        let Some(sender) = sender.filter(|tx| !tx.is_closed()) else {
            warn!(%session_id, "Message posted for unknown session");
            return BufferedResponse::text(StatusCode::NOT_FOUND, "Session not found");
        };

        match handle_payload(server, &request.body) {
            Outcome::ParseError(error) => {
                BufferedResponse::json(StatusCode::BAD_REQUEST, &error.to_value())
            }
            Outcome::Accepted => BufferedResponse::text(StatusCode::ACCEPTED, "Accepted"),
            Outcome::Reply(reply) => {
                if sender.send(reply.to_string()).is_err() {
                    self.inner.write().await.remove(&session_id);
                    warn!(%session_id, "Event stream closed before reply could be sent");
                    return BufferedResponse::text(StatusCode::NOT_FOUND, "Session not found");
                }
                debug!(%session_id, "Reply queued on event stream");
                BufferedResponse::text(StatusCode::ACCEPTED, "Accepted")
            }
        }
    }
}
