//! WebSocket stream of analysis results.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use chrono::Utc;
use futures::{Sink, SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use super::analyze::{process_analysis, AnalysisRequest, AnalysisResponse};
use crate::metrics::{
    WS_CONNECTIONS_ACTIVE, WS_CONNECTIONS_TOTAL, WS_LAG_EVENTS, WS_MESSAGES_RECEIVED,
    WS_MESSAGES_SENT,
};
use crate::state::AppState;

/// Kind of a stream message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamKind {
    Status,
    Analysis,
    BatchComplete,
    Error,
}

impl StreamKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamKind::Status => "status",
            StreamKind::Analysis => "analysis",
            StreamKind::BatchComplete => "batch_complete",
            StreamKind::Error => "error",
        }
    }
}

/// Message sent to stream clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamMessage {
    #[serde(rename = "type")]
    pub kind: StreamKind,
    pub data: Value,
    pub timestamp: String,
}

impl StreamMessage {
    pub fn new(kind: StreamKind, data: Value) -> Self {
        Self {
            kind,
            data,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    pub fn welcome() -> Self {
        Self::new(
            StreamKind::Status,
            json!({
                "message": "Connected to SpiralMind Nexus stream",
                "version": env!("CARGO_PKG_VERSION"),
            }),
        )
    }

    pub fn analysis(response: &AnalysisResponse) -> Self {
        Self::new(
            StreamKind::Analysis,
            serde_json::to_value(response).unwrap_or(Value::Null),
        )
    }

    pub fn batch_complete(data: Value) -> Self {
        Self::new(StreamKind::BatchComplete, data)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(StreamKind::Error, json!({ "error": message.into() }))
    }
}

/// Broadcaster for WebSocket messages using tokio broadcast channel.
#[derive(Debug, Clone)]
pub struct WsBroadcaster {
    sender: broadcast::Sender<StreamMessage>,
}

impl WsBroadcaster {
    /// Create a new broadcaster with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Broadcast a message to all connected clients.
    pub fn broadcast(&self, msg: StreamMessage) {
        // No receivers just means no one is listening
        let _ = self.sender.send(msg);
    }

    /// Subscribe to receive messages.
    pub fn subscribe(&self) -> broadcast::Receiver<StreamMessage> {
        self.sender.subscribe()
    }
}

impl Default for WsBroadcaster {
    fn default() -> Self {
        Self::new(256)
    }
}

/// WebSocket upgrade handler.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Answer one client request with an `analysis` or `error` message.
pub fn reply_to(state: &AppState, text: &str) -> StreamMessage {
    let request: AnalysisRequest = match serde_json::from_str(text) {
        Ok(request) => request,
        Err(e) if e.is_syntax() || e.is_eof() => {
            WS_MESSAGES_RECEIVED.with_label_values(&["invalid"]).inc();
            return StreamMessage::error("Invalid JSON format");
        }
        Err(e) => {
            WS_MESSAGES_RECEIVED.with_label_values(&["invalid"]).inc();
            return StreamMessage::error(e.to_string());
        }
    };

    match process_analysis(state, &request) {
        Ok(response) => {
            WS_MESSAGES_RECEIVED.with_label_values(&["analyzed"]).inc();
            StreamMessage::analysis(&response)
        }
        Err((_, body)) => {
            WS_MESSAGES_RECEIVED.with_label_values(&["failed"]).inc();
            StreamMessage::error(body.0.error)
        }
    }
}

async fn send<S>(sender: &mut S, msg: &StreamMessage) -> bool
where
    S: Sink<Message> + Unpin,
{
    WS_MESSAGES_SENT.with_label_values(&[msg.kind.as_str()]).inc();
    match serde_json::to_string(msg) {
        Ok(json) => sender.send(Message::Text(json.into())).await.is_ok(),
        Err(e) => {
            error!("Failed to serialize StreamMessage: {}", e);
            true
        }
    }
}

/// Handle a single WebSocket connection.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    let mut rx = state.ws_broadcaster().subscribe();

    WS_CONNECTIONS_TOTAL.inc();
    WS_CONNECTIONS_ACTIVE.inc();

    info!("WebSocket client connected");

    if send(&mut sender, &StreamMessage::welcome()).await {
        loop {
            tokio::select! {
                result = rx.recv() => {
                    match result {
                        Ok(msg) => {
                            if !send(&mut sender, &msg).await {
                                debug!("WebSocket send failed, client disconnected");
                                break;
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            warn!("WebSocket client lagged, skipped {} messages", n);
                            WS_LAG_EVENTS.inc();
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            debug!("Broadcast channel closed");
                            break;
                        }
                    }
                }
                incoming = receiver.next() => {
                    match incoming {
                        Some(Ok(Message::Text(text))) => {
                            let reply = reply_to(&state, text.as_str());
                            if !send(&mut sender, &reply).await {
                                break;
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            debug!("WebSocket client requested close");
                            break;
                        }
                        Some(Ok(_)) => {
                            // Ping/pong handled by axum
                        }
                        Some(Err(e)) => {
                            warn!("WebSocket receive error: {}", e);
                            break;
                        }
                    }
                }
            }
        }
    }

    WS_CONNECTIONS_ACTIVE.dec();
    info!("WebSocket client disconnected");
}
