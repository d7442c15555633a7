use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse},
    Json,
};
use serde::{Deserialize, Serialize};
use spiral_core::SanitizedConfig;
use std::sync::Arc;

use crate::metrics::encode_metrics;
use crate::state::AppState;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// JSON error body shared by all handlers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub config_loaded: bool,
    pub uptime_seconds: u64,
}

pub async fn index() -> Html<String> {
    Html(format!(
        r#"<html>
    <head><title>SpiralMind Nexus API v{VERSION}</title></head>
    <body>
        <h1>SpiralMind Nexus API v{VERSION}</h1>
        <p>Decision pipeline: REST &amp; WebSocket API</p>
        <ul>
            <li><a href="/health">Health check</a></li>
            <li><a href="/config">Configuration</a></li>
            <li><a href="/metrics">Metrics</a></li>
            <li><a href="/client">WebSocket client</a></li>
        </ul>
        <h2>Quick start</h2>
        <pre>
curl -X POST "http://localhost:8000/analyze" \
     -H "Content-Type: application/json" \
     -d '{{"text": "Hello SpiralMind", "mode": "BALANCED"}}'

ws://localhost:8000/ws/stream
        </pre>
    </body>
</html>"#
    ))
}

const CLIENT_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>SpiralMind Nexus Client</title>
    <style>
        body { font-family: sans-serif; margin: 40px; max-width: 800px; }
        textarea { width: 100%; height: 100px; }
        button { padding: 8px 16px; margin: 8px 0; }
        #output { border: 1px solid #ccc; padding: 8px; height: 300px; overflow-y: scroll; }
        .analysis { background: #e8f5e8; }
        .error { background: #ffe8e8; }
        .status, .batch_complete { background: #e8f0ff; }
    </style>
</head>
<body>
    <h1>SpiralMind Nexus Client</h1>
    <textarea id="text" placeholder="Text to analyze (Ctrl+Enter sends)"></textarea>
    <select id="mode">
        <option value="BALANCED">BALANCED</option>
        <option value="VERIFICATION">VERIFICATION</option>
        <option value="CREATIVE">CREATIVE</option>
    </select>
    <button id="send">Analyze</button>
    <button id="clear">Clear</button>
    <div id="output"></div>
    <script>
        const scheme = location.protocol === "https:" ? "wss" : "ws";
        const ws = new WebSocket(`${scheme}://${location.host}/ws/stream`);
        const output = document.getElementById("output");

        ws.onmessage = (event) => {
            const msg = JSON.parse(event.data);
            const line = document.createElement("div");
            line.className = msg.type;
            if (msg.type === "analysis") {
                const d = msg.data;
                line.textContent = `${d.decision} conf=${d.confidence.toFixed(3)} ` +
                    `succ=${d.success.toFixed(3)} iters=${d.iterations} mode=${d.pipeline_mode}`;
            } else {
                line.textContent = `${msg.type}: ${JSON.stringify(msg.data)}`;
            }
            output.appendChild(line);
            output.scrollTop = output.scrollHeight;
        };

        function send() {
            const text = document.getElementById("text").value;
            if (text.trim()) {
                ws.send(JSON.stringify({ text, mode: document.getElementById("mode").value }));
            }
        }

        document.getElementById("send").onclick = send;
        document.getElementById("clear").onclick = () => { output.textContent = ""; };
        document.getElementById("text").addEventListener("keydown", (e) => {
            if (e.key === "Enter" && e.ctrlKey) send();
        });
    </script>
</body>
</html>"#;

/// Browser test page for `/ws/stream`.
pub async fn client() -> Html<&'static str> {
    Html(CLIENT_PAGE)
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: VERSION.to_string(),
        config_loaded: true,
        uptime_seconds: state.uptime_seconds() as u64,
    })
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<SanitizedConfig> {
    Json(state.sanitized_config())
}

pub async fn metrics() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        encode_metrics(),
    )
}
