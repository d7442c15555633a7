use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{analyze, handlers, memory, middleware::metrics_middleware, ws};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Info, health and config
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/metrics", get(handlers::metrics))
        // Analysis
        .route("/analyze", post(analyze::analyze))
        .route("/analyze/batch", post(analyze::analyze_batch))
        // Memory
        .route("/memory", get(memory::list_memories))
        .route("/memory/stats", get(memory::get_stats))
        .route("/memory/patterns", get(memory::list_patterns))
        // Streaming
        .route("/ws/stream", get(ws::ws_handler))
        .route("/client", get(handlers::client))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
