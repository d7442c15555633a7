//! Memory store API handlers.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use spiral_core::memory::{MemoryPattern, MemoryStatistics, PatternType, MAX_WINDOW_DAYS};
use spiral_core::{MemoryFilter, MemoryRecord, MemoryStore, MemoryType};
use std::sync::Arc;
use tracing::error;

use super::handlers::ErrorResponse;
use crate::state::AppState;

/// Maximum allowed limit for memory queries
const MAX_LIMIT: i64 = 1000;

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Query parameters for listing memories
#[derive(Debug, Default, Deserialize)]
pub struct ListMemoryParams {
    pub memory_type: Option<String>,
    pub decision: Option<String>,
    pub min_importance: Option<f64>,
    pub limit: Option<i64>,
    pub recent_days: Option<u32>,
}

impl ListMemoryParams {
    fn to_filter(&self) -> Result<MemoryFilter, String> {
        let mut filter = MemoryFilter::new();
        if let Some(memory_type) = &self.memory_type {
            filter = filter.with_memory_type(memory_type.parse::<MemoryType>()?);
        }
        if let Some(decision) = &self.decision {
            filter = filter.with_decision(decision.clone());
        }
        if let Some(min_importance) = self.min_importance {
            filter = filter.with_min_importance(min_importance);
        }
        if let Some(limit) = self.limit {
            filter = filter.with_limit(limit.clamp(1, MAX_LIMIT));
        }
        if let Some(days) = self.recent_days {
            if days > MAX_WINDOW_DAYS {
                return Err(format!(
                    "recent_days must be <= {}: {}",
                    MAX_WINDOW_DAYS, days
                ));
            }
            filter = filter.with_recent_days(days);
        }
        Ok(filter)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PatternParams {
    pub pattern_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ListMemoryResponse {
    pub records: Vec<MemoryRecord>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct PatternsResponse {
    pub patterns: Vec<MemoryPattern>,
    pub count: usize,
}

fn store(state: &AppState) -> Result<&Arc<dyn MemoryStore>, ApiError> {
    state.memory().ok_or_else(|| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse::new("Memory store is disabled")),
        )
    })
}

fn internal(e: impl std::fmt::Display) -> ApiError {
    error!("Memory store error: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(format!("Memory store error: {}", e))),
    )
}

fn bad_request(message: String) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(message)))
}

/// List memories, most important first.
pub async fn list_memories(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListMemoryParams>,
) -> Result<Json<ListMemoryResponse>, ApiError> {
    let store = store(&state)?;
    let filter = params.to_filter().map_err(bad_request)?;
    let records = store.retrieve(&filter).map_err(internal)?;
    Ok(Json(ListMemoryResponse {
        count: records.len(),
        records,
    }))
}

pub async fn get_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<MemoryStatistics>, ApiError> {
    let store = store(&state)?;
    store.statistics().map(Json).map_err(internal)
}

pub async fn list_patterns(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PatternParams>,
) -> Result<Json<PatternsResponse>, ApiError> {
    let store = store(&state)?;
    let pattern_type = params
        .pattern_type
        .as_deref()
        .map(str::parse::<PatternType>)
        .transpose()
        .map_err(bad_request)?;
    let patterns = store.patterns(pattern_type).map_err(internal)?;
    Ok(Json(PatternsResponse {
        count: patterns.len(),
        patterns,
    }))
}
