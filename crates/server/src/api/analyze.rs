//! Analysis API handlers.

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use spiral_core::{create_event, execute, EventContext, PipelineMode};
use tracing::{error, info, warn};

use super::handlers::ErrorResponse;
use super::ws::StreamMessage;
use crate::cli::remember;
use crate::state::AppState;

/// Maximum number of items accepted in one batch request
const MAX_BATCH_ITEMS: usize = 1000;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for a single analysis.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisRequest {
    pub text: String,
    /// Pipeline mode name. Unknown names keep the configured mode.
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub context: Option<EventContext>,
}

/// Request body for a batch analysis.
#[derive(Debug, Deserialize)]
pub struct BatchAnalysisRequest {
    pub items: Vec<AnalysisRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub decision: String,
    pub confidence: f64,
    pub success: f64,
    pub iterations: u32,
    pub pipeline_mode: String,
    pub processing_time_ms: f64,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total_items: usize,
    pub average_confidence: f64,
    pub average_success: f64,
    pub total_iterations: u64,
    pub total_processing_time_ms: f64,
}

#[derive(Debug, Serialize)]
pub struct BatchAnalysisResponse {
    pub results: Vec<AnalysisResponse>,
    pub summary: BatchSummary,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

// ============================================================================
// Analysis
// ============================================================================

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Run one request through the pipeline and record it in memory when enabled.
pub fn process_analysis(
    state: &AppState,
    request: &AnalysisRequest,
) -> Result<AnalysisResponse, ApiError> {
    let start = Instant::now();

    if request.text.is_empty() {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse::new("text must not be empty")),
        ));
    }

    let mut config = state.config().clone();
    if let Some(mode) = request.mode.as_deref() {
        match mode.parse::<PipelineMode>() {
            Ok(mode) => config.pipeline.mode = mode,
            Err(e) => warn!("{}, keeping {}", e, config.pipeline.mode),
        }
    }

    let event = create_event(request.text.clone(), request.context.clone());
    let (result, iterations) = execute(&event, &config).map_err(|e| {
        error!("Analysis failed: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(format!("Analysis failed: {}", e))),
        )
    })?;

    if let Some(store) = state.memory() {
        remember(store.as_ref(), &event, &result);
    }

    Ok(AnalysisResponse {
        decision: result.decision.to_string(),
        confidence: result.score.confidence,
        success: result.score.success,
        iterations,
        pipeline_mode: result.pipeline_mode.to_string(),
        processing_time_ms: round_to(start.elapsed().as_secs_f64() * 1000.0, 2),
        timestamp: Utc::now().to_rfc3339(),
    })
}

fn summarize(results: &[AnalysisResponse]) -> BatchSummary {
    let total_items = results.len();
    let (average_confidence, average_success) = if total_items == 0 {
        (0.0, 0.0)
    } else {
        let n = total_items as f64;
        (
            results.iter().map(|r| r.confidence).sum::<f64>() / n,
            results.iter().map(|r| r.success).sum::<f64>() / n,
        )
    };

    BatchSummary {
        total_items,
        average_confidence: round_to(average_confidence, 4),
        average_success: round_to(average_success, 4),
        total_iterations: results.iter().map(|r| u64::from(r.iterations)).sum(),
        total_processing_time_ms: round_to(
            results.iter().map(|r| r.processing_time_ms).sum(),
            2,
        ),
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Analyze a single text.
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalysisRequest>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    info!(
        "Processing analysis request: mode={:?}, text_length={}",
        request.mode,
        request.text.chars().count()
    );

    let response = process_analysis(&state, &request)?;

    info!(
        "Analysis completed: decision={}, confidence={:.3}",
        response.decision, response.confidence
    );

    state
        .ws_broadcaster()
        .broadcast(StreamMessage::analysis(&response));

    Ok(Json(response))
}

/// Analyze several texts and summarize the batch.
pub async fn analyze_batch(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BatchAnalysisRequest>,
) -> Result<Json<BatchAnalysisResponse>, ApiError> {
    if request.items.len() > MAX_BATCH_ITEMS {
        return Err((
            StatusCode::PAYLOAD_TOO_LARGE,
            Json(ErrorResponse::new(format!(
                "batch exceeds {} items",
                MAX_BATCH_ITEMS
            ))),
        ));
    }

    info!("Processing batch analysis: {} items", request.items.len());

    let results = request
        .items
        .iter()
        .map(|item| process_analysis(&state, item))
        .collect::<Result<Vec<_>, _>>()?;
    let summary = summarize(&results);

    info!("Batch analysis completed: {} items processed", results.len());

    state.ws_broadcaster().broadcast(StreamMessage::batch_complete(json!({
        "summary": summary,
        "items_count": results.len(),
    })));

    Ok(Json(BatchAnalysisResponse { results, summary }))
}
