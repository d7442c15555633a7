//! In-process API tests.
//!
//! These drive the full router (metrics middleware, CORS, handlers) with
//! `oneshot` requests against a temp-file memory store.

mod common;

use axum::http::StatusCode;
use serde_json::json;
use spiral_core::{MemoryFilter, PipelineMode};
use spiral_server::api::StreamKind;

use common::{TestConfig, TestFixture};

const RICH_TEXT: &str =
    "Rich vocabulary drives confidence and entropy rises with sophisticated analysis.";

// =============================================================================
// Info endpoints
// =============================================================================

#[tokio::test]
async fn test_index_is_html() {
    let fixture = TestFixture::new();
    let response = fixture.get("/").await;

    assert_status!(response, StatusCode::OK);
    assert!(response.text.contains("SpiralMind Nexus API"));
    assert!(response.text.contains("/ws/stream"));
}

#[tokio::test]
async fn test_client_page_targets_stream() {
    let fixture = TestFixture::new();
    let response = fixture.get("/client").await;

    assert_status!(response, StatusCode::OK);
    assert!(response.text.contains("<!DOCTYPE html>"));
    assert!(response.text.contains("/ws/stream"));
    assert!(response.text.contains("VERIFICATION"));

    let index = fixture.get("/").await;
    assert!(index.text.contains(r#"href="/client""#));
}

#[tokio::test]
async fn test_health() {
    let fixture = TestFixture::new();
    let response = fixture.get("/health").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["status"], "healthy");
    assert_eq!(response.body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(response.body["config_loaded"], true);
    assert!(response.body["uptime_seconds"].is_u64());
}

#[tokio::test]
async fn test_config_is_sanitized() {
    let fixture = TestFixture::new();
    let response = fixture.get("/config").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["pipeline"]["mode"], "BALANCED");
    assert_eq!(response.body["server"]["port"], 8000);
    assert!(response.body["memory"].get("path").is_none());
}

#[tokio::test]
async fn test_metrics_exposed_after_requests() {
    let fixture = TestFixture::new();
    fixture.get("/health").await;
    fixture.post("/analyze", json!({ "text": "count me" })).await;

    let response = fixture.get("/metrics").await;
    assert_status!(response, StatusCode::OK);
    assert!(response.text.contains("spiral_http_requests_total"));
    assert!(response.text.contains("spiral_decisions_total"));
}

// =============================================================================
// Analysis
// =============================================================================

#[tokio::test]
async fn test_analyze_accepts_rich_text() {
    let fixture = TestFixture::with_config(TestConfig::lenient());
    let response = fixture.post("/analyze", json!({ "text": RICH_TEXT })).await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["decision"], "ACCEPT");
    assert_eq!(response.body["iterations"], 1);
    assert_eq!(response.body["pipeline_mode"], "BALANCED");
    assert!(response.body["confidence"].as_f64().unwrap() <= 1.0);
    assert!(response.body["processing_time_ms"].as_f64().unwrap() >= 0.0);
    assert!(response.body["timestamp"].is_string());
}

#[tokio::test]
async fn test_analyze_mode_override() {
    let fixture = TestFixture::new();
    let response = fixture
        .post("/analyze", json!({ "text": "short", "mode": "CREATIVE" }))
        .await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["pipeline_mode"], "CREATIVE");
}

#[tokio::test]
async fn test_analyze_unknown_mode_keeps_configured() {
    let fixture = TestFixture::new();
    let response = fixture
        .post("/analyze", json!({ "text": "short", "mode": "TURBO" }))
        .await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["pipeline_mode"], PipelineMode::Balanced.as_str());
}

#[tokio::test]
async fn test_analyze_routes_by_context() {
    let fixture = TestFixture::new();

    let response = fixture
        .post(
            "/analyze",
            json!({ "text": "clip", "context": { "media_type": "video" } }),
        )
        .await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["pipeline_mode"], "CREATIVE");

    let response = fixture
        .post(
            "/analyze",
            json!({ "text": "memo", "context": { "text": "Note from the CEO" } }),
        )
        .await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["pipeline_mode"], "VERIFICATION");
}

#[tokio::test]
async fn test_analyze_empty_text_is_unprocessable() {
    let fixture = TestFixture::new();
    let response = fixture.post("/analyze", json!({ "text": "" })).await;

    assert_status!(response, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body["error"].as_str().unwrap().contains("empty"));
}

#[tokio::test]
async fn test_analyze_missing_text_is_rejected() {
    let fixture = TestFixture::new();
    let response = fixture.post("/analyze", json!({ "mode": "BALANCED" })).await;
    assert_status!(response, StatusCode::UNPROCESSABLE_ENTITY);

    let response = fixture.post_raw("/analyze", "{broken").await;
    assert_status!(response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_analyze_broadcasts_result() {
    let fixture = TestFixture::new();
    let mut rx = fixture.broadcaster.subscribe();

    let response = fixture.post("/analyze", json!({ "text": "broadcast me" })).await;
    assert_status!(response, StatusCode::OK);

    let msg = rx.recv().await.unwrap();
    assert_eq!(msg.kind, StreamKind::Analysis);
    assert_eq!(msg.data["decision"], response.body["decision"]);
}

#[tokio::test]
async fn test_batch_summary() {
    let fixture = TestFixture::with_config(TestConfig::lenient());
    let mut rx = fixture.broadcaster.subscribe();

    let response = fixture
        .post(
            "/analyze/batch",
            json!({
                "items": [
                    { "text": RICH_TEXT },
                    { "text": "second item text", "mode": "VERIFICATION" },
                    { "text": "clip", "context": { "media_type": "video" } }
                ]
            }),
        )
        .await;

    assert_status!(response, StatusCode::OK);
    let results = response.body["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[1]["pipeline_mode"], "VERIFICATION");
    assert_eq!(results[2]["pipeline_mode"], "CREATIVE");

    let summary = &response.body["summary"];
    assert_eq!(summary["total_items"], 3);
    let total_iterations: u64 = results
        .iter()
        .map(|r| r["iterations"].as_u64().unwrap())
        .sum();
    assert_eq!(summary["total_iterations"], total_iterations);

    let msg = rx.recv().await.unwrap();
    assert_eq!(msg.kind, StreamKind::BatchComplete);
    assert_eq!(msg.data["items_count"], 3);
}

#[tokio::test]
async fn test_batch_with_empty_item_fails_whole_batch() {
    let fixture = TestFixture::new();
    let response = fixture
        .post(
            "/analyze/batch",
            json!({ "items": [ { "text": "fine" }, { "text": "" } ] }),
        )
        .await;

    assert_status!(response, StatusCode::UNPROCESSABLE_ENTITY);
}

// =============================================================================
// Memory
// =============================================================================

#[tokio::test]
async fn test_analysis_is_recorded_in_memory() {
    let fixture = TestFixture::with_config(TestConfig::lenient());
    fixture.post("/analyze", json!({ "text": RICH_TEXT })).await;
    fixture
        .post(
            "/analyze",
            json!({ "text": "clip", "context": { "media_type": "video" } }),
        )
        .await;

    let store = fixture.memory.as_ref().unwrap();
    assert_eq!(store.retrieve(&MemoryFilter::new()).unwrap().len(), 2);

    let response = fixture.get("/memory").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["count"], 2);

    let response = fixture.get("/memory?decision=ACCEPT&limit=1").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["count"], 1);
    assert_eq!(response.body["records"][0]["decision"], "ACCEPT");

    let response = fixture.get("/memory?memory_type=semantic").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["count"], 0);
}

#[tokio::test]
async fn test_memory_stats() {
    let fixture = TestFixture::with_config(TestConfig::lenient());
    fixture.post("/analyze", json!({ "text": RICH_TEXT })).await;

    let response = fixture.get("/memory/stats").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["total_records"], 1);
    assert_eq!(response.body["memory_counts"]["episodic"], 1);
    assert_eq!(response.body["decision_distribution"]["ACCEPT"], 1);
}

#[tokio::test]
async fn test_memory_patterns() {
    let fixture = TestFixture::new();

    let response = fixture.get("/memory/patterns").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["count"], 0);

    let response = fixture
        .get("/memory/patterns?pattern_type=decision_trend")
        .await;
    assert_status!(response, StatusCode::OK);

    let response = fixture.get("/memory/patterns?pattern_type=weather").await;
    assert_status!(response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_memory_bad_filter() {
    let fixture = TestFixture::new();
    let response = fixture.get("/memory?memory_type=dreams").await;
    assert_status!(response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_memory_oversized_recent_days() {
    let fixture = TestFixture::with_config(TestConfig::lenient());
    fixture.post("/analyze", json!({ "text": RICH_TEXT })).await;

    let response = fixture.get("/memory?recent_days=4294967295").await;
    assert_status!(response, StatusCode::BAD_REQUEST);

    // store still answers afterwards
    let response = fixture.get("/memory/stats").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["total_records"], 1);

    let response = fixture.get("/memory?recent_days=7").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["count"], 1);
}

#[tokio::test]
async fn test_memory_disabled() {
    let fixture = TestFixture::with_config(TestConfig::without_memory());

    let response = fixture.get("/memory").await;
    assert_status!(response, StatusCode::SERVICE_UNAVAILABLE);

    // analysis still works without a store
    let response = fixture.post("/analyze", json!({ "text": "no memory" })).await;
    assert_status!(response, StatusCode::OK);
}
