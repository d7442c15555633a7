//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Orchestrator (decisions, routing, forced acceptances)
//! - Pipeline (iterations per execution, score distributions)
//! - Memory store (records written)

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Orchestrator
// =============================================================================

/// Decisions total by outcome.
pub static DECISIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("spiral_decisions_total", "Total orchestrator decisions"),
        &["decision"], // "ACCEPT", "REVISE", "FORCE_ACCEPT"
    )
    .unwrap()
});

/// Routing choices by selected pipeline mode.
pub static PIPELINE_MODE_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "spiral_pipeline_mode_total",
            "Events routed to each pipeline mode",
        ),
        &["mode"],
    )
    .unwrap()
});

/// Forced acceptances total.
pub static FORCED_ACCEPTANCES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "spiral_forced_acceptances_total",
        "Refinement loops that exhausted their iteration budget",
    )
    .unwrap()
});

// =============================================================================
// Pipeline
// =============================================================================

/// Iterations used per refinement loop.
pub static PIPELINE_ITERATIONS: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "spiral_pipeline_iterations",
            "Iterations used per refinement loop",
        )
        .buckets(vec![1.0, 2.0, 3.0, 5.0, 10.0, 25.0, 50.0, 100.0]),
    )
    .unwrap()
});

/// Confidence scores of final results.
pub static SCORE_CONFIDENCE: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new("spiral_score_confidence", "Distribution of confidence scores")
            .buckets(vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9, 0.95, 1.0]),
    )
    .unwrap()
});

/// Success scores of final results.
pub static SCORE_SUCCESS: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new("spiral_score_success", "Distribution of success scores")
            .buckets(vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9, 0.95, 1.0]),
    )
    .unwrap()
});

// =============================================================================
// Memory
// =============================================================================

/// Memory records written (new or merged).
pub static MEMORY_RECORDS_STORED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "spiral_memory_records_stored_total",
        "Total memory records stored",
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Orchestrator
        Box::new(DECISIONS_TOTAL.clone()),
        Box::new(PIPELINE_MODE_TOTAL.clone()),
        Box::new(FORCED_ACCEPTANCES.clone()),
        // Pipeline
        Box::new(PIPELINE_ITERATIONS.clone()),
        Box::new(SCORE_CONFIDENCE.clone()),
        Box::new(SCORE_SUCCESS.clone()),
        // Memory
        Box::new(MEMORY_RECORDS_STORED.clone()),
    ]
}
