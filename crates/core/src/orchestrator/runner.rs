//! Decision orchestrator implementation.
//!
//! Scores an event, applies context-adjusted thresholds, picks a route and,
//! in [`Orchestrator::process_iteratively`], drives the bounded refinement
//! loop.

use std::sync::{Mutex, PoisonError};

use tracing::{debug, info, warn};

use crate::event::{Event, EventContext};
use crate::metrics;
use crate::quantum::FibonacciIndex;
use crate::scoring::{PipelineMode, Score, ScoringModel};

use super::config::PipelineConfig;
use super::refine::{HistoryRefiner, RefinementStrategy};
use super::types::{
    Decision, OrchestratorError, OrchestratorMetadata, OrchestratorResult,
    OrchestratorStatistics, StatsCounters, Thresholds,
};

/// Free-text keywords that mark leadership content.
pub const LEADERSHIP_KEYWORDS: [&str; 5] = ["ceo", "leader", "executive", "manager", "director"];

/// Threshold scale for x_platform content (both checks).
const X_PLATFORM_THRESHOLD_SCALE: f64 = 0.8;

/// Confidence threshold scale for leadership content.
const LEADERSHIP_CONFIDENCE_SCALE: f64 = 1.2;

/// The decision orchestrator.
///
/// Configuration is fixed at construction. Statistics live behind a mutex,
/// so a shared instance can be used from several threads.
pub struct Orchestrator {
    config: PipelineConfig,
    scorer: ScoringModel,
    refiner: Box<dyn RefinementStrategy>,
    stats: Mutex<StatsCounters>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("config", &self.config)
            .field("scorer", &self.scorer)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Create an orchestrator. Fails when `max_iterations` is zero.
    pub fn new(config: PipelineConfig) -> Result<Self, OrchestratorError> {
        if config.max_iterations == 0 {
            return Err(OrchestratorError::InvalidConfig(
                "max_iterations must be > 0".to_string(),
            ));
        }

        Ok(Self {
            scorer: ScoringModel::new(config.mode),
            config,
            refiner: Box::new(HistoryRefiner),
            stats: Mutex::new(StatsCounters::new()),
        })
    }

    /// Replace the refinement strategy.
    pub fn with_refiner(mut self, refiner: impl RefinementStrategy + 'static) -> Self {
        self.refiner = Box::new(refiner);
        self
    }

    /// Use a different Fibonacci position in the scoring model.
    pub fn with_fibonacci_n(mut self, n: FibonacciIndex) -> Self {
        self.scorer = self.scorer.with_fibonacci_n(n);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Single pass: score, decide, route. Always reports iteration 1.
    pub fn run(&self, event: &Event) -> OrchestratorResult {
        let context = &event.context;
        let score = self.scorer.score_text(&event.text, Some(context));

        let decision = self.make_decision(&score, context);
        let pipeline_mode = self.select_mode(&score, context);

        self.record_decision(decision);
        metrics::DECISIONS_TOTAL
            .with_label_values(&[decision.as_str()])
            .inc();
        metrics::PIPELINE_MODE_TOTAL
            .with_label_values(&[pipeline_mode.as_str()])
            .inc();

        info!(
            "Orchestrator decision: {} (mode: {}, confidence: {:.3}, success: {:.3})",
            decision, pipeline_mode, score.confidence, score.success
        );

        OrchestratorResult {
            score,
            decision,
            pipeline_mode,
            iteration: 1,
            metadata: OrchestratorMetadata {
                original_mode: self.config.mode,
                context_applied: !context.is_empty(),
                thresholds: Thresholds {
                    confidence: self.config.confidence_threshold,
                    success: self.config.success_threshold,
                },
                scoring: self.scorer.mode_info(),
            },
        }
    }

    /// Run until accepted, or force acceptance once the iteration budget
    /// is spent.
    ///
    /// A forced acceptance keeps the last iteration's score and mode.
    pub fn process_iteratively(&self, event: &Event) -> OrchestratorResult {
        let mut current = event.clone();
        let mut iteration = 1;

        loop {
            let mut result = self.run(&current);
            result.iteration = iteration;

            if result.decision == Decision::Accept {
                self.observe_final(&result);
                return result;
            }

            if iteration >= self.config.max_iterations {
                self.lock_stats().forced_accepted += 1;
                metrics::FORCED_ACCEPTANCES.inc();
                result.decision = Decision::ForceAccept;

                warn!("Forced acceptance after {} iterations", iteration);
                self.observe_final(&result);
                return result;
            }

            debug!(iteration, "Refining event after REVISE");
            current = self.refiner.refine(&current, &result);
            iteration += 1;
        }
    }

    /// Snapshot of the running statistics.
    pub fn statistics(&self) -> OrchestratorStatistics {
        self.lock_stats().snapshot()
    }

    /// Zero every counter. Configuration is untouched.
    pub fn reset_statistics(&self) {
        *self.lock_stats() = StatsCounters::new();
    }

    /// Thresholds after context adjustments.
    ///
    /// The x_platform and leadership adjustments compound when both apply.
    pub fn effective_thresholds(&self, context: &EventContext) -> Thresholds {
        let mut confidence = self.config.confidence_threshold;
        let mut success = self.config.success_threshold;

        if context.is_x_platform() {
            confidence *= X_PLATFORM_THRESHOLD_SCALE;
            success *= X_PLATFORM_THRESHOLD_SCALE;
        }
        if is_leadership_content(context) {
            confidence *= LEADERSHIP_CONFIDENCE_SCALE;
        }

        Thresholds {
            confidence,
            success,
        }
    }

    fn make_decision(&self, score: &Score, context: &EventContext) -> Decision {
        let thresholds = self.effective_thresholds(context);
        let confidence_ok = score.confidence >= thresholds.confidence;
        let success_ok = score.success >= thresholds.success;

        if confidence_ok && success_ok {
            Decision::Accept
        } else {
            Decision::Revise
        }
    }

    /// First matching rule wins.
    fn select_mode(&self, score: &Score, context: &EventContext) -> PipelineMode {
        if matches!(context.media_type(), Some("video" | "image")) {
            PipelineMode::Creative
        } else if is_leadership_content(context) || score.confidence < 0.5 {
            PipelineMode::Verification
        } else if score.success > 0.8 && context.mentions_any(&["creative"]) {
            PipelineMode::Creative
        } else {
            self.config.mode
        }
    }

    fn record_decision(&self, decision: Decision) {
        let mut stats = self.lock_stats();
        stats.total_decisions += 1;
        match decision {
            Decision::Accept => stats.accepted += 1,
            Decision::Revise | Decision::ForceAccept => stats.revised += 1,
        }
        *stats.mode_usage.entry(self.config.mode).or_insert(0) += 1;
    }

    fn observe_final(&self, result: &OrchestratorResult) {
        metrics::PIPELINE_ITERATIONS.observe(f64::from(result.iteration));
        metrics::SCORE_CONFIDENCE.observe(result.score.confidence);
        metrics::SCORE_SUCCESS.observe(result.score.success);
    }

    fn lock_stats(&self) -> std::sync::MutexGuard<'_, StatsCounters> {
        self.stats.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// True when the context free text mentions a leadership role.
pub fn is_leadership_content(context: &EventContext) -> bool {
    context.mentions_any(&LEADERSHIP_KEYWORDS)
}
