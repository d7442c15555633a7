//! Types for the decision orchestrator.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scoring::{ModeInfo, PipelineMode, Score};

/// Errors that can occur when building an orchestrator.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Rejected configuration value.
    #[error("invalid orchestrator config: {0}")]
    InvalidConfig(String),
}

/// Outcome of one orchestration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    /// Both thresholds met.
    Accept,
    /// At least one threshold missed.
    Revise,
    /// Iteration budget exhausted without an acceptance.
    ForceAccept,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Accept => "ACCEPT",
            Decision::Revise => "REVISE",
            Decision::ForceAccept => "FORCE_ACCEPT",
        }
    }

    /// True for the two states that end the refinement loop.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Decision::Revise)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configured thresholds, as recorded in result metadata.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub confidence: f64,
    pub success: f64,
}

/// Bookkeeping attached to every result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestratorMetadata {
    /// Mode the orchestrator was configured with.
    pub original_mode: PipelineMode,
    /// Whether the event carried a non-empty context.
    pub context_applied: bool,
    /// Configured (unadjusted) thresholds.
    pub thresholds: Thresholds,
    /// The scoring model used.
    pub scoring: ModeInfo,
}

/// Result of one orchestration pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestratorResult {
    pub score: Score,
    pub decision: Decision,
    /// Route chosen for this event.
    pub pipeline_mode: PipelineMode,
    /// 1-based iteration that produced this result.
    pub iteration: u32,
    pub metadata: OrchestratorMetadata,
}

/// Running decision counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct StatsCounters {
    pub total_decisions: u64,
    pub accepted: u64,
    pub revised: u64,
    pub forced_accepted: u64,
    pub mode_usage: BTreeMap<PipelineMode, u64>,
}

impl StatsCounters {
    pub fn new() -> Self {
        Self {
            mode_usage: PipelineMode::ALL.iter().map(|m| (*m, 0)).collect(),
            ..Default::default()
        }
    }

    pub fn snapshot(&self) -> OrchestratorStatistics {
        let rate = |count: u64| {
            (self.total_decisions > 0).then(|| count as f64 / self.total_decisions as f64)
        };

        OrchestratorStatistics {
            total_decisions: self.total_decisions,
            accepted: self.accepted,
            revised: self.revised,
            forced_accepted: self.forced_accepted,
            mode_usage: self.mode_usage.clone(),
            acceptance_rate: rate(self.accepted),
            revision_rate: rate(self.revised),
            forced_acceptance_rate: rate(self.forced_accepted),
        }
    }
}

/// Point-in-time copy of an orchestrator's statistics.
///
/// Rates are `None` until at least one decision has been made.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestratorStatistics {
    pub total_decisions: u64,
    pub accepted: u64,
    pub revised: u64,
    pub forced_accepted: u64,
    /// Decisions per configured mode.
    pub mode_usage: BTreeMap<PipelineMode, u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acceptance_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forced_acceptance_rate: Option<f64>,
}
