//! Orchestrator configuration.

use serde::{Deserialize, Serialize};

use crate::scoring::PipelineMode;

/// Settings for one orchestrator: the `[pipeline]` config section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Scoring mode. Also the fallback route when no override rule matches.
    #[serde(default)]
    pub mode: PipelineMode,

    /// Maximum refinement iterations before a forced acceptance.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Minimum confidence for acceptance (0.0-1.0).
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,

    /// Minimum success for acceptance (0.0-1.0).
    #[serde(default = "default_success_threshold")]
    pub success_threshold: f64,
}

fn default_max_iterations() -> u32 {
    100
}

fn default_confidence_threshold() -> f64 {
    0.75
}

fn default_success_threshold() -> f64 {
    0.85
}

impl PipelineConfig {
    pub fn with_mode(mut self, mode: PipelineMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_thresholds(mut self, confidence: f64, success: f64) -> Self {
        self.confidence_threshold = confidence;
        self.success_threshold = success;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            mode: PipelineMode::default(),
            max_iterations: default_max_iterations(),
            confidence_threshold: default_confidence_threshold(),
            success_threshold: default_success_threshold(),
        }
    }
}
