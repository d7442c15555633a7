//! Scoring types: the bounded score pair, processing modes and weights.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Clamp into [0, 1], mapping NaN to 0.
fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

/// Confidence/success pair, each clamped to [0, 1] on construction.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Score {
    pub confidence: f64,
    pub success: f64,
}

impl Score {
    pub fn new(confidence: f64, success: f64) -> Self {
        Self {
            confidence: clamp_unit(confidence),
            success: clamp_unit(success),
        }
    }

    pub fn zero() -> Self {
        Self::default()
    }
}

/// Processing mode: selects the scoring weights and names the route an
/// event was sent down.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineMode {
    /// Prioritizes accuracy and confidence.
    Verification,
    /// Encourages innovation and complexity.
    Creative,
    /// Balances verification and creativity.
    #[default]
    Balanced,
}

impl PipelineMode {
    pub const ALL: [PipelineMode; 3] = [
        PipelineMode::Verification,
        PipelineMode::Creative,
        PipelineMode::Balanced,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineMode::Verification => "VERIFICATION",
            PipelineMode::Creative => "CREATIVE",
            PipelineMode::Balanced => "BALANCED",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            PipelineMode::Verification => "Prioritizes accuracy and confidence",
            PipelineMode::Creative => "Encourages innovation and complexity",
            PipelineMode::Balanced => "Balances verification and creativity",
        }
    }

    /// Parse a mode name, falling back to [`PipelineMode::Balanced`] for
    /// anything unrecognized.
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or(PipelineMode::Balanced)
    }
}

impl fmt::Display for PipelineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown pipeline mode: {0}")]
pub struct ParseModeError(pub String);

impl FromStr for PipelineMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "VERIFICATION" => Ok(PipelineMode::Verification),
            "CREATIVE" => Ok(PipelineMode::Creative),
            "BALANCED" => Ok(PipelineMode::Balanced),
            other => Err(ParseModeError(other.to_string())),
        }
    }
}

/// Per-mode scoring weights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModeWeights {
    pub confidence_boost: f64,
    pub success_penalty: f64,
    pub complexity_weight: f64,
    pub entropy_weight: f64,
}

impl ModeWeights {
    pub fn for_mode(mode: PipelineMode) -> Self {
        match mode {
            PipelineMode::Verification => Self {
                confidence_boost: 0.8,
                success_penalty: 0.2,
                complexity_weight: 0.3,
                entropy_weight: 0.7,
            },
            PipelineMode::Creative => Self {
                confidence_boost: 0.2,
                success_penalty: 0.8,
                complexity_weight: 0.7,
                entropy_weight: 0.3,
            },
            PipelineMode::Balanced => Self {
                confidence_boost: 0.5,
                success_penalty: 0.5,
                complexity_weight: 0.5,
                entropy_weight: 0.5,
            },
        }
    }
}

/// Description of a scoring model's mode, carried in result metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeInfo {
    pub mode: PipelineMode,
    pub weights: ModeWeights,
    pub description: String,
}
