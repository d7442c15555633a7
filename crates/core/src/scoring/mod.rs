//! Text scoring.
//!
//! A [`ScoringModel`] turns text (plus optional context) into a bounded
//! [`Score`], using the weight table of its [`PipelineMode`].

mod model;
mod types;

pub use model::{ScoringModel, CONFIDENCE_PENALTY_KEYWORDS};
pub use types::{ModeInfo, ModeWeights, ParseModeError, PipelineMode, Score};
