//! Decision orchestrator.
//!
//! Turns a [`Score`](crate::scoring::Score) into a decision and a route:
//! - **Decision**: `ACCEPT` when both (context-adjusted) thresholds are met,
//!   otherwise `REVISE`
//! - **Routing**: media and leadership content override the configured mode
//! - **Refinement**: `REVISE` results are refined and re-scored until
//!   accepted or the iteration budget forces acceptance

mod config;
mod refine;
mod runner;
mod types;

pub use config::PipelineConfig;
pub use refine::{HistoryRefiner, RefinementStrategy};
pub use runner::{is_leadership_content, Orchestrator, LEADERSHIP_KEYWORDS};
pub use types::{
    Decision, OrchestratorError, OrchestratorMetadata, OrchestratorResult,
    OrchestratorStatistics, Thresholds,
};
