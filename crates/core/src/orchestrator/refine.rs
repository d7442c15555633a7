//! Refinement strategies applied between iterations.

use crate::event::{Event, RefinementRecord};

use super::types::OrchestratorResult;

/// Derives the next event to score after a `REVISE`.
///
/// Implementations must not drop existing history entries.
pub trait RefinementStrategy: Send + Sync {
    fn refine(&self, event: &Event, result: &OrchestratorResult) -> Event;
}

/// Appends the rejected iteration to the history and changes nothing else.
#[derive(Debug, Clone, Copy, Default)]
pub struct HistoryRefiner;

impl RefinementStrategy for HistoryRefiner {
    fn refine(&self, event: &Event, result: &OrchestratorResult) -> Event {
        event.with_record(RefinementRecord {
            iteration: result.iteration,
            score: result.score,
            decision: result.decision,
        })
    }
}
