//! Pipeline entry points used by the CLI and the API.

use thiserror::Error;
use tracing::info;

use crate::config::Config;
use crate::event::{Event, EventContext};
use crate::orchestrator::{Orchestrator, OrchestratorError, OrchestratorResult};
use crate::quantum::{FibonacciIndex, QuantumError};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Orchestrator(#[from] OrchestratorError),

    #[error(transparent)]
    Quantum(#[from] QuantumError),
}

/// Build an event with an optional context.
pub fn create_event(text: impl Into<String>, context: Option<EventContext>) -> Event {
    Event::new(text, context.unwrap_or_default())
}

/// Run one event through a fresh orchestrator's refinement loop.
///
/// Returns the final result and the number of iterations it took.
pub fn execute(event: &Event, config: &Config) -> Result<(OrchestratorResult, u32), PipelineError> {
    let fibonacci_n = FibonacciIndex::try_from(config.quantum.fibonacci_n)?;
    let orchestrator = Orchestrator::new(config.pipeline.clone())?.with_fibonacci_n(fibonacci_n);

    info!("Starting pipeline execution (mode: {})", config.pipeline.mode);

    let result = orchestrator.process_iteratively(event);

    info!(
        "Pipeline completed: {} after {} iterations",
        result.decision, result.iteration
    );

    let iterations = result.iteration;
    Ok((result, iterations))
}

/// [`execute`] each event in order.
pub fn execute_batch(
    events: &[Event],
    config: &Config,
) -> Result<Vec<(OrchestratorResult, u32)>, PipelineError> {
    let total = events.len();
    events
        .iter()
        .enumerate()
        .map(|(i, event)| {
            info!("Processing event {}/{}", i + 1, total);
            execute(event, config)
        })
        .collect()
}
