pub mod config;
pub mod event;
pub mod memory;
pub mod metrics;
pub mod orchestrator;
pub mod pipeline;
pub mod quantum;
pub mod scoring;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, LogFormat,
    SanitizedConfig,
};
pub use event::{Event, EventContext, RefinementRecord};
pub use memory::{
    MemoryError, MemoryFilter, MemoryRecord, MemoryStore, MemoryType, NewMemory,
    SqliteMemoryStore,
};
pub use orchestrator::{
    Decision, Orchestrator, OrchestratorError, OrchestratorResult, OrchestratorStatistics,
    PipelineConfig,
};
pub use pipeline::{create_event, execute, execute_batch, PipelineError};
pub use quantum::{fibonacci, quantum_score, shannon_entropy, text_complexity, QuantumError};
pub use scoring::{PipelineMode, Score, ScoringModel};
