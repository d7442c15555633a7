//! Memory store for processed events.
//!
//! Records pipeline outcomes with an importance score, and mines recent
//! records for aggregate patterns. Stores are constructed and owned
//! explicitly by whoever needs them.

mod importance;
mod sqlite_store;
mod store;
mod types;

pub use importance::{calculate_importance, decision_weight, memory_id};
pub use sqlite_store::{SqliteMemoryStore, MAX_WINDOW_DAYS};
pub use store::{MemoryError, MemoryStore};
pub use types::{
    AverageScores, MemoryFilter, MemoryPattern, MemoryRecord, MemoryStatistics, MemoryType,
    NewMemory, PatternType,
};
