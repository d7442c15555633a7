//! Memory storage trait and errors.

use thiserror::Error;

use super::types::{MemoryFilter, MemoryPattern, MemoryRecord, MemoryStatistics, NewMemory, PatternType};

/// Error type for memory operations.
#[derive(Debug, Error)]
pub enum MemoryError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// A stored JSON column could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A day window outside the representable date range.
    #[error("Invalid day window: {0}")]
    InvalidWindow(u32),
}

impl From<rusqlite::Error> for MemoryError {
    fn from(e: rusqlite::Error) -> Self {
        MemoryError::Database(e.to_string())
    }
}

impl From<serde_json::Error> for MemoryError {
    fn from(e: serde_json::Error) -> Self {
        MemoryError::Serialization(e.to_string())
    }
}

/// Trait for memory storage backends.
pub trait MemoryStore: Send + Sync {
    /// Store a memory and return its id.
    ///
    /// Storing an id that already exists bumps its access count and keeps
    /// the higher importance instead of inserting.
    fn store(&self, memory: NewMemory) -> Result<String, MemoryError>;

    /// Records matching the filter, most important first. Returned records
    /// count as accessed.
    fn retrieve(&self, filter: &MemoryFilter) -> Result<Vec<MemoryRecord>, MemoryError>;

    /// Stored patterns, highest confidence first.
    fn patterns(&self, pattern_type: Option<PatternType>)
        -> Result<Vec<MemoryPattern>, MemoryError>;

    /// Recompute patterns over recent records. Returns how many were written.
    fn analyze_patterns(&self) -> Result<usize, MemoryError>;

    /// Delete records older than `retention_days` with importance below
    /// `min_importance`. Returns the number deleted.
    fn cleanup(&self, retention_days: u32, min_importance: f64) -> Result<usize, MemoryError>;

    fn statistics(&self) -> Result<MemoryStatistics, MemoryError>;
}
