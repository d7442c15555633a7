//! Memory record and pattern types.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::event::EventContext;
use crate::orchestrator::OrchestratorResult;

/// Kind of memory a record represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryType {
    /// A specific processed event.
    #[default]
    Episodic,
    /// Generalized knowledge; storing one triggers pattern analysis.
    Semantic,
    Procedural,
}

impl MemoryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryType::Episodic => "episodic",
            MemoryType::Semantic => "semantic",
            MemoryType::Procedural => "procedural",
        }
    }
}

impl fmt::Display for MemoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemoryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "episodic" => Ok(MemoryType::Episodic),
            "semantic" => Ok(MemoryType::Semantic),
            "procedural" => Ok(MemoryType::Procedural),
            other => Err(format!("Unknown memory type: {}", other)),
        }
    }
}

/// Request to store a memory.
#[derive(Debug, Clone)]
pub struct NewMemory {
    pub content: String,
    /// Decision label. Kept as text so externally produced labels survive.
    pub decision: String,
    pub confidence: f64,
    pub success: f64,
    pub pipeline_mode: String,
    pub context: EventContext,
    pub memory_type: MemoryType,
    pub tags: Vec<String>,
}

impl NewMemory {
    /// Episodic memory of a pipeline result.
    pub fn from_result(
        content: impl Into<String>,
        context: EventContext,
        result: &OrchestratorResult,
    ) -> Self {
        Self {
            content: content.into(),
            decision: result.decision.as_str().to_string(),
            confidence: result.score.confidence,
            success: result.score.success,
            pipeline_mode: result.pipeline_mode.as_str().to_string(),
            context,
            memory_type: MemoryType::Episodic,
            tags: Vec::new(),
        }
    }

    pub fn with_memory_type(mut self, memory_type: MemoryType) -> Self {
        self.memory_type = memory_type;
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }
}

/// A stored memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub id: String,
    pub content: String,
    pub memory_type: MemoryType,
    pub confidence: f64,
    pub success: f64,
    pub decision: String,
    pub pipeline_mode: String,
    pub context: EventContext,
    pub timestamp: DateTime<Utc>,
    pub access_count: i64,
    pub last_accessed: Option<DateTime<Utc>>,
    pub importance: f64,
    pub tags: Vec<String>,
}

/// Filter for retrieving memories.
#[derive(Debug, Clone)]
pub struct MemoryFilter {
    pub memory_type: Option<MemoryType>,
    pub decision: Option<String>,
    pub min_importance: f64,
    /// Maximum number of results.
    pub limit: i64,
    /// Only records from the last N days.
    pub recent_days: Option<u32>,
}

impl Default for MemoryFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryFilter {
    /// Create a new filter with defaults.
    pub fn new() -> Self {
        Self {
            memory_type: None,
            decision: None,
            min_importance: 0.0,
            limit: 100,
            recent_days: None,
        }
    }

    pub fn with_memory_type(mut self, memory_type: MemoryType) -> Self {
        self.memory_type = Some(memory_type);
        self
    }

    pub fn with_decision(mut self, decision: impl Into<String>) -> Self {
        self.decision = Some(decision.into());
        self
    }

    pub fn with_min_importance(mut self, min_importance: f64) -> Self {
        self.min_importance = min_importance;
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_recent_days(mut self, days: u32) -> Self {
        self.recent_days = Some(days);
        self
    }
}

/// Kind of aggregate pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternType {
    /// Averages per (decision, pipeline mode).
    DecisionTrend,
    /// Averages per content-length bucket.
    ComplexityPattern,
}

impl PatternType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternType::DecisionTrend => "decision_trend",
            PatternType::ComplexityPattern => "complexity_pattern",
        }
    }
}

impl fmt::Display for PatternType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PatternType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "decision_trend" => Ok(PatternType::DecisionTrend),
            "complexity_pattern" => Ok(PatternType::ComplexityPattern),
            other => Err(format!("Unknown pattern type: {}", other)),
        }
    }
}

/// An aggregate discovered in recent memories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryPattern {
    pub pattern_type: PatternType,
    /// Group key, e.g. "ACCEPT/BALANCED" or "short".
    pub key: String,
    pub data: Value,
    /// Average confidence of the group.
    pub confidence: f64,
    pub frequency: i64,
    pub last_seen: DateTime<Utc>,
}

/// Average scores across all records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AverageScores {
    pub confidence: f64,
    pub success: f64,
    pub importance: f64,
}

/// Aggregate view of the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryStatistics {
    pub total_records: i64,
    pub memory_counts: BTreeMap<String, i64>,
    pub average_scores: AverageScores,
    pub decision_distribution: BTreeMap<String, i64>,
    pub pattern_counts: BTreeMap<String, i64>,
    /// Records per day (YYYY-MM-DD) over the last 7 days.
    pub recent_activity: BTreeMap<String, i64>,
}
