//! SQLite-backed memory store implementation.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rusqlite::{params, Connection};
use serde_json::json;
use tracing::{debug, info};

use crate::metrics;

use super::importance::{calculate_importance, memory_id};
use super::store::{MemoryError, MemoryStore};
use super::types::{
    AverageScores, MemoryFilter, MemoryPattern, MemoryRecord, MemoryStatistics, MemoryType,
    NewMemory, PatternType,
};

/// Window used by pattern analysis and recent activity.
const PATTERN_WINDOW_DAYS: i64 = 7;

/// Largest day window accepted by retrieval filters and cleanup.
pub const MAX_WINDOW_DAYS: u32 = 36_500;

/// Minimum group size for a decision trend.
const DECISION_TREND_MIN_FREQUENCY: i64 = 3;

/// Minimum group size for a complexity pattern.
const COMPLEXITY_MIN_FREQUENCY: i64 = 5;

const RECORD_COLUMNS: &str = "id, content, memory_type, confidence, success, decision, \
     pipeline_mode, context, timestamp, access_count, last_accessed, importance, tags";

/// Timestamps are stored as fixed-width UTC RFC 3339 so they sort as text.
fn format_ts(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Timestamp `days` before now, or `InvalidWindow` when out of range.
fn cutoff_days_ago(days: u32) -> Result<String, MemoryError> {
    if days > MAX_WINDOW_DAYS {
        return Err(MemoryError::InvalidWindow(days));
    }
    Duration::try_days(i64::from(days))
        .and_then(|window| Utc::now().checked_sub_signed(window))
        .map(format_ts)
        .ok_or(MemoryError::InvalidWindow(days))
}

fn parse_ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// SQLite-backed memory store.
pub struct SqliteMemoryStore {
    conn: Mutex<Connection>,
}

impl SqliteMemoryStore {
    /// Open (or create) a memory database at `path`.
    pub fn new(path: &Path) -> Result<Self, MemoryError> {
        let conn = Connection::open(path)?;
        Self::initialize_schema(&conn)?;
        info!("Memory store initialized: {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, MemoryError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), MemoryError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS memory_records (
                id TEXT PRIMARY KEY,
                content TEXT NOT NULL,
                memory_type TEXT NOT NULL,
                confidence REAL NOT NULL,
                success REAL NOT NULL,
                decision TEXT NOT NULL,
                pipeline_mode TEXT NOT NULL,
                context TEXT,
                timestamp TEXT NOT NULL,
                access_count INTEGER NOT NULL DEFAULT 0,
                last_accessed TEXT,
                importance REAL NOT NULL DEFAULT 0.0,
                tags TEXT
            );

            CREATE TABLE IF NOT EXISTS memory_patterns (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                pattern_type TEXT NOT NULL,
                pattern_key TEXT NOT NULL,
                pattern_data TEXT NOT NULL,
                confidence REAL NOT NULL,
                frequency INTEGER NOT NULL,
                last_seen TEXT NOT NULL,
                UNIQUE (pattern_type, pattern_key)
            );

            CREATE INDEX IF NOT EXISTS idx_memory_type ON memory_records(memory_type);
            CREATE INDEX IF NOT EXISTS idx_timestamp ON memory_records(timestamp);
            CREATE INDEX IF NOT EXISTS idx_importance ON memory_records(importance);
            CREATE INDEX IF NOT EXISTS idx_decision ON memory_records(decision);
            CREATE INDEX IF NOT EXISTS idx_pattern_type ON memory_patterns(pattern_type);
            "#,
        )?;
        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, MemoryError> {
        self.conn
            .lock()
            .map_err(|_| MemoryError::Database("connection lock poisoned".to_string()))
    }

    /// Store a memory as if it had been recorded at `timestamp`.
    pub fn store_at(
        &self,
        memory: NewMemory,
        timestamp: DateTime<Utc>,
    ) -> Result<String, MemoryError> {
        let id = memory_id(&memory.content, &memory.context);
        let importance = calculate_importance(
            memory.confidence,
            memory.success,
            &memory.decision,
            &memory.content,
        );
        let memory_type = memory.memory_type;

        {
            let conn = self.conn()?;
            let ts = format_ts(timestamp);

            let updated = conn.execute(
                "UPDATE memory_records
                 SET access_count = access_count + 1,
                     last_accessed = ?1,
                     importance = MAX(importance, ?2)
                 WHERE id = ?3",
                params![ts, importance, id],
            )?;

            if updated > 0 {
                debug!("Updated existing memory: {}", id);
            } else {
                let context_json = serde_json::to_string(&memory.context)?;
                let tags_json = serde_json::to_string(&memory.tags)?;
                conn.execute(
                    &format!(
                        "INSERT INTO memory_records ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 0, NULL, ?10, ?11)",
                        RECORD_COLUMNS
                    ),
                    params![
                        id,
                        memory.content,
                        memory_type.as_str(),
                        memory.confidence,
                        memory.success,
                        memory.decision,
                        memory.pipeline_mode,
                        context_json,
                        ts,
                        importance,
                        tags_json,
                    ],
                )?;
                debug!("Stored new memory: {}", id);
            }
        }

        metrics::MEMORY_RECORDS_STORED.inc();

        if memory_type == MemoryType::Semantic {
            self.analyze_patterns()?;
        }

        Ok(id)
    }

    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<(MemoryRecord, String, String)> {
        let memory_type: String = row.get(2)?;
        let context_json: Option<String> = row.get(7)?;
        let timestamp: String = row.get(8)?;
        let last_accessed: Option<String> = row.get(10)?;
        let tags_json: Option<String> = row.get(12)?;

        let record = MemoryRecord {
            id: row.get(0)?,
            content: row.get(1)?,
            memory_type: memory_type.parse().unwrap_or_default(),
            confidence: row.get(3)?,
            success: row.get(4)?,
            decision: row.get(5)?,
            pipeline_mode: row.get(6)?,
            context: Default::default(),
            timestamp: parse_ts(&timestamp),
            access_count: row.get(9)?,
            last_accessed: last_accessed.as_deref().map(parse_ts),
            importance: row.get(11)?,
            tags: Vec::new(),
        };

        Ok((
            record,
            context_json.unwrap_or_else(|| "{}".to_string()),
            tags_json.unwrap_or_else(|| "[]".to_string()),
        ))
    }

    fn upsert_pattern(
        conn: &Connection,
        pattern_type: PatternType,
        key: &str,
        data: &serde_json::Value,
        confidence: f64,
        frequency: i64,
        now: &str,
    ) -> Result<(), MemoryError> {
        conn.execute(
            "INSERT INTO memory_patterns
                 (pattern_type, pattern_key, pattern_data, confidence, frequency, last_seen)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT (pattern_type, pattern_key) DO UPDATE SET
                 pattern_data = excluded.pattern_data,
                 confidence = excluded.confidence,
                 frequency = excluded.frequency,
                 last_seen = excluded.last_seen",
            params![
                pattern_type.as_str(),
                key,
                data.to_string(),
                confidence,
                frequency,
                now
            ],
        )?;
        debug!("Stored pattern: {} ({})", pattern_type, key);
        Ok(())
    }

    fn count_by(
        conn: &Connection,
        sql: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> Result<BTreeMap<String, i64>, MemoryError> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params, |row| Ok((row.get(0)?, row.get(1)?)))?;
        rows.collect::<Result<BTreeMap<String, i64>, _>>()
            .map_err(MemoryError::from)
    }
}

impl MemoryStore for SqliteMemoryStore {
    fn store(&self, memory: NewMemory) -> Result<String, MemoryError> {
        self.store_at(memory, Utc::now())
    }

    fn retrieve(&self, filter: &MemoryFilter) -> Result<Vec<MemoryRecord>, MemoryError> {
        let cutoff = filter.recent_days.map(cutoff_days_ago).transpose()?;
        let conn = self.conn()?;

        let mut conditions = vec!["importance >= ?"];
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(filter.min_importance)];

        if let Some(memory_type) = filter.memory_type {
            conditions.push("memory_type = ?");
            params.push(Box::new(memory_type.as_str()));
        }
        if let Some(ref decision) = filter.decision {
            conditions.push("decision = ?");
            params.push(Box::new(decision.clone()));
        }
        if let Some(cutoff) = cutoff {
            conditions.push("timestamp >= ?");
            params.push(Box::new(cutoff));
        }
        params.push(Box::new(filter.limit));

        let sql = format!(
            "SELECT {} FROM memory_records WHERE {} ORDER BY importance DESC, timestamp DESC LIMIT ?",
            RECORD_COLUMNS,
            conditions.join(" AND ")
        );

        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(param_refs.as_slice(), Self::row_to_record)?;

        let mut records = Vec::new();
        for row in rows {
            let (mut record, context_json, tags_json) = row?;
            record.context = serde_json::from_str(&context_json)?;
            record.tags = serde_json::from_str(&tags_json)?;
            records.push(record);
        }

        if !records.is_empty() {
            let now = format_ts(Utc::now());
            let placeholders = vec!["?"; records.len()].join(",");
            let sql = format!(
                "UPDATE memory_records SET access_count = access_count + 1, last_accessed = ? WHERE id IN ({})",
                placeholders
            );
            let mut update_params: Vec<&dyn rusqlite::ToSql> = vec![&now];
            update_params.extend(records.iter().map(|r| &r.id as &dyn rusqlite::ToSql));
            conn.execute(&sql, update_params.as_slice())?;
        }

        debug!("Retrieved {} memories", records.len());
        Ok(records)
    }

    fn patterns(
        &self,
        pattern_type: Option<PatternType>,
    ) -> Result<Vec<MemoryPattern>, MemoryError> {
        let conn = self.conn()?;

        let base = "SELECT pattern_type, pattern_key, pattern_data, confidence, frequency, last_seen FROM memory_patterns";
        let (sql, filter): (String, Option<&str>) = match pattern_type {
            Some(ty) => (
                format!("{} WHERE pattern_type = ?1 ORDER BY confidence DESC", base),
                Some(ty.as_str()),
            ),
            None => (format!("{} ORDER BY confidence DESC", base), None),
        };

        let mut stmt = conn.prepare(&sql)?;
        type PatternRow = (String, String, String, f64, i64, String);
        let map_row = |row: &rusqlite::Row| -> rusqlite::Result<PatternRow> {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, f64>(3)?,
                row.get::<_, i64>(4)?,
                row.get::<_, String>(5)?,
            ))
        };
        let rows = match filter {
            Some(ty) => stmt.query_map(params![ty], map_row)?,
            None => stmt.query_map([], map_row)?,
        };

        let mut patterns = Vec::new();
        for row in rows {
            let (ty, key, data, confidence, frequency, last_seen) = row?;
            let Ok(pattern_type) = ty.parse::<PatternType>() else {
                continue;
            };
            patterns.push(MemoryPattern {
                pattern_type,
                key,
                data: serde_json::from_str(&data)?,
                confidence,
                frequency,
                last_seen: parse_ts(&last_seen),
            });
        }
        Ok(patterns)
    }

    fn analyze_patterns(&self) -> Result<usize, MemoryError> {
        let conn = self.conn()?;
        let now = Utc::now();
        let cutoff = format_ts(now - Duration::days(PATTERN_WINDOW_DAYS));
        let now = format_ts(now);
        let mut written = 0;

        let mut stmt = conn.prepare(
            "SELECT decision, pipeline_mode, AVG(confidence), AVG(success), COUNT(*) AS frequency
             FROM memory_records
             WHERE timestamp >= ?1
             GROUP BY decision, pipeline_mode
             HAVING frequency >= ?2",
        )?;
        let trends = stmt
            .query_map(params![cutoff, DECISION_TREND_MIN_FREQUENCY], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, f64>(2)?,
                    row.get::<_, f64>(3)?,
                    row.get::<_, i64>(4)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        for (decision, mode, avg_confidence, avg_success, frequency) in trends {
            let data = json!({
                "decision": decision,
                "pipeline_mode": mode,
                "avg_confidence": avg_confidence,
                "avg_success": avg_success,
            });
            let key = format!("{}/{}", decision, mode);
            Self::upsert_pattern(
                &conn,
                PatternType::DecisionTrend,
                &key,
                &data,
                avg_confidence,
                frequency,
                &now,
            )?;
            written += 1;
        }

        let mut stmt = conn.prepare(
            "SELECT CASE
                        WHEN LENGTH(content) < 50 THEN 'short'
                        WHEN LENGTH(content) < 200 THEN 'medium'
                        ELSE 'long'
                    END AS content_length,
                    AVG(confidence), AVG(success), COUNT(*) AS frequency
             FROM memory_records
             WHERE timestamp >= ?1
             GROUP BY content_length
             HAVING frequency >= ?2",
        )?;
        let buckets = stmt
            .query_map(params![cutoff, COMPLEXITY_MIN_FREQUENCY], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, f64>(1)?,
                    row.get::<_, f64>(2)?,
                    row.get::<_, i64>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        for (bucket, avg_confidence, avg_success, frequency) in buckets {
            let data = json!({
                "content_length": bucket,
                "avg_confidence": avg_confidence,
                "avg_success": avg_success,
            });
            Self::upsert_pattern(
                &conn,
                PatternType::ComplexityPattern,
                &bucket,
                &data,
                avg_confidence,
                frequency,
                &now,
            )?;
            written += 1;
        }

        Ok(written)
    }

    fn cleanup(&self, retention_days: u32, min_importance: f64) -> Result<usize, MemoryError> {
        let cutoff = cutoff_days_ago(retention_days)?;
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM memory_records WHERE timestamp < ?1 AND importance < ?2",
            params![cutoff, min_importance],
        )?;
        info!("Cleaned up {} old memories", deleted);
        Ok(deleted)
    }

    fn statistics(&self) -> Result<MemoryStatistics, MemoryError> {
        let conn = self.conn()?;

        let total_records: i64 =
            conn.query_row("SELECT COUNT(*) FROM memory_records", [], |row| row.get(0))?;

        let memory_counts = Self::count_by(
            &conn,
            "SELECT memory_type, COUNT(*) FROM memory_records GROUP BY memory_type",
            &[],
        )?;

        let average_scores = conn.query_row(
            "SELECT AVG(confidence), AVG(success), AVG(importance) FROM memory_records",
            [],
            |row| {
                Ok(AverageScores {
                    confidence: row.get::<_, Option<f64>>(0)?.unwrap_or(0.0),
                    success: row.get::<_, Option<f64>>(1)?.unwrap_or(0.0),
                    importance: row.get::<_, Option<f64>>(2)?.unwrap_or(0.0),
                })
            },
        )?;

        let decision_distribution = Self::count_by(
            &conn,
            "SELECT decision, COUNT(*) FROM memory_records GROUP BY decision",
            &[],
        )?;

        let pattern_counts = Self::count_by(
            &conn,
            "SELECT pattern_type, COUNT(*) FROM memory_patterns GROUP BY pattern_type",
            &[],
        )?;

        let cutoff = format_ts(Utc::now() - Duration::days(PATTERN_WINDOW_DAYS));
        let recent_activity = Self::count_by(
            &conn,
            "SELECT substr(timestamp, 1, 10) AS day, COUNT(*) FROM memory_records
             WHERE timestamp >= ?1 GROUP BY day ORDER BY day",
            &[&cutoff],
        )?;

        Ok(MemoryStatistics {
            total_records,
            memory_counts,
            average_scores,
            decision_distribution,
            pattern_counts,
            recent_activity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventContext;

    fn memory(content: &str, decision: &str, confidence: f64) -> NewMemory {
        NewMemory {
            content: content.to_string(),
            decision: decision.to_string(),
            confidence,
            success: 0.5,
            pipeline_mode: "BALANCED".to_string(),
            context: EventContext::new(),
            memory_type: MemoryType::Episodic,
            tags: Vec::new(),
        }
    }

    #[test]
    fn test_store_and_retrieve() {
        let store = SqliteMemoryStore::in_memory().unwrap();
        let id = store
            .store(memory("hello world", "ACCEPT", 0.7).with_tags(vec!["greeting".into()]))
            .unwrap();

        let records = store.retrieve(&MemoryFilter::new()).unwrap();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.id, id);
        assert_eq!(record.content, "hello world");
        assert_eq!(record.memory_type, MemoryType::Episodic);
        assert_eq!(record.decision, "ACCEPT");
        assert_eq!(record.tags, vec!["greeting".to_string()]);
        assert_eq!(record.access_count, 0);
        assert!((record.importance - calculate_importance(0.7, 0.5, "ACCEPT", "hello world")).abs() < 1e-12);
    }

    #[test]
    fn test_retrieve_bumps_access_count() {
        let store = SqliteMemoryStore::in_memory().unwrap();
        store.store(memory("a", "ACCEPT", 0.5)).unwrap();

        store.retrieve(&MemoryFilter::new()).unwrap();
        let records = store.retrieve(&MemoryFilter::new()).unwrap();
        assert_eq!(records[0].access_count, 1);
        assert!(records[0].last_accessed.is_some());
    }

    #[test]
    fn test_duplicate_store_merges() {
        let store = SqliteMemoryStore::in_memory().unwrap();
        let first = store.store(memory("same", "REVISE", 0.2)).unwrap();
        let second = store.store(memory("same", "ACCEPT", 0.9)).unwrap();
        assert_eq!(first, second);

        let records = store.retrieve(&MemoryFilter::new()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].access_count, 1);
        // original fields kept, importance raised
        assert_eq!(records[0].decision, "REVISE");
        assert!((records[0].importance - calculate_importance(0.9, 0.5, "ACCEPT", "same")).abs() < 1e-12);
    }

    #[test]
    fn test_retrieve_filters_and_order() {
        let store = SqliteMemoryStore::in_memory().unwrap();
        store.store(memory("low", "REVISE", 0.1)).unwrap();
        store.store(memory("high", "ACCEPT", 0.9)).unwrap();
        store
            .store(memory("semantic", "ACCEPT", 0.5).with_memory_type(MemoryType::Semantic))
            .unwrap();

        let all = store.retrieve(&MemoryFilter::new()).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].content, "high");
        assert!(all.windows(2).all(|w| w[0].importance >= w[1].importance));

        let accepted = store.retrieve(&MemoryFilter::new().with_decision("ACCEPT")).unwrap();
        assert_eq!(accepted.len(), 2);

        let semantic = store
            .retrieve(&MemoryFilter::new().with_memory_type(MemoryType::Semantic))
            .unwrap();
        assert_eq!(semantic.len(), 1);

        let important = store
            .retrieve(&MemoryFilter::new().with_min_importance(0.6))
            .unwrap();
        assert_eq!(important.len(), 1);

        let limited = store.retrieve(&MemoryFilter::new().with_limit(2)).unwrap();
        assert_eq!(limited.len(), 2);
    }

    #[test]
    fn test_recent_days_filter() {
        let store = SqliteMemoryStore::in_memory().unwrap();
        store
            .store_at(memory("old", "ACCEPT", 0.5), Utc::now() - Duration::days(10))
            .unwrap();
        store.store(memory("new", "ACCEPT", 0.5)).unwrap();

        let recent = store.retrieve(&MemoryFilter::new().with_recent_days(3)).unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].content, "new");
    }

    #[test]
    fn test_cleanup_removes_old_unimportant() {
        let store = SqliteMemoryStore::in_memory().unwrap();
        let old = Utc::now() - Duration::days(40);
        store.store_at(memory("old low", "REVISE", 0.0), old).unwrap();
        store.store_at(memory("old high", "ACCEPT", 1.0), old).unwrap();
        store.store(memory("new low", "REVISE", 0.0)).unwrap();

        let deleted = store.cleanup(30, 0.3).unwrap();
        assert_eq!(deleted, 1);

        let remaining: Vec<String> = store
            .retrieve(&MemoryFilter::new())
            .unwrap()
            .into_iter()
            .map(|r| r.content)
            .collect();
        assert_eq!(remaining.len(), 2);
        assert!(!remaining.contains(&"old low".to_string()));
    }

    #[test]
    fn test_oversized_day_window_is_rejected() {
        let store = SqliteMemoryStore::in_memory().unwrap();
        store.store(memory("kept", "ACCEPT", 0.5)).unwrap();

        let err = store
            .retrieve(&MemoryFilter::new().with_recent_days(u32::MAX))
            .unwrap_err();
        assert!(matches!(err, MemoryError::InvalidWindow(u32::MAX)));

        let err = store.cleanup(MAX_WINDOW_DAYS + 1, 0.3).unwrap_err();
        assert!(matches!(err, MemoryError::InvalidWindow(_)));

        // the connection stays usable
        assert_eq!(store.statistics().unwrap().total_records, 1);
        assert_eq!(
            store
                .retrieve(&MemoryFilter::new().with_recent_days(MAX_WINDOW_DAYS))
                .unwrap()
                .len(),
            1
        );
        assert_eq!(store.cleanup(MAX_WINDOW_DAYS, 0.3).unwrap(), 0);
    }

    #[test]
    fn test_pattern_analysis_thresholds() {
        let store = SqliteMemoryStore::in_memory().unwrap();
        for i in 0..3 {
            store.store(memory(&format!("accept {}", i), "ACCEPT", 0.8)).unwrap();
        }
        for i in 0..2 {
            store.store(memory(&format!("revise {}", i), "REVISE", 0.2)).unwrap();
        }

        store.analyze_patterns().unwrap();

        let trends = store.patterns(Some(PatternType::DecisionTrend)).unwrap();
        assert_eq!(trends.len(), 1);
        assert_eq!(trends[0].key, "ACCEPT/BALANCED");
        assert_eq!(trends[0].frequency, 3);
        assert!((trends[0].confidence - 0.8).abs() < 1e-9);
        assert_eq!(trends[0].data["decision"], "ACCEPT");

        // five short records across both decisions
        let complexity = store.patterns(Some(PatternType::ComplexityPattern)).unwrap();
        assert_eq!(complexity.len(), 1);
        assert_eq!(complexity[0].key, "short");
        assert_eq!(complexity[0].frequency, 5);
    }

    #[test]
    fn test_pattern_analysis_replaces_existing() {
        let store = SqliteMemoryStore::in_memory().unwrap();
        for i in 0..3 {
            store.store(memory(&format!("a{}", i), "ACCEPT", 0.6)).unwrap();
        }
        store.analyze_patterns().unwrap();
        store.store(memory("a3", "ACCEPT", 0.6)).unwrap();
        store.analyze_patterns().unwrap();

        let trends = store.patterns(None).unwrap();
        let accept: Vec<_> = trends
            .iter()
            .filter(|p| p.pattern_type == PatternType::DecisionTrend)
            .collect();
        assert_eq!(accept.len(), 1);
        assert_eq!(accept[0].frequency, 4);
    }

    #[test]
    fn test_semantic_store_triggers_analysis() {
        let store = SqliteMemoryStore::in_memory().unwrap();
        for i in 0..2 {
            store.store(memory(&format!("e{}", i), "ACCEPT", 0.6)).unwrap();
        }
        assert!(store.patterns(None).unwrap().is_empty());

        store
            .store(memory("s", "ACCEPT", 0.6).with_memory_type(MemoryType::Semantic))
            .unwrap();
        assert_eq!(store.patterns(Some(PatternType::DecisionTrend)).unwrap().len(), 1);
    }

    #[test]
    fn test_old_records_ignored_by_analysis() {
        let store = SqliteMemoryStore::in_memory().unwrap();
        let old = Utc::now() - Duration::days(8);
        for i in 0..3 {
            store
                .store_at(memory(&format!("o{}", i), "ACCEPT", 0.6), old)
                .unwrap();
        }
        assert_eq!(store.analyze_patterns().unwrap(), 0);
    }

    #[test]
    fn test_statistics() {
        let store = SqliteMemoryStore::in_memory().unwrap();
        assert_eq!(store.statistics().unwrap(), MemoryStatistics::default());

        store.store(memory("one", "ACCEPT", 0.4)).unwrap();
        store.store(memory("two", "REVISE", 0.6)).unwrap();
        store
            .store(memory("three", "ACCEPT", 0.8).with_memory_type(MemoryType::Procedural))
            .unwrap();

        let stats = store.statistics().unwrap();
        assert_eq!(stats.total_records, 3);
        assert_eq!(stats.memory_counts["episodic"], 2);
        assert_eq!(stats.memory_counts["procedural"], 1);
        assert_eq!(stats.decision_distribution["ACCEPT"], 2);
        assert_eq!(stats.decision_distribution["REVISE"], 1);
        assert!((stats.average_scores.confidence - 0.6).abs() < 1e-9);
        assert!((stats.average_scores.success - 0.5).abs() < 1e-9);
        assert_eq!(stats.recent_activity.values().sum::<i64>(), 3);
        let today = Utc::now().format("%Y-%m-%d").to_string();
        assert!(stats.recent_activity.contains_key(&today));
    }

    #[test]
    fn test_context_round_trip() {
        let store = SqliteMemoryStore::in_memory().unwrap();
        let mut m = memory("ctx", "ACCEPT", 0.5);
        m.context = EventContext::new()
            .with_source("x_platform")
            .with_extra("campaign", "spring");
        store.store(m.clone()).unwrap();

        let records = store.retrieve(&MemoryFilter::new()).unwrap();
        assert_eq!(records[0].context, m.context);
    }
}
