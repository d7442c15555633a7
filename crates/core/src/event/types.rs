use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::orchestrator::Decision;
use crate::scoring::Score;

/// Source tag for content coming from the X platform.
pub const X_PLATFORM_SOURCE: &str = "x_platform";

/// Context attached to an event.
///
/// The named fields drive the scoring and routing rules; anything else is
/// kept in `extra` and round-trips untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventContext {
    /// Where the content came from (e.g. "x_platform").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Media kind of the content ("text", "image", "video", ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    /// Free text scanned for keywords.
    #[serde(default, rename = "text", skip_serializing_if = "Option::is_none")]
    pub free_text: Option<String>,
    /// Additional, uninterpreted fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EventContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    pub fn with_free_text(mut self, text: impl Into<String>) -> Self {
        self.free_text = Some(text.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// True when no field at all is set.
    pub fn is_empty(&self) -> bool {
        self.source.is_none()
            && self.media_type.is_none()
            && self.free_text.is_none()
            && self.extra.is_empty()
    }

    pub fn is_x_platform(&self) -> bool {
        self.source.as_deref() == Some(X_PLATFORM_SOURCE)
    }

    pub fn media_type(&self) -> Option<&str> {
        self.media_type.as_deref()
    }

    /// Case-insensitive substring scan of the free text.
    pub fn mentions_any(&self, keywords: &[&str]) -> bool {
        match self.free_text.as_deref() {
            Some(text) => {
                let lowered = text.to_lowercase();
                keywords.iter().any(|kw| lowered.contains(kw))
            }
            None => false,
        }
    }
}

/// Summary of one rejected iteration, kept on the refined event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefinementRecord {
    pub iteration: u32,
    pub score: Score,
    pub decision: Decision,
}

/// A piece of text submitted for a decision.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub text: String,
    #[serde(default)]
    pub context: EventContext,
    /// Append-only history of earlier iterations.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub refinement_history: Vec<RefinementRecord>,
}

impl Event {
    pub fn new(text: impl Into<String>, context: EventContext) -> Self {
        Self {
            text: text.into(),
            context,
            refinement_history: Vec::new(),
        }
    }

    /// Derive a new event with `record` appended to the history.
    pub fn with_record(&self, record: RefinementRecord) -> Self {
        let mut next = self.clone();
        next.refinement_history.push(record);
        next
    }
}
