//! Record identity and importance scoring.

use sha2::{Digest, Sha256};

use crate::event::EventContext;

/// Weight applied to the base score for a decision label.
pub fn decision_weight(decision: &str) -> f64 {
    match decision {
        "ACCEPT" => 1.0,
        "REVISE" => 0.8,
        "REJECT" => 0.6,
        "FORCE_ACCEPT" => 1.2,
        _ => 1.0,
    }
}

/// Retention importance in [0, 1].
///
/// Mean of confidence and success, scaled by the decision weight and a
/// content-length factor capped at 1.2.
pub fn calculate_importance(confidence: f64, success: f64, decision: &str, content: &str) -> f64 {
    let base = (confidence + success) / 2.0;
    let length_factor = (1.0 + content.chars().count() as f64 / 1000.0).min(1.2);
    (base * decision_weight(decision) * length_factor).min(1.0)
}

/// Stable id: content hash prefix plus context hash prefix.
///
/// The context is hashed in its canonical JSON form (sorted keys).
pub fn memory_id(content: &str, context: &EventContext) -> String {
    let content_hash = format!("{:x}", Sha256::digest(content.as_bytes()));
    let canonical = serde_json::to_value(context)
        .map(|v| v.to_string())
        .unwrap_or_default();
    let context_hash = format!("{:x}", Sha256::digest(canonical.as_bytes()));
    format!("{}_{}", &content_hash[..16], &context_hash[..8])
}
