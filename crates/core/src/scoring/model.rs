//! Mode-weighted scoring model.

use tracing::debug;

use crate::event::EventContext;
use crate::quantum::{quantum_score_with, text_complexity, FibonacciIndex};

use super::types::{ModeInfo, ModeWeights, PipelineMode, Score};

/// Keywords in the context free text that lower confidence.
pub const CONFIDENCE_PENALTY_KEYWORDS: [&str; 3] = ["ceo", "leader", "executive"];

/// Added to word count before dividing, so empty word lists stay finite.
const DIVERSITY_EPSILON: f64 = 1e-9;

/// Scores text into a bounded confidence/success pair.
///
/// The mode (and therefore the weight table) is fixed at construction.
#[derive(Debug, Clone)]
pub struct ScoringModel {
    mode: PipelineMode,
    weights: ModeWeights,
    fibonacci_n: FibonacciIndex,
}

impl ScoringModel {
    pub fn new(mode: PipelineMode) -> Self {
        Self {
            mode,
            weights: ModeWeights::for_mode(mode),
            fibonacci_n: FibonacciIndex::DEFAULT,
        }
    }

    /// Build from a mode name; unknown names get the balanced weights.
    pub fn from_mode_name(name: &str) -> Self {
        Self::new(PipelineMode::from_name(name))
    }

    /// Use a different Fibonacci position for the quantum component.
    pub fn with_fibonacci_n(mut self, n: FibonacciIndex) -> Self {
        self.fibonacci_n = n;
        self
    }

    pub fn mode(&self) -> PipelineMode {
        self.mode
    }

    pub fn weights(&self) -> &ModeWeights {
        &self.weights
    }

    /// Score `text`, applying context adjustments when a non-empty context
    /// is given.
    pub fn score_text(&self, text: &str, context: Option<&EventContext>) -> Score {
        if text.is_empty() {
            return Score::zero();
        }

        let complexity = text_complexity(text);
        let quantum = quantum_score_with(text, self.fibonacci_n);
        let w = &self.weights;

        let vocab_diversity =
            complexity.unique_word_count as f64 / (complexity.word_count as f64 + DIVERSITY_EPSILON);
        let base_confidence = (0.4 + 0.6 * vocab_diversity).min(0.99);

        let entropy_normalized = complexity.normalized_entropy();
        let base_success = (0.3 + 0.7 * entropy_normalized).min(0.99);

        let confidence = base_confidence * w.confidence_boost;
        let success = base_success * (1.0 - w.success_penalty);

        let complexity_factor = complexity.complexity_score * w.complexity_weight;
        let entropy_factor = entropy_normalized * w.entropy_weight;
        let quantum_boost = quantum.quantum_score * 0.1;

        let mut final_confidence = (confidence + complexity_factor + quantum_boost).min(0.99);
        let mut final_success = (success + entropy_factor + quantum_boost).min(0.99);

        if let Some(ctx) = context.filter(|c| !c.is_empty()) {
            (final_confidence, final_success) =
                Self::apply_context_adjustments(final_confidence, final_success, ctx);
        }

        debug!(
            mode = %self.mode,
            confidence = final_confidence,
            success = final_success,
            "Scored text ({} chars)",
            complexity.char_count
        );

        Score::new(final_confidence, final_success)
    }

    /// Multiplicative context adjustments, applied in order with no
    /// intermediate clamping.
    fn apply_context_adjustments(
        mut confidence: f64,
        mut success: f64,
        context: &EventContext,
    ) -> (f64, f64) {
        if context.is_x_platform() {
            confidence *= 1.1;
            success *= 1.05;
        }

        match context.media_type() {
            Some("image") => success *= 1.2,
            Some("video") => success *= 1.3,
            _ => {}
        }

        if context.mentions_any(&CONFIDENCE_PENALTY_KEYWORDS) {
            confidence *= 0.9;
        }

        (confidence, success)
    }

    /// Score each text with its matching context.
    ///
    /// When `contexts` is given it must be the same length as `texts`.
    pub fn batch_score(&self, texts: &[&str], contexts: Option<&[EventContext]>) -> Vec<Score> {
        match contexts {
            Some(contexts) => {
                debug_assert_eq!(texts.len(), contexts.len(), "texts/contexts length mismatch");
                texts
                    .iter()
                    .zip(contexts)
                    .map(|(text, ctx)| self.score_text(text, Some(ctx)))
                    .collect()
            }
            None => texts.iter().map(|text| self.score_text(text, None)).collect(),
        }
    }

    pub fn mode_info(&self) -> ModeInfo {
        ModeInfo {
            mode: self.mode,
            weights: self.weights,
            description: self.mode.description().to_string(),
        }
    }
}

impl Default for ScoringModel {
    fn default() -> Self {
        Self::new(PipelineMode::Balanced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantum::quantum_score;

    const RICH_TEXT: &str =
        "Rich vocabulary drives confidence and entropy rises with sophisticated analysis.";

    /// Raw (pre-context, pre-clamp) values computed straight from the formula.
    fn raw_scores(text: &str, mode: PipelineMode) -> (f64, f64) {
        let c = text_complexity(text);
        let q = quantum_score(text);
        let w = ModeWeights::for_mode(mode);
        let diversity = c.unique_word_count as f64 / (c.word_count as f64 + 1e-9);
        let ent = (c.shannon_entropy / 5.0).min(1.0);
        let conf = (0.4 + 0.6 * diversity).min(0.99) * w.confidence_boost
            + c.complexity_score * w.complexity_weight
            + q.quantum_score * 0.1;
        let succ = (0.3 + 0.7 * ent).min(0.99) * (1.0 - w.success_penalty)
            + ent * w.entropy_weight
            + q.quantum_score * 0.1;
        (conf.min(0.99), succ.min(0.99))
    }

    #[test]
    fn test_empty_text_scores_zero() {
        let model = ScoringModel::default();
        assert_eq!(model.score_text("", None), Score::zero());
        let ctx = EventContext::new().with_source("x_platform");
        assert_eq!(model.score_text("", Some(&ctx)), Score::zero());
    }

    #[test]
    fn test_score_matches_formula_for_each_mode() {
        for mode in PipelineMode::ALL {
            let model = ScoringModel::new(mode);
            let (conf, succ) = raw_scores(RICH_TEXT, mode);
            let score = model.score_text(RICH_TEXT, None);
            assert!((score.confidence - conf).abs() < 1e-12, "{mode}");
            assert!((score.success - succ).abs() < 1e-12, "{mode}");
        }
    }

    #[test]
    fn test_scores_bounded_across_modes_and_contexts() {
        let contexts = [
            EventContext::new(),
            EventContext::new().with_source("x_platform"),
            EventContext::new().with_media_type("video"),
            EventContext::new()
                .with_source("x_platform")
                .with_media_type("image")
                .with_free_text("executive summary"),
        ];
        let texts = ["a", "test", RICH_TEXT, "   ", "zzzz zzzz zzzz"];

        for mode in PipelineMode::ALL {
            let model = ScoringModel::new(mode);
            for ctx in &contexts {
                for text in texts {
                    let s = model.score_text(text, Some(ctx));
                    assert!((0.0..=1.0).contains(&s.confidence));
                    assert!((0.0..=1.0).contains(&s.success));
                }
            }
        }
    }

    #[test]
    fn test_empty_context_is_ignored() {
        let model = ScoringModel::default();
        assert_eq!(
            model.score_text("test", Some(&EventContext::new())),
            model.score_text("test", None)
        );
    }

    #[test]
    fn test_x_platform_adjustment() {
        let model = ScoringModel::new(PipelineMode::Creative);
        let (conf, succ) = raw_scores("test", PipelineMode::Creative);
        let ctx = EventContext::new().with_source("x_platform");
        let score = model.score_text("test", Some(&ctx));
        assert!((score.confidence - (conf * 1.1).min(1.0)).abs() < 1e-12);
        assert!((score.success - (succ * 1.05).min(1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_media_type_adjustments() {
        let model = ScoringModel::new(PipelineMode::Creative);
        let (conf, succ) = raw_scores("test", PipelineMode::Creative);

        let image = model.score_text("test", Some(&EventContext::new().with_media_type("image")));
        assert!((image.confidence - conf).abs() < 1e-12);
        assert!((image.success - (succ * 1.2).min(1.0)).abs() < 1e-12);

        let video = model.score_text("test", Some(&EventContext::new().with_media_type("video")));
        assert!((video.success - (succ * 1.3).min(1.0)).abs() < 1e-12);

        let text = model.score_text("test", Some(&EventContext::new().with_media_type("text")));
        assert!((text.success - succ).abs() < 1e-12);
    }

    #[test]
    fn test_leadership_keywords_reduce_confidence() {
        let model = ScoringModel::new(PipelineMode::Verification);
        let (conf, _) = raw_scores(RICH_TEXT, PipelineMode::Verification);
        let ctx = EventContext::new().with_free_text("Message from the Executive team");
        let score = model.score_text(RICH_TEXT, Some(&ctx));
        assert!((score.confidence - conf * 0.9).abs() < 1e-12);

        // "manager" only affects routing, not scoring
        let ctx = EventContext::new().with_free_text("manager");
        let score = model.score_text(RICH_TEXT, Some(&ctx));
        assert!((score.confidence - conf).abs() < 1e-12);
    }

    #[test]
    fn test_adjustments_only_clamp_at_the_end() {
        // x_platform × video pushes success above 1 before the final clamp
        let model = ScoringModel::new(PipelineMode::Verification);
        let ctx = EventContext::new()
            .with_source("x_platform")
            .with_media_type("video");
        let score = model.score_text(RICH_TEXT, Some(&ctx));
        assert_eq!(score.success, 1.0);
    }

    #[test]
    fn test_unknown_mode_name_uses_balanced_weights() {
        let model = ScoringModel::from_mode_name("SIDEWAYS");
        assert_eq!(model.mode(), PipelineMode::Balanced);
        assert_eq!(*model.weights(), ModeWeights::for_mode(PipelineMode::Balanced));
    }

    #[test]
    fn test_batch_score_without_contexts() {
        let model = ScoringModel::default();
        let scores = model.batch_score(&["one", "", RICH_TEXT], None);
        assert_eq!(scores.len(), 3);
        assert_eq!(scores[1], Score::zero());
        assert_eq!(scores[2], model.score_text(RICH_TEXT, None));
    }

    #[test]
    fn test_batch_score_with_contexts() {
        let model = ScoringModel::default();
        let contexts = vec![
            EventContext::new(),
            EventContext::new().with_media_type("video"),
        ];
        let scores = model.batch_score(&["test", "test"], Some(&contexts));
        assert_eq!(scores[0], model.score_text("test", None));
        assert_eq!(scores[1], model.score_text("test", Some(&contexts[1])));
    }

    #[test]
    fn test_mode_info() {
        let info = ScoringModel::new(PipelineMode::Creative).mode_info();
        assert_eq!(info.mode, PipelineMode::Creative);
        assert_eq!(info.description, "Encourages innovation and complexity");
        assert_eq!(info.weights.complexity_weight, 0.7);
    }
}
