//! Entropy and lexical complexity.

use std::collections::{HashMap, HashSet};

use super::types::ComplexityMetrics;

/// Shannon entropy (base 2) of the character distribution of `text`.
///
/// Returns 0.0 for empty text and for text made of a single repeated
/// character.
pub fn shannon_entropy(text: &str) -> f64 {
    let mut counts: HashMap<char, usize> = HashMap::new();
    let mut total = 0usize;
    for c in text.chars() {
        *counts.entry(c).or_insert(0) += 1;
        total += 1;
    }

    if total == 0 {
        return 0.0;
    }

    let total = total as f64;
    counts
        .values()
        .map(|&count| {
            let p = count as f64 / total;
            -p * p.log2()
        })
        .sum::<f64>()
        // A single symbol yields -0.0
        .abs()
}

/// Compute lexical complexity metrics for `text`.
///
/// The complexity score is a fixed linear combination, capped at 1.0:
///
/// | component                        | weight |
/// |----------------------------------|--------|
/// | entropy / 5 (capped at 1)        | 0.4    |
/// | unique words / words             | 0.3    |
/// | avg word length / 10 (capped)    | 0.2    |
/// | word count / 100 (capped)        | 0.1    |
pub fn text_complexity(text: &str) -> ComplexityMetrics {
    if text.is_empty() {
        return ComplexityMetrics::default();
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    let word_count = words.len();
    let unique_word_count = words.iter().collect::<HashSet<_>>().len();
    let shannon_entropy = shannon_entropy(text);

    let avg_word_length = if word_count == 0 {
        0.0
    } else {
        words.iter().map(|w| w.chars().count()).sum::<usize>() as f64 / word_count as f64
    };

    let mut metrics = ComplexityMetrics {
        char_count: text.chars().count(),
        word_count,
        unique_word_count,
        shannon_entropy,
        avg_word_length,
        complexity_score: 0.0,
    };

    let score = metrics.normalized_entropy() * 0.4
        + metrics.vocab_diversity() * 0.3
        + (avg_word_length / 10.0).min(1.0) * 0.2
        + (word_count as f64 / 100.0).min(1.0) * 0.1;
    metrics.complexity_score = score.min(1.0);

    metrics
}
