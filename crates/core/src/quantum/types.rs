//! Metric result types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by the metric calculator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuantumError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Lexical and information metrics for a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ComplexityMetrics {
    /// Number of characters (Unicode scalar values).
    pub char_count: usize,
    /// Number of whitespace-separated words.
    pub word_count: usize,
    /// Number of distinct words (case-sensitive).
    pub unique_word_count: usize,
    /// Shannon entropy of the character distribution, in bits.
    pub shannon_entropy: f64,
    /// Mean word length in characters.
    pub avg_word_length: f64,
    /// Weighted complexity in [0, 1].
    pub complexity_score: f64,
}

impl ComplexityMetrics {
    /// Unique words over total words, 0.0 when there are no words.
    pub fn vocab_diversity(&self) -> f64 {
        if self.word_count == 0 {
            0.0
        } else {
            self.unique_word_count as f64 / self.word_count as f64
        }
    }

    /// Entropy scaled into [0, 1] (5 bits maps to 1.0).
    pub fn normalized_entropy(&self) -> f64 {
        (self.shannon_entropy / 5.0).min(1.0)
    }
}

/// Quantum score and the components it was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct QuantumMetrics {
    /// Combined score in [0, 1].
    pub quantum_score: f64,
    /// The complexity score that fed the combination.
    pub text_complexity: f64,
    /// Shannon entropy of the text.
    pub entropy: f64,
    /// Value of the S-formula (S9 × π + F(n)).
    pub s_formula_result: f64,
    /// The F(n) term of the S-formula.
    pub fibonacci_component: u128,
}

/// The seven integer weights feeding the S-formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct FormulaParams {
    pub w: u32,
    pub m: u32,
    pub d: u32,
    pub c: u32,
    pub a: u32,
    pub e: u32,
    pub t: u32,
}

impl FormulaParams {
    pub fn sum(&self) -> u64 {
        [self.w, self.m, self.d, self.c, self.a, self.e, self.t]
            .iter()
            .map(|&v| u64::from(v))
            .sum()
    }
}

impl Default for FormulaParams {
    fn default() -> Self {
        Self {
            w: 7,
            m: 6,
            d: 4,
            c: 5,
            a: 8,
            e: 6,
            t: 3,
        }
    }
}

/// Components of one S-formula evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SFormulaResult {
    /// Digital root of the parameter sum, in 1..=9.
    pub s9: u8,
    /// `s9 × π`.
    pub s_pi: f64,
    /// F(n).
    pub fibonacci: u128,
    /// `s_pi + F(n)`.
    pub value: f64,
}
