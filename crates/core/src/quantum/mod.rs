//! Text metric calculator.
//!
//! Surface statistics over raw text, used as inputs to the scoring model:
//! - Shannon entropy over the character distribution
//! - Lexical complexity (vocabulary diversity, word length, word count)
//! - The S-formula: a digit-sum of a fixed parameter set times π plus a
//!   Fibonacci term, folded into the quantum score
//!
//! Every function here is pure. All of them are total over arbitrary
//! strings except [`fibonacci`], which rejects indices that are negative or
//! too large to represent.

mod complexity;
mod formula;
mod types;

pub use complexity::{shannon_entropy, text_complexity};
pub use formula::{
    apply_s_formula, fibonacci, quantum_score, quantum_score_with, FibonacciIndex,
    DEFAULT_FIBONACCI_N, MAX_FIBONACCI_N,
};
pub use types::{ComplexityMetrics, FormulaParams, QuantumError, QuantumMetrics, SFormulaResult};
