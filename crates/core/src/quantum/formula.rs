//! Fibonacci, the S-formula, and the quantum score.

use std::f64::consts::PI;

use super::complexity::text_complexity;
use super::types::{FormulaParams, QuantumError, QuantumMetrics, SFormulaResult};

/// Fibonacci position used when none is configured.
pub const DEFAULT_FIBONACCI_N: u32 = 9;

/// Largest index whose Fibonacci number fits in a `u128`.
pub const MAX_FIBONACCI_N: u32 = 186;

/// A validated Fibonacci position in `0..=MAX_FIBONACCI_N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FibonacciIndex(u32);

impl FibonacciIndex {
    pub const DEFAULT: FibonacciIndex = FibonacciIndex(DEFAULT_FIBONACCI_N);

    pub fn get(self) -> u32 {
        self.0
    }

    /// F(n), computed iteratively.
    pub fn value(self) -> u128 {
        if self.0 == 0 {
            return 0;
        }
        // Stops at F(n) so F(n + 1) never has to fit
        let (mut a, mut b) = (0u128, 1u128);
        for _ in 1..self.0 {
            let next = a + b;
            a = b;
            b = next;
        }
        b
    }
}

impl Default for FibonacciIndex {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<i64> for FibonacciIndex {
    type Error = QuantumError;

    fn try_from(n: i64) -> Result<Self, Self::Error> {
        if n < 0 {
            return Err(QuantumError::InvalidArgument(format!(
                "n must be >= 0, got {}",
                n
            )));
        }
        if n > i64::from(MAX_FIBONACCI_N) {
            return Err(QuantumError::InvalidArgument(format!(
                "n must be <= {}, got {}",
                MAX_FIBONACCI_N, n
            )));
        }
        Ok(Self(n as u32))
    }
}

impl TryFrom<u32> for FibonacciIndex {
    type Error = QuantumError;

    fn try_from(n: u32) -> Result<Self, Self::Error> {
        Self::try_from(i64::from(n))
    }
}

/// Fibonacci number at position `n` (fib(0) = 0, fib(1) = 1).
///
/// Fails with [`QuantumError::InvalidArgument`] when `n` is negative or
/// above [`MAX_FIBONACCI_N`].
pub fn fibonacci(n: i64) -> Result<u128, QuantumError> {
    FibonacciIndex::try_from(n).map(FibonacciIndex::value)
}

/// Evaluate `S = S9 × π + F(n)`.
///
/// S9 is the digital root of the parameter sum: `sum % 9`, with 0 mapped
/// to 9.
pub fn apply_s_formula(n: FibonacciIndex, params: &FormulaParams) -> SFormulaResult {
    let s9 = match params.sum() % 9 {
        0 => 9,
        r => r as u8,
    };
    let s_pi = f64::from(s9) * PI;
    let fibonacci = n.value();

    SFormulaResult {
        s9,
        s_pi,
        fibonacci,
        value: s_pi + fibonacci as f64,
    }
}

/// Quantum score with the default Fibonacci position.
pub fn quantum_score(text: &str) -> QuantumMetrics {
    quantum_score_with(text, FibonacciIndex::DEFAULT)
}

/// Quantum score: `0.6 × complexity + 0.4 × S/100`, capped at 1.0.
///
/// Whitespace-only text short-circuits to all zeros without evaluating the
/// formula.
pub fn quantum_score_with(text: &str, n: FibonacciIndex) -> QuantumMetrics {
    if text.trim().is_empty() {
        return QuantumMetrics::default();
    }

    let complexity = text_complexity(text);
    let formula = apply_s_formula(n, &FormulaParams::default());

    let score = complexity.complexity_score * 0.6 + (formula.value / 100.0) * 0.4;

    QuantumMetrics {
        quantum_score: score.min(1.0),
        text_complexity: complexity.complexity_score,
        entropy: complexity.shannon_entropy,
        s_formula_result: formula.value,
        fibonacci_component: formula.fibonacci,
    }
}
