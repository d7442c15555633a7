use super::{types::Config, ConfigError};
use crate::memory::MAX_WINDOW_DAYS;
use crate::quantum::MAX_FIBONACCI_N;

/// Validate configuration
/// Currently validates:
/// - Pipeline mode is known (enforced by serde)
/// - Thresholds within [0, 1], max_iterations > 0
/// - fibonacci_n <= max_fibonacci_n <= the largest representable index
/// - Server port is not 0
/// - Memory min_importance within [0, 1], retention_days within the day window
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let pipeline = &config.pipeline;

    check_unit_range("pipeline.confidence_threshold", pipeline.confidence_threshold)?;
    check_unit_range("pipeline.success_threshold", pipeline.success_threshold)?;

    if pipeline.max_iterations == 0 {
        return Err(ConfigError::ValidationError(
            "pipeline.max_iterations must be positive".to_string(),
        ));
    }

    let quantum = &config.quantum;
    if quantum.max_fibonacci_n > MAX_FIBONACCI_N {
        return Err(ConfigError::ValidationError(format!(
            "quantum.max_fibonacci_n must be <= {}: {}",
            MAX_FIBONACCI_N, quantum.max_fibonacci_n
        )));
    }
    if quantum.fibonacci_n > quantum.max_fibonacci_n {
        return Err(ConfigError::ValidationError(format!(
            "quantum.fibonacci_n ({}) exceeds quantum.max_fibonacci_n ({})",
            quantum.fibonacci_n, quantum.max_fibonacci_n
        )));
    }

    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    check_unit_range("memory.min_importance", config.memory.min_importance)?;
    if config.memory.retention_days > MAX_WINDOW_DAYS {
        return Err(ConfigError::ValidationError(format!(
            "memory.retention_days must be <= {}: {}",
            MAX_WINDOW_DAYS, config.memory.retention_days
        )));
    }

    Ok(())
}

fn check_unit_range(field: &str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::ValidationError(format!(
            "{} must be between 0.0 and 1.0: {}",
            field, value
        )));
    }
    Ok(())
}
