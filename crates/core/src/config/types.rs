use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::path::PathBuf;

use crate::orchestrator::PipelineConfig;
use crate::quantum::DEFAULT_FIBONACCI_N;

/// Root configuration. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub system: SystemConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub quantum: QuantumConfig,
    #[serde(default)]
    pub integrations: IntegrationsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
}

/// Deployment metadata
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SystemConfig {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_env")]
    pub env: String,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            env: default_env(),
        }
    }
}

fn default_version() -> String {
    "0.2.0".to_string()
}

fn default_env() -> String {
    "development".to_string()
}

/// Quantum formula configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QuantumConfig {
    /// Fibonacci position used by the quantum score.
    #[serde(default = "default_fibonacci_n")]
    pub fibonacci_n: u32,
    /// Upper bound accepted for `fibonacci_n`.
    #[serde(default = "default_max_fibonacci_n")]
    pub max_fibonacci_n: u32,
    #[serde(default = "default_matrix_weights")]
    pub matrix_weights: Vec<u32>,
    #[serde(default = "default_alpha_schedule")]
    pub alpha_schedule: Vec<f64>,
}

impl Default for QuantumConfig {
    fn default() -> Self {
        Self {
            fibonacci_n: default_fibonacci_n(),
            max_fibonacci_n: default_max_fibonacci_n(),
            matrix_weights: default_matrix_weights(),
            alpha_schedule: default_alpha_schedule(),
        }
    }
}

fn default_fibonacci_n() -> u32 {
    DEFAULT_FIBONACCI_N
}

fn default_max_fibonacci_n() -> u32 {
    55
}

fn default_matrix_weights() -> Vec<u32> {
    vec![3, 4, 7, 7, 4, 3]
}

fn default_alpha_schedule() -> Vec<f64> {
    vec![0.10, 0.20, 0.35, 0.50, 0.35, 0.20, 0.10]
}

/// External integration switches
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct IntegrationsConfig {
    #[serde(default)]
    pub x_platform: bool,
}

/// Log output configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Text => f.write_str("text"),
            LogFormat::Json => f.write_str("json"),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8000
}

/// Memory store configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MemoryConfig {
    #[serde(default = "default_memory_enabled")]
    pub enabled: bool,
    #[serde(default = "default_memory_path")]
    pub path: PathBuf,
    /// Records older than this are eligible for cleanup.
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
    /// Cleanup keeps old records at or above this importance.
    #[serde(default = "default_min_importance")]
    pub min_importance: f64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            enabled: default_memory_enabled(),
            path: default_memory_path(),
            retention_days: default_retention_days(),
            min_importance: default_min_importance(),
        }
    }
}

fn default_memory_enabled() -> bool {
    true
}

fn default_memory_path() -> PathBuf {
    PathBuf::from("spiral_memory.db")
}

fn default_retention_days() -> u32 {
    30
}

fn default_min_importance() -> f64 {
    0.3
}

/// Config view for API responses (filesystem paths omitted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub system: SystemConfig,
    pub pipeline: PipelineConfig,
    pub quantum: QuantumConfig,
    pub integrations: IntegrationsConfig,
    pub logging: LoggingConfig,
    pub server: ServerConfig,
    pub memory: SanitizedMemoryConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedMemoryConfig {
    pub enabled: bool,
    pub retention_days: u32,
    pub min_importance: f64,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            system: config.system.clone(),
            pipeline: config.pipeline.clone(),
            quantum: config.quantum.clone(),
            integrations: config.integrations.clone(),
            logging: config.logging.clone(),
            server: config.server.clone(),
            memory: SanitizedMemoryConfig {
                enabled: config.memory.enabled,
                retention_days: config.memory.retention_days,
                min_importance: config.memory.min_importance,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::PipelineMode;

    #[test]
    fn test_deserialize_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.system.version, "0.2.0");
        assert_eq!(config.system.env, "development");
        assert_eq!(config.pipeline.mode, PipelineMode::Balanced);
        assert_eq!(config.pipeline.max_iterations, 100);
        assert_eq!(config.quantum.fibonacci_n, 9);
        assert_eq!(config.quantum.max_fibonacci_n, 55);
        assert_eq!(config.quantum.matrix_weights, vec![3, 4, 7, 7, 4, 3]);
        assert_eq!(config.quantum.alpha_schedule.len(), 7);
        assert!(!config.integrations.x_platform);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Text);
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert!(config.memory.enabled);
        assert_eq!(config.memory.path.to_str().unwrap(), "spiral_memory.db");
        assert_eq!(config.memory.retention_days, 30);
        assert_eq!(config.memory.min_importance, 0.3);
    }

    #[test]
    fn test_deserialize_full_config() {
        let toml = r#"
[system]
version = "1.0.0"
env = "production"

[pipeline]
mode = "VERIFICATION"
max_iterations = 10
confidence_threshold = 0.6
success_threshold = 0.7

[quantum]
fibonacci_n = 12
max_fibonacci_n = 40

[integrations]
x_platform = true

[logging]
level = "debug"
format = "json"

[server]
host = "127.0.0.1"
port = 9000

[memory]
enabled = false
path = "/data/memory.db"
retention_days = 7
min_importance = 0.5
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.system.env, "production");
        assert_eq!(config.pipeline.mode, PipelineMode::Verification);
        assert_eq!(config.pipeline.max_iterations, 10);
        assert_eq!(config.quantum.fibonacci_n, 12);
        assert!(config.integrations.x_platform);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.server.port, 9000);
        assert!(!config.memory.enabled);
        assert_eq!(config.memory.retention_days, 7);
    }

    #[test]
    fn test_deserialize_unknown_log_format_fails() {
        let result: Result<Config, _> = toml::from_str("[logging]\nformat = \"xml\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_sanitized_config_omits_memory_path() {
        let config = Config::default();
        let sanitized = SanitizedConfig::from(&config);
        let json = serde_json::to_value(&sanitized).unwrap();
        assert_eq!(json["server"]["port"], 8000);
        assert_eq!(json["pipeline"]["mode"], "BALANCED");
        assert_eq!(json["memory"]["enabled"], true);
        assert!(json["memory"].get("path").is_none());
    }
}
