//! Logging System
//!
//! Structured logging via the `tracing` crate, configured from the
//! `[logging]` section of the configuration file. `RUST_LOG` takes
//! precedence over configured levels when set.

use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Whether logging is enabled (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log level: trace, debug, info, warn, error, off
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: json, text (default: text)
    #[serde(default = "default_format")]
    pub format: String,

    /// Output destination: stdout, stderr (default: stderr)
    #[serde(default = "default_output")]
    pub output: String,

    /// Enable colored output (text format only)
    #[serde(default = "default_true")]
    pub color: bool,

    /// Module-specific log levels
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

fn default_output() -> String {
    "stderr".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            enabled: true,
            level: default_log_level(),
            format: default_format(),
            output: default_output(),
            color: true,
            modules: HashMap::new(),
        }
    }
}

/// Initialize the global tracing subscriber from configuration.
pub fn init_logging(config: &LoggingConfig) -> Result<(), ApiError> {
    if !config.enabled {
        return Ok(());
    }

    let filter = build_env_filter(config)?;
    let registry = Registry::default().with(filter);
    let use_stdout = config.output == "stdout";

    let result = match (config.format.as_str(), use_stdout) {
        ("json", true) => registry
            .with(fmt::layer().json().with_writer(std::io::stdout))
            .try_init(),
        ("json", false) => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        (_, true) => registry
            .with(
                fmt::layer()
                    .with_ansi(config.color)
                    .with_writer(std::io::stdout),
            )
            .try_init(),
        (_, false) => registry
            .with(
                fmt::layer()
                    .with_ansi(config.color)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };

    result.map_err(|e| ApiError::ConfigError(format!("Failed to initialize logging: {}", e)))
}

// Base level from the config, module overrides appended as directives.
// RUST_LOG wins outright when present.
fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter, ApiError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    let mut directives = config.level.clone();
    for (module, level) in &config.modules {
        directives.push_str(&format!(",{}={}", module, level));
    }

    EnvFilter::try_new(&directives)
        .map_err(|e| ApiError::ConfigError(format!("Invalid log directives {}: {}", directives, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config: LoggingConfig = toml::from_str("").unwrap();
        assert!(config.enabled);
        assert_eq!(config.level, "info");
        assert_eq!(config.format, "text");
        assert_eq!(config.output, "stderr");
        assert!(config.modules.is_empty());
    }

    #[test]
    fn test_invalid_level_is_rejected() {
        let config = LoggingConfig {
            level: "not-a-level".to_string(),
            ..LoggingConfig::default()
        };
        assert!(build_env_filter(&config).is_err());
    }

    #[test]
    fn test_module_overrides_build() {
        let mut config = LoggingConfig::default();
        config
            .modules
            .insert("nero::repo".to_string(), "debug".to_string());
        assert!(build_env_filter(&config).is_ok());
    }
}
