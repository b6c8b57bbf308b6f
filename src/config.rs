//! Configuration
//!
//! TOML configuration for the nero binary: a logging section plus a map
//! of repository definitions keyed by repository ID. Files are loaded
//! through the `config` crate so `NERO_*` environment variables can
//! override file values.

use crate::error::ApiError;
use crate::logging::LoggingConfig;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Default index file name inside a repository storage directory.
const DEFAULT_LOCK_FILE: &str = "nero.lock";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NeroConfig {
    /// The "logging" section.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Repository definitions, keyed by repository ID.
    #[serde(default)]
    pub repos: HashMap<String, RepoConfig>,
}

/// A single repository definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoConfig {
    /// Storage directory for media payloads.
    pub path: PathBuf,
    /// Index file path; defaults to `nero.lock` inside the storage
    /// directory when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_path: Option<PathBuf>,
    /// Free-form metadata consumed by the surrounding service (e.g. a
    /// required authentication key); opaque to the repository engine.
    #[serde(default)]
    pub meta: HashMap<String, String>,
}

impl RepoConfig {
    /// The effective index file path for this repository.
    pub fn lock_path(&self) -> PathBuf {
        self.lock_path
            .clone()
            .unwrap_or_else(|| self.path.join(DEFAULT_LOCK_FILE))
    }
}

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file, with `NERO_*` environment
    /// variables overriding file values.
    pub fn load_from_file(path: &Path) -> Result<NeroConfig, ApiError> {
        Config::builder()
            .add_source(File::from(path.to_path_buf()))
            .add_source(Environment::with_prefix("NERO").separator("__"))
            .build()
            .and_then(|config| config.try_deserialize())
            .map_err(|e| {
                ApiError::ConfigError(format!("Failed to load {}: {}", path.display(), e))
            })
    }

    /// An example configuration, for bootstrapping a new deployment.
    pub fn example() -> NeroConfig {
        let mut repos = HashMap::new();
        repos.insert(
            "main".to_string(),
            RepoConfig {
                path: PathBuf::from("media/main"),
                lock_path: None,
                meta: HashMap::new(),
            },
        );

        NeroConfig {
            logging: LoggingConfig::default(),
            repos,
        }
    }

    /// Render a configuration to TOML.
    pub fn render(config: &NeroConfig) -> Result<String, ApiError> {
        toml::to_string_pretty(config)
            .map_err(|e| ApiError::ConfigError(format!("Failed to render configuration: {}", e)))
    }
}
