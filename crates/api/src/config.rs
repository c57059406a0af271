//! Server configuration
//!
//! Layered from built-in defaults, an optional TOML file and
//! `SMARTFARM__*` environment variables (`SMARTFARM__SERVER__BIND_ADDR`,
//! `SMARTFARM__STORAGE__DB_PATH`, ...).

use ::config::{Config, Environment, File};
use scoring::ScoringConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use storage::StorageConfig;
use thiserror::Error;
use vision::AnalyzerConfig;

/// File looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "smartfarm";

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum AppConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("Invalid scoring configuration: {0}")]
    Scoring(#[from] scoring::ConfigError),
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Directory for uploaded images awaiting analysis
    pub upload_dir: PathBuf,
    /// Largest accepted request body
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            upload_dir: PathBuf::from("temp_images"),
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Log output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `trace`, `debug`, `info`, `warn` or `error`
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub scoring: ScoringConfig,
    pub vision: AnalyzerConfig,
    pub log: LogConfig,
}

impl AppConfig {
    /// Load configuration
    ///
    /// With `file` set the file must exist; otherwise `smartfarm.toml` in the
    /// working directory is used when present.
    pub fn load(file: Option<&Path>) -> Result<Self, AppConfigError> {
        let file_source = match file {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let config: AppConfig = Config::builder()
            .add_source(file_source)
            .add_source(
                Environment::with_prefix("SMARTFARM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.scoring.validate()?;
        Ok(config)
    }
}
