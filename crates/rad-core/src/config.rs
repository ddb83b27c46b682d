//! rad-extract Configuration Management
//!
//! Handles configuration from environment variables and TOML config files
//! with defaults that work without any setup.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Single-file extraction settings
    pub extract: ExtractConfig,

    /// Directory batch settings
    pub batch: BatchConfig,

    /// Interactive viewer settings
    pub viewer: ViewerConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_override()
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply every variable `lookup` reports as set, whatever its value
    fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(pretty) = lookup("RAD_PRETTY_JSON") {
            self.extract.pretty = parse_bool("RAD_PRETTY_JSON", &pretty)?;
        }

        if let Some(pattern) = lookup("RAD_BATCH_PATTERN") {
            self.batch.pattern = pattern;
        }
        if let Some(concurrency) = lookup("RAD_BATCH_CONCURRENCY") {
            self.batch.concurrency = concurrency.parse().map_err(|_| ConfigError::InvalidValue {
                key: "RAD_BATCH_CONCURRENCY".to_string(),
                value: concurrency,
            })?;
        }

        if let Some(level) = lookup("RAD_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(json) = lookup("RAD_LOG_JSON") {
            self.logging.json_format = parse_bool("RAD_LOG_JSON", &json)?;
        }

        self.validate()?;
        Ok(self)
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch.concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                key: "batch.concurrency".to_string(),
                value: "0".to_string(),
            });
        }
        if self.batch.output_extension.is_empty() {
            return Err(ConfigError::MissingRequired(
                "batch.output_extension".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Single-file extraction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self { pretty: true }
    }
}

/// Batch processing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// File name pattern (`*` and `?` wildcards)
    pub pattern: String,

    /// Maximum number of files processed at once
    pub concurrency: usize,

    /// Extension of the written result files
    pub output_extension: String,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            pattern: "*.txt".to_string(),
            concurrency: 4,
            output_extension: "json".to_string(),
        }
    }
}

/// Viewer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Initial state of the "Show Anatomy" filter
    pub show_anatomy: bool,

    /// Initial state of the "Show Observation" filter
    pub show_observation: bool,

    /// Record opened when no `--record` is given
    pub start_record: usize,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            show_anatomy: true,
            show_observation: true,
            start_record: 0,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,

    /// Include file/line in logs
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            include_location: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
