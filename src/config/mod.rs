//! Configuration management for mongoframe
//!
//! This module handles loading, parsing, and managing configuration from various sources:
//! - Configuration files (TOML format)
//! - Environment variables
//! - Command-line arguments (applied by the CLI)
//!
//! Configuration precedence (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file
//! 4. Default values

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::connection::extract_database_from_uri;
use crate::error::{ConfigError, Result};
use crate::exporter::{DEFAULT_BATCH_SIZE, DEFAULT_ID_FIELD, DEFAULT_SENTINEL};

/// Environment variable overriding `connection.uri`
pub const ENV_URI: &str = "MONGOFRAME_URI";

/// Environment variable overriding `connection.database`
pub const ENV_DATABASE: &str = "MONGOFRAME_DATABASE";

/// Environment variable overriding `export.batch_size`
pub const ENV_BATCH_SIZE: &str = "MONGOFRAME_BATCH_SIZE";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Connection configuration
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// Export behaviour
    #[serde(default)]
    pub export: ExportConfig,

    /// Display configuration
    #[serde(default)]
    pub display: DisplayConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Connection-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// MongoDB connection URI
    #[serde(default = "default_uri")]
    pub uri: String,

    /// Database used when an export does not name one
    #[serde(default = "default_database")]
    pub database: String,

    /// Connection and server selection timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Number of retry attempts on connection failure
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Maximum pool size
    #[serde(default = "default_max_pool_size")]
    pub max_pool_size: u32,

    /// Minimum pool size
    #[serde(default)]
    pub min_pool_size: u32,

    /// Application name reported to the server
    #[serde(default = "default_app_name")]
    pub app_name: String,
}

/// Export behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Documents per cursor round trip and per table fragment
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Exact string values replaced with the missing-value marker
    #[serde(default = "default_sentinels")]
    pub sentinels: Vec<String>,

    /// Identifier column removed from results in addition to `_id`
    #[serde(default = "default_id_field")]
    pub id_field: String,

    /// Show a spinner while fetching
    #[serde(default = "default_progress")]
    pub progress: bool,
}

/// Display and output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Output format (table, csv, jsonl, summary)
    #[serde(default = "default_format")]
    pub format: OutputFormat,

    /// Table border style
    #[serde(default = "default_style")]
    pub style: TableStyle,

    /// Maximum column width before wrapping
    #[serde(default = "default_max_column_width")]
    pub max_column_width: usize,

    /// Enable colored output
    #[serde(default = "default_color_output")]
    pub color_output: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// ASCII table layout
    Table,

    /// Comma-separated values with a header row
    Csv,

    /// One JSON object per line
    Jsonl,

    /// Row and column counts only
    Summary,
}

/// Available table styles
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TableStyle {
    Modern,
    Ascii,
    Rounded,
    Markdown,
    Psql,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// Enable timestamps in logs
    #[serde(default = "default_log_timestamps")]
    pub timestamps: bool,
}

/// Log level options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

// Default value functions
fn default_uri() -> String {
    "mongodb://localhost:27017".to_string()
}

fn default_database() -> String {
    "test".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_max_pool_size() -> u32 {
    10
}

fn default_app_name() -> String {
    "mongoframe".to_string()
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_sentinels() -> Vec<String> {
    vec![DEFAULT_SENTINEL.to_string()]
}

fn default_id_field() -> String {
    DEFAULT_ID_FIELD.to_string()
}

fn default_progress() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

fn default_style() -> TableStyle {
    TableStyle::Modern
}

fn default_max_column_width() -> usize {
    40
}

fn default_color_output() -> bool {
    true
}

fn default_log_level() -> LogLevel {
    LogLevel::Warn
}

fn default_log_timestamps() -> bool {
    true
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            uri: default_uri(),
            database: default_database(),
            timeout: default_timeout(),
            retry_attempts: default_retry_attempts(),
            max_pool_size: default_max_pool_size(),
            min_pool_size: 0,
            app_name: default_app_name(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            sentinels: default_sentinels(),
            id_field: default_id_field(),
            progress: default_progress(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            style: default_style(),
            max_column_width: default_max_column_width(),
            color_output: default_color_output(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            timestamps: default_log_timestamps(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| ConfigError::InvalidFormat(e.to_string()).into())
    }

    /// Load configuration from a file
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file (TOML format)
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration or error
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()).into());
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Load configuration with file and environment precedence
    ///
    /// An explicit `path` must exist. Without one, the default path is used
    /// when present and defaults otherwise.
    ///
    /// # Returns
    /// * `Result<Config>` - Merged configuration or error
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => {
                let default_path = Self::default_path();
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply environment overrides read through `lookup`
    ///
    /// A database in the path of `MONGOFRAME_URI` replaces the configured
    /// one; `MONGOFRAME_DATABASE` wins over both.
    ///
    /// # Arguments
    /// * `lookup` - Returns the value of an environment variable, if set
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(uri) = lookup(ENV_URI) {
            if let Some(database) = extract_database_from_uri(&uri) {
                self.connection.database = database;
            }
            self.connection.uri = uri;
        }
        if let Some(database) = lookup(ENV_DATABASE) {
            self.connection.database = database;
        }
        if let Some(raw) = lookup(ENV_BATCH_SIZE) {
            self.export.batch_size = raw.parse().map_err(|_| ConfigError::InvalidValue {
                field: ENV_BATCH_SIZE.to_string(),
                value: raw.clone(),
            })?;
        }
        Ok(())
    }

    /// Get the default configuration file path
    ///
    /// # Returns
    /// * `PathBuf` - Path to default configuration file
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".mongoframe")
            .join("config.toml")
    }

    /// Serialize configuration as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::InvalidFormat(e.to_string()).into())
    }

    /// Save configuration to a file
    ///
    /// # Arguments
    /// * `path` - Path where to save the configuration
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    /// Validate the configuration
    ///
    /// # Returns
    /// * `Result<()>` - Ok if valid, error otherwise
    pub fn validate(&self) -> Result<()> {
        self.connection.validate_uri()?;

        if self.connection.database.trim().is_empty() {
            return Err(ConfigError::MissingField("connection.database".to_string()).into());
        }
        if self.export.batch_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "export.batch_size".to_string(),
                value: "0".to_string(),
            }
            .into());
        }
        if self.export.id_field.is_empty() {
            return Err(ConfigError::MissingField("export.id_field".to_string()).into());
        }
        Ok(())
    }

    /// Get connection timeout as Duration
    pub fn connection_timeout(&self) -> Duration {
        self.connection.timeout_duration()
    }
}

impl ConnectionConfig {
    /// Check that the URI uses a MongoDB scheme
    ///
    /// # Returns
    /// * `Result<()>` - Ok if URI is valid, error otherwise
    pub fn validate_uri(&self) -> Result<()> {
        let valid = ["mongodb://", "mongodb+srv://"]
            .iter()
            .any(|scheme| self.uri.starts_with(scheme) && self.uri.len() > scheme.len());
        if valid {
            Ok(())
        } else {
            Err(ConfigError::InvalidValue {
                field: "connection.uri".to_string(),
                value: self.uri.clone(),
            }
            .into())
        }
    }

    /// Get connection timeout as Duration
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "csv" => Ok(OutputFormat::Csv),
            "jsonl" | "json-lines" => Ok(OutputFormat::Jsonl),
            "summary" => Ok(OutputFormat::Summary),
            _ => Err(ConfigError::InvalidValue {
                field: "format".to_string(),
                value: s.to_string(),
            }),
        }
    }
}
