use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Main configuration structure for clusterhub
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Where datasets are resolved from
    #[serde(default)]
    pub data_source: DataSourceConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Whether to enable permissive CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

const fn default_port() -> u16 {
    8080
}

const fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            enable_cors: default_true(),
        }
    }
}

/// Kind of dataset backend
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DataSourceKind {
    /// ARFF files laid out as `<directory>/<id>/<table>.arff`
    Directory,
    /// Remote row-oriented data-access service
    Http,
}

/// Dataset backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DataSourceConfig {
    /// Backend kind
    #[serde(default = "default_data_source_kind")]
    pub kind: DataSourceKind,

    /// Root directory for the directory backend
    #[serde(default = "default_data_directory")]
    pub directory: PathBuf,

    /// Base URL of the remote data-access service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Request timeout for the remote backend
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

const fn default_data_source_kind() -> DataSourceKind {
    DataSourceKind::Directory
}

fn default_data_directory() -> PathBuf {
    PathBuf::from("data")
}

const fn default_timeout_secs() -> u64 {
    30
}

impl Default for DataSourceConfig {
    fn default() -> Self {
        Self {
            kind: default_data_source_kind(),
            directory: default_data_directory(),
            base_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

/// Log file rotation policy
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RotationPolicy {
    #[default]
    Daily,
    Hourly,
    Never,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format for stdout
    #[serde(default = "default_log_format")]
    pub format: LogFormat,

    /// Directory for rolling JSON log files (stdout only if unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,

    /// Enable stdout logging
    #[serde(default = "default_true")]
    pub enable_stdout: bool,

    /// Log file rotation policy
    #[serde(default)]
    pub rotation: RotationPolicy,
}

fn default_log_level() -> String {
    "info".to_string()
}

const fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            enable_stdout: default_true(),
            rotation: RotationPolicy::default(),
        }
    }
}
