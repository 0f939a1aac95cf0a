use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use thiserror::Error;

use crate::domain::models::config::{Config, DataSourceKind};

/// Configuration error types
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid port: {0}. Must be between 1 and 65535")]
    InvalidPort(u16),

    #[error("Server host cannot be empty")]
    EmptyHost,

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("data_source.base_url is required when data_source.kind is http")]
    MissingBaseUrl,

    #[error("Invalid data_source.timeout_secs: {0}. Must be at least 1")]
    InvalidTimeout(u64),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .clusterhub/config.yaml (project config)
    /// 3. .clusterhub/local.yaml (local overrides, optional)
    /// 4. Environment variables (CLUSTERHUB_* prefix, `__` between nested keys)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".clusterhub/config.yaml"))
            .merge(Yaml::file(".clusterhub/local.yaml"))
            .merge(Env::prefixed("CLUSTERHUB_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, still honouring environment overrides
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed("CLUSTERHUB_").split("__"))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.server.port == 0 {
            return Err(ConfigError::InvalidPort(config.server.port));
        }
        if config.server.host.trim().is_empty() {
            return Err(ConfigError::EmptyHost);
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        match config.data_source.kind {
            DataSourceKind::Http => {
                let base_url = config.data_source.base_url.as_deref().unwrap_or_default();
                if base_url.trim().is_empty() {
                    return Err(ConfigError::MissingBaseUrl);
                }
                if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
                    return Err(ConfigError::ValidationFailed(format!(
                        "data_source.base_url '{base_url}' must start with http:// or https://"
                    )));
                }
            }
            DataSourceKind::Directory => {
                if config.data_source.directory.as_os_str().is_empty() {
                    return Err(ConfigError::ValidationFailed(
                        "data_source.directory cannot be empty".to_string(),
                    ));
                }
            }
        }
        if config.data_source.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout(0));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::config::{LogFormat, RotationPolicy};

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.data_source.kind, DataSourceKind::Directory);
        assert_eq!(config.logging.level, "info");
        ConfigLoader::validate(&config).expect("Default config should be valid");
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r"
server:
  host: 0.0.0.0
  port: 9000
  enable_cors: false
data_source:
  kind: http
  base_url: http://data.local:8081/service
  timeout_secs: 5
logging:
  level: debug
  format: json
  rotation: hourly
";

        let config: Config = serde_yaml::from_str(yaml).expect("YAML should parse");

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert!(!config.server.enable_cors);
        assert_eq!(config.data_source.kind, DataSourceKind::Http);
        assert_eq!(config.data_source.base_url.as_deref(), Some("http://data.local:8081/service"));
        assert_eq!(config.data_source.timeout_secs, 5);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.rotation, RotationPolicy::Hourly);

        ConfigLoader::validate(&config).expect("Parsed config should be valid");
    }

    #[test]
    fn test_validate_zero_port() {
        let mut config = Config::default();
        config.server.port = 0;
        assert_eq!(ConfigLoader::validate(&config), Err(ConfigError::InvalidPort(0)));
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "invalid".to_string();

        match ConfigLoader::validate(&config).unwrap_err() {
            ConfigError::InvalidLogLevel(level) => assert_eq!(level, "invalid"),
            other => panic!("Expected InvalidLogLevel error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_http_without_base_url() {
        let mut config = Config::default();
        config.data_source.kind = DataSourceKind::Http;
        assert_eq!(ConfigLoader::validate(&config), Err(ConfigError::MissingBaseUrl));

        config.data_source.base_url = Some("ftp://data".to_string());
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::ValidationFailed(_))
        ));
    }

    #[test]
    fn test_validate_zero_timeout() {
        let mut config = Config::default();
        config.data_source.timeout_secs = 0;
        assert_eq!(ConfigLoader::validate(&config), Err(ConfigError::InvalidTimeout(0)));
    }

    #[test]
    fn test_hierarchical_merging() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut base_file = NamedTempFile::new().unwrap();
        writeln!(
            base_file,
            "server:\n  port: 9000\nlogging:\n  level: info\n  format: json"
        )
        .unwrap();
        base_file.flush().unwrap();

        let mut override_file = NamedTempFile::new().unwrap();
        writeln!(override_file, "server:\n  port: 9100\nlogging:\n  level: debug").unwrap();
        override_file.flush().unwrap();

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(base_file.path()))
            .merge(Yaml::file(override_file.path()))
            .extract()
            .unwrap();

        assert_eq!(config.server.port, 9100, "Override should win");
        assert_eq!(
            config.logging.level, "debug",
            "Override should win for nested fields"
        );
        assert_eq!(
            config.logging.format,
            LogFormat::Json,
            "Base value should persist when not overridden"
        );
    }

    #[test]
    fn test_env_override() {
        temp_env::with_vars(
            [
                ("CLUSTERHUB_SERVER__PORT", Some("9191")),
                ("CLUSTERHUB_LOGGING__LEVEL", Some("warn")),
            ],
            || {
                let config = ConfigLoader::load().expect("config should load");
                assert_eq!(config.server.port, 9191);
                assert_eq!(config.logging.level, "warn");
            },
        );
    }

    #[test]
    fn test_load_from_file_validates() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "data_source:\n  kind: http").unwrap();
        file.flush().unwrap();

        let err = ConfigLoader::load_from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("base_url"));
    }
}
