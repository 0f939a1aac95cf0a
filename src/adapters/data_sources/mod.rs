//! Dataset sources: resolve `(id, table)` references to datasets.

pub mod directory;
pub mod http;
pub mod memory;

use std::sync::Arc;
use std::time::Duration;

pub use directory::DirectoryDataSource;
pub use http::HttpDataSource;
pub use memory::InMemoryDataSource;

use crate::domain::errors::DataSourceError;
use crate::domain::models::{DataSourceConfig, DataSourceKind};
use crate::domain::ports::DatasetSource;

/// Build the configured dataset source.
pub fn from_config(config: &DataSourceConfig) -> Result<Arc<dyn DatasetSource>, DataSourceError> {
    match config.kind {
        DataSourceKind::Directory => Ok(Arc::new(DirectoryDataSource::new(&config.directory))),
        DataSourceKind::Http => {
            let base_url = config.base_url.as_deref().ok_or_else(|| {
                DataSourceError::InvalidReference("data_source.base_url is not set".to_string())
            })?;
            Ok(Arc::new(HttpDataSource::new(
                base_url,
                Duration::from_secs(config.timeout_secs),
            )?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_picks_backend() {
        let source = from_config(&DataSourceConfig::default()).unwrap();
        assert_eq!(source.name(), "directory");

        let http = DataSourceConfig {
            kind: DataSourceKind::Http,
            base_url: Some("http://localhost:9000".into()),
            ..DataSourceConfig::default()
        };
        assert_eq!(from_config(&http).unwrap().name(), "http");
    }

    #[test]
    fn test_http_without_base_url() {
        let http = DataSourceConfig {
            kind: DataSourceKind::Http,
            ..DataSourceConfig::default()
        };
        assert!(from_config(&http).is_err());
    }
}
