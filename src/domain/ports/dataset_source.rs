//! Dataset source port - resolves `(id, table)` references to datasets.

use async_trait::async_trait;

use crate::domain::errors::DataSourceError;
use crate::domain::models::Dataset;

/// Backend that turns a dataset reference into a [`Dataset`].
#[async_trait]
pub trait DatasetSource: Send + Sync {
    /// Backend name for logs.
    fn name(&self) -> &'static str;

    /// Resolve the dataset stored under `id` / `table`.
    async fn resolve(&self, id: &str, table: &str) -> Result<Dataset, DataSourceError>;
}
