//! In-memory dataset source for tests and embedding.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::errors::DataSourceError;
use crate::domain::models::Dataset;
use crate::domain::ports::DatasetSource;

/// Datasets keyed by `(id, table)`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDataSource {
    datasets: HashMap<(String, String), Dataset>,
}

impl InMemoryDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_dataset(
        mut self,
        id: impl Into<String>,
        table: impl Into<String>,
        dataset: Dataset,
    ) -> Self {
        self.insert(id, table, dataset);
        self
    }

    pub fn insert(&mut self, id: impl Into<String>, table: impl Into<String>, dataset: Dataset) {
        self.datasets.insert((id.into(), table.into()), dataset);
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}

#[async_trait]
impl DatasetSource for InMemoryDataSource {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn resolve(&self, id: &str, table: &str) -> Result<Dataset, DataSourceError> {
        self.datasets
            .get(&(id.to_string(), table.to_string()))
            .cloned()
            .ok_or_else(|| DataSourceError::NotFound {
                id: id.to_string(),
                table: table.to_string(),
            })
    }
}
