//! ARFF files on disk, laid out as `<root>/<id>/<table>.arff`.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::errors::DataSourceError;
use crate::domain::models::Dataset;
use crate::domain::ports::DatasetSource;
use crate::infrastructure::arff::parse_arff;

/// Directory-backed dataset source.
#[derive(Debug, Clone)]
pub struct DirectoryDataSource {
    root: PathBuf,
}

impl DirectoryDataSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// File a reference maps to. References are single path components.
    pub fn path_for(&self, id: &str, table: &str) -> Result<PathBuf, DataSourceError> {
        check_component(id)?;
        check_component(table)?;
        Ok(self.root.join(id).join(format!("{table}.arff")))
    }
}

fn check_component(part: &str) -> Result<(), DataSourceError> {
    if part.is_empty() || part == "." || part.contains("..") || part.contains(['/', '\\']) {
        return Err(DataSourceError::InvalidReference(part.to_string()));
    }
    Ok(())
}

#[async_trait]
impl DatasetSource for DirectoryDataSource {
    fn name(&self) -> &'static str {
        "directory"
    }

    async fn resolve(&self, id: &str, table: &str) -> Result<Dataset, DataSourceError> {
        let path = self.path_for(id, table)?;
        debug!(path = %path.display(), "reading dataset");
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(DataSourceError::NotFound {
                    id: id.to_string(),
                    table: table.to_string(),
                })
            }
            Err(err) => return Err(err.into()),
        };
        Ok(parse_arff(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TINY: &str = "@relation tiny\n@attribute x numeric\n@data\n1\n2\n";

    #[tokio::test]
    async fn test_resolves_arff_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("demo")).unwrap();
        std::fs::write(dir.path().join("demo").join("tiny.arff"), TINY).unwrap();

        let source = DirectoryDataSource::new(dir.path());
        let dataset = source.resolve("demo", "tiny").await.unwrap();
        assert_eq!(dataset.relation(), "tiny");
        assert_eq!(dataset.num_instances(), 2);
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let source = DirectoryDataSource::new(dir.path());
        assert!(matches!(
            source.resolve("demo", "absent").await,
            Err(DataSourceError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_rejects_traversal() {
        let source = DirectoryDataSource::new("data");
        for (id, table) in [("..", "x"), ("a/b", "x"), ("a", "../etc"), ("", "x"), ("a", "x\\y")] {
            let result = source.resolve(id, table).await;
            assert!(
                matches!(result, Err(DataSourceError::InvalidReference(_))),
                "{id}/{table}"
            );
        }
    }

    #[tokio::test]
    async fn test_malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("demo")).unwrap();
        std::fs::write(dir.path().join("demo").join("bad.arff"), "no header here").unwrap();
        let source = DirectoryDataSource::new(dir.path());
        assert!(matches!(
            source.resolve("demo", "bad").await,
            Err(DataSourceError::Parse(_))
        ));
    }
}
