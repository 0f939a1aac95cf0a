//! Remote data-access service.
//!
//! `GET {base_url}/getData?id=..&table=..` answers with a row-oriented JSON
//! document:
//!
//! ```json
//! {
//!   "relation": "weather",
//!   "attributes": [
//!     {"name": "outlook", "type": "nominal", "values": ["sunny", "rainy"]},
//!     {"name": "temperature", "type": "numeric"}
//!   ],
//!   "rows": [["sunny", 85], ["rainy", null]]
//! }
//! ```
//!
//! `null` is a missing value; nominal cells carry their label.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::errors::DataSourceError;
use crate::domain::models::{Attribute, AttributeKind, Dataset, Value};
use crate::domain::ports::DatasetSource;

/// Attribute type on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireKind {
    Numeric,
    Nominal,
    String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireAttribute {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: WireKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
}

/// Dataset document served by the data-access service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireDataset {
    pub relation: String,
    pub attributes: Vec<WireAttribute>,
    pub rows: Vec<Vec<serde_json::Value>>,
}

impl WireDataset {
    /// Convert to a [`Dataset`], resolving nominal labels.
    pub fn into_dataset(self) -> Result<Dataset, DataSourceError> {
        let attributes: Vec<Attribute> = self
            .attributes
            .into_iter()
            .map(|a| match a.kind {
                WireKind::Numeric => Attribute::numeric(a.name),
                WireKind::Nominal => Attribute::nominal(a.name, a.values),
                WireKind::String => Attribute::text(a.name),
            })
            .collect();

        let mut rows = Vec::with_capacity(self.rows.len());
        for (r, row) in self.rows.into_iter().enumerate() {
            if row.len() != attributes.len() {
                return Err(DataSourceError::Parse(format!(
                    "row {r} has {} values, expected {}",
                    row.len(),
                    attributes.len()
                )));
            }
            let values = row
                .into_iter()
                .zip(&attributes)
                .map(|(cell, attr)| cell_value(cell, attr, r))
                .collect::<Result<Vec<_>, _>>()?;
            rows.push(values);
        }

        Ok(Dataset::new(self.relation, attributes, rows)?)
    }
}

fn cell_value(
    cell: serde_json::Value,
    attr: &Attribute,
    row: usize,
) -> Result<Value, DataSourceError> {
    use serde_json::Value as Json;

    let value = match (&attr.kind, &cell) {
        (_, Json::Null) => Some(Value::Missing),
        (AttributeKind::Numeric, Json::Number(n)) => n.as_f64().map(Value::Numeric),
        (AttributeKind::Nominal(_), Json::String(label)) => {
            attr.index_of(label).map(Value::Nominal)
        }
        (AttributeKind::Text, Json::String(text)) => Some(Value::Text(text.clone())),
        _ => None,
    };
    value.ok_or_else(|| {
        DataSourceError::Parse(format!(
            "row {row}, attribute '{}': unexpected value {cell}",
            attr.name
        ))
    })
}

/// Dataset source backed by the remote data-access service.
#[derive(Debug, Clone)]
pub struct HttpDataSource {
    http: Client,
    base_url: String,
}

impl HttpDataSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, DataSourceError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl DatasetSource for HttpDataSource {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn resolve(&self, id: &str, table: &str) -> Result<Dataset, DataSourceError> {
        let url = format!("{}/getData", self.base_url);
        debug!(%url, id, table, "fetching dataset");
        let resp = self
            .http
            .get(&url)
            .query(&[("id", id), ("table", table)])
            .send()
            .await?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(DataSourceError::NotFound {
                id: id.to_string(),
                table: table.to_string(),
            });
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(DataSourceError::Http(format!("getData returned {status}: {body}")));
        }

        let wire: WireDataset = resp
            .json()
            .await
            .map_err(|e| DataSourceError::Parse(format!("getData body: {e}")))?;
        wire.into_dataset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn body() -> String {
        serde_json::json!({
            "relation": "weather",
            "attributes": [
                {"name": "outlook", "type": "nominal", "values": ["sunny", "overcast", "rainy"]},
                {"name": "temperature", "type": "numeric"},
                {"name": "note", "type": "string"}
            ],
            "rows": [["sunny", 85, "hot"], ["rainy", null, null], [null, 70.5, "mild"]]
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_fetches_and_converts() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/getData")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("id".into(), "42".into()),
                Matcher::UrlEncoded("table".into(), "weather".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body())
            .create_async()
            .await;

        let source = HttpDataSource::new(server.url(), Duration::from_secs(5)).unwrap();
        let dataset = source.resolve("42", "weather").await.unwrap();
        mock.assert_async().await;

        assert_eq!(dataset.relation(), "weather");
        assert_eq!(dataset.num_instances(), 3);
        assert_eq!(dataset.instances()[0][0], Value::Nominal(0));
        assert_eq!(dataset.instances()[1][1], Value::Missing);
        assert_eq!(dataset.instances()[2][1], Value::Numeric(70.5));
        assert_eq!(dataset.instances()[0][2], Value::Text("hot".into()));
    }

    #[tokio::test]
    async fn test_not_found() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/getData")
            .match_query(Matcher::Any)
            .with_status(404)
            .create_async()
            .await;

        let source = HttpDataSource::new(server.url(), Duration::from_secs(5)).unwrap();
        assert!(matches!(
            source.resolve("1", "t").await,
            Err(DataSourceError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_server_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/getData")
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let source = HttpDataSource::new(server.url(), Duration::from_secs(5)).unwrap();
        let err = source.resolve("1", "t").await.unwrap_err();
        assert!(matches!(err, DataSourceError::Http(ref m) if m.contains("boom")));
    }

    #[test]
    fn test_unknown_label_is_parse_error() {
        let wire = WireDataset {
            relation: "r".into(),
            attributes: vec![WireAttribute {
                name: "c".into(),
                kind: WireKind::Nominal,
                values: vec!["a".into()],
            }],
            rows: vec![vec![serde_json::json!("b")]],
        };
        assert!(matches!(wire.into_dataset(), Err(DataSourceError::Parse(_))));
    }

    #[test]
    fn test_ragged_row_is_parse_error() {
        let wire = WireDataset {
            relation: "r".into(),
            attributes: vec![WireAttribute {
                name: "x".into(),
                kind: WireKind::Numeric,
                values: vec![],
            }],
            rows: vec![vec![serde_json::json!(1), serde_json::json!(2)]],
        };
        assert!(matches!(wire.into_dataset(), Err(DataSourceError::Parse(_))));
    }
}
