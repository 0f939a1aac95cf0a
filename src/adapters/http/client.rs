//! Typed client for a running clusterhub server.

use reqwest::Client;
use thiserror::Error;

use crate::domain::errors::CodecError;
use crate::domain::models::{AlgorithmEntry, ResultEnvelope};
use crate::services::envelope_codec;

/// Client-side failures. Domain failures arrive inside the envelope.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status}: {body}")]
    Status { status: reqwest::StatusCode, body: String },

    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// HTTP client for the `getAlgorithms` and `runAlgorithm` endpoints.
#[derive(Debug, Clone)]
pub struct ClusterServiceClient {
    http: Client,
    base_url: String,
}

impl ClusterServiceClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Registered algorithms, in code order.
    pub async fn get_algorithms(&self) -> Result<Vec<AlgorithmEntry>, ClientError> {
        let resp = self
            .http
            .get(format!("{}/getAlgorithms", self.base_url))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        let resp = check_status(resp).await?;
        Ok(resp.json().await?)
    }

    /// Run one algorithm and decode the envelope.
    pub async fn run_algorithm(
        &self,
        algorithm_type: i64,
        id: &str,
        table: &str,
        options: Option<&str>,
    ) -> Result<ResultEnvelope, ClientError> {
        let code = algorithm_type.to_string();
        let mut query = vec![("algorithmType", code.as_str()), ("id", id), ("table", table)];
        if let Some(options) = options {
            query.push(("options", options));
        }

        let resp = self
            .http
            .get(format!("{}/runAlgorithm", self.base_url))
            .query(&query)
            .send()
            .await?;
        let resp = check_status(resp).await?;
        let text = resp.text().await?;
        Ok(envelope_codec::decode(&text)?)
    }
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = resp.status();
    if status.is_success() {
        Ok(resp)
    } else {
        let body = resp.text().await.unwrap_or_default();
        Err(ClientError::Status { status, body })
    }
}
