//! Transport boundary for `runAlgorithm`.
//!
//! Validates the raw request parameters, parses the option string, resolves
//! the dataset and hands the run to the [`Dispatcher`] on the blocking pool.
//! Every outcome, including bad requests, is a [`ResultEnvelope`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, instrument, warn};

use crate::domain::models::{parse_option_string, AlgorithmEntry, FailureKind, ResultEnvelope};
use crate::domain::ports::DatasetSource;

use super::dispatcher::Dispatcher;

/// Raw `runAlgorithm` parameters as they arrive on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRequest {
    /// Registry code, still unparsed.
    pub algorithm_type: Option<String>,
    /// Dataset id.
    pub id: Option<String>,
    /// Table within the dataset.
    pub table: Option<String>,
    /// `;`-separated option tokens.
    pub options: Option<String>,
    /// Sent by legacy clients; ignored.
    pub location: Option<String>,
}

impl RunRequest {
    pub fn new(algorithm_type: i64, id: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            algorithm_type: Some(algorithm_type.to_string()),
            id: Some(id.into()),
            table: Some(table.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: impl Into<String>) -> Self {
        self.options = Some(options.into());
        self
    }

    /// Names of absent required parameters, in declaration order.
    pub fn missing_parameters(&self) -> Vec<&'static str> {
        [
            ("algorithmType", &self.algorithm_type),
            ("id", &self.id),
            ("table", &self.table),
        ]
        .into_iter()
        .filter(|(_, value)| value.as_deref().is_none_or(|v| v.trim().is_empty()))
        .map(|(name, _)| name)
        .collect()
    }
}

/// Request-level entry point shared by the HTTP server and the CLI.
pub struct RunService {
    dispatcher: Arc<Dispatcher>,
    source: Arc<dyn DatasetSource>,
}

impl RunService {
    pub fn new(dispatcher: Arc<Dispatcher>, source: Arc<dyn DatasetSource>) -> Self {
        Self { dispatcher, source }
    }

    /// Registry contents in code order.
    pub fn list_algorithms(&self) -> Vec<AlgorithmEntry> {
        self.dispatcher.registry().list_algorithms().to_vec()
    }

    /// Handle one `runAlgorithm` request.
    #[instrument(skip(self, request), fields(
        algorithm_type = request.algorithm_type.as_deref(),
        id = request.id.as_deref(),
        table = request.table.as_deref(),
        source = self.source.name(),
    ))]
    pub async fn run(&self, request: RunRequest) -> ResultEnvelope {
        let missing = request.missing_parameters();
        if !missing.is_empty() {
            let message = format!("missing required parameter(s): {}", missing.join(", "));
            warn!("{message}");
            return ResultEnvelope::diagnostic(FailureKind::MissingParameters, message);
        }
        let (Some(raw_code), Some(id), Some(table)) =
            (request.algorithm_type, request.id, request.table)
        else {
            return ResultEnvelope::diagnostic(
                FailureKind::MissingParameters,
                "missing required parameter(s)",
            );
        };

        let code = match raw_code.trim().parse::<i64>() {
            Ok(code) => code,
            Err(_) => {
                let message = format!("invalid algorithmType '{raw_code}': expected an integer");
                warn!("{message}");
                return ResultEnvelope::diagnostic(FailureKind::InvalidParameter, message);
            }
        };
        let options = parse_option_string(request.options.as_deref().unwrap_or_default());

        let dataset = match self.source.resolve(&id, &table).await {
            Ok(dataset) => dataset,
            Err(err) => {
                let message = format!("cannot load dataset id={id} table={table}: {err}");
                warn!("{message}");
                let mut envelope =
                    ResultEnvelope::diagnostic(FailureKind::DatasetUnavailable, message);
                envelope.options = options;
                return envelope;
            }
        };

        let dispatcher = Arc::clone(&self.dispatcher);
        tokio::task::spawn_blocking(move || dispatcher.run(code, &dataset, &options))
            .await
            .unwrap_or_else(|err| {
                error!(error = %err, "run task did not complete");
                ResultEnvelope::diagnostic(
                    FailureKind::Fit,
                    format!("run terminated unexpectedly: {err}"),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clusterers::ClustererRegistry;
    use crate::adapters::data_sources::InMemoryDataSource;
    use crate::domain::models::{Attribute, Dataset, Value};
    use crate::services::AlgorithmRegistry;

    fn service() -> (RunService, Arc<AlgorithmRegistry>) {
        let registry = Arc::new(AlgorithmRegistry::standard());
        let dispatcher = Arc::new(Dispatcher::new(
            Arc::clone(&registry),
            Arc::new(ClustererRegistry::new()),
        ));
        let dataset = Dataset::new(
            "points",
            vec![Attribute::numeric("x"), Attribute::numeric("y")],
            vec![
                vec![Value::Numeric(0.0), Value::Numeric(0.0)],
                vec![Value::Numeric(0.1), Value::Numeric(0.2)],
                vec![Value::Numeric(5.0), Value::Numeric(5.0)],
                vec![Value::Numeric(5.2), Value::Numeric(4.9)],
            ],
        )
        .unwrap();
        let source = InMemoryDataSource::new().with_dataset("demo", "points", dataset);
        (RunService::new(dispatcher, Arc::new(source)), registry)
    }

    #[test]
    fn test_missing_parameters_order() {
        let request = RunRequest {
            table: Some("t".into()),
            ..RunRequest::default()
        };
        assert_eq!(request.missing_parameters(), vec!["algorithmType", "id"]);
        assert!(RunRequest::new(1, "a", "b").missing_parameters().is_empty());
    }

    #[tokio::test]
    async fn test_missing_parameters_skip_registry() {
        let (service, registry) = service();
        let envelope = service.run(RunRequest::default()).await;
        assert_eq!(envelope.failure, Some(FailureKind::MissingParameters));
        assert!(envelope
            .log
            .contains("missing required parameter(s): algorithmType, id, table"));
        assert_eq!(registry.lookup_count(), 0);
    }

    #[tokio::test]
    async fn test_blank_parameter_counts_as_missing() {
        let (service, _) = service();
        let mut request = RunRequest::new(1, "demo", "points");
        request.id = Some("  ".into());
        let envelope = service.run(request).await;
        assert!(envelope.log.contains("missing required parameter(s): id"));
    }

    #[tokio::test]
    async fn test_non_integer_algorithm_type() {
        let (service, registry) = service();
        let mut request = RunRequest::new(1, "demo", "points");
        request.algorithm_type = Some("kmeans".into());
        let envelope = service.run(request).await;
        assert_eq!(envelope.failure, Some(FailureKind::InvalidParameter));
        assert_eq!(registry.lookup_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_dataset() {
        let (service, _) = service();
        let envelope = service.run(RunRequest::new(1, "demo", "nope")).await;
        assert_eq!(envelope.failure, Some(FailureKind::DatasetUnavailable));
        assert!(envelope.is_diagnostic_only());
    }

    #[tokio::test]
    async fn test_run_with_options() {
        let (service, registry) = service();
        let request = RunRequest::new(1, "demo", "points").with_options("O;N 2");
        let envelope = service.run(request).await;
        assert!(envelope.correct);
        assert_eq!(envelope.options, vec!["-O", "-N", "2"]);
        assert_eq!(envelope.evaluation().unwrap().cluster_counts, vec![2, 2]);
        assert_eq!(registry.lookup_count(), 1);
    }

    #[test]
    fn test_request_deserializes_camel_case() {
        let json = r#"{"algorithmType":"2","id":"a","table":"b","location":"x"}"#;
        let request: RunRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.algorithm_type.as_deref(), Some("2"));
        assert_eq!(request.location.as_deref(), Some("x"));
    }
}
