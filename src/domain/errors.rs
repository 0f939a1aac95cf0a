//! Domain errors for the clustering service.
//!
//! Each adapter operation has its own error type so the dispatcher can tell
//! a recoverable option problem from a fatal data problem without inspecting
//! messages.

use thiserror::Error;

/// Option tokens are not well-formed for the selected family.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Illegal option: {0}")]
    UnknownOption(String),

    #[error("Option {0} requires a value")]
    MissingValue(String),

    #[error("Invalid value '{value}' for option {flag}: {reason}")]
    InvalidValue {
        flag: String,
        value: String,
        reason: String,
    },

    #[error("Value {value} for option {flag} is out of range: {reason}")]
    OutOfRange {
        flag: String,
        value: String,
        reason: String,
    },
}

/// The dataset cannot be used by the selected family.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FitError {
    #[error("Dataset has no instances")]
    EmptyDataset,

    #[error("Cannot handle {kind} attribute '{attribute}'")]
    UnsupportedAttribute { attribute: String, kind: String },

    #[error("Invalid cluster count: requested {requested}, only {available} usable instances")]
    InvalidClusterCount { requested: usize, available: usize },

    #[error("Adapter was not configured before fitting")]
    NotConfigured,

    #[error("Clustering failed: {0}")]
    Engine(String),
}

/// The fitted model could not be evaluated.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EvaluationError {
    #[error("Model has not been fitted")]
    NotFitted,

    #[error("Evaluation failed: {0}")]
    Engine(String),
}

/// The adapter has no model to report.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PopulateError {
    #[error("Model has not been fitted")]
    NotFitted,
}

/// A dataset reference could not be resolved.
#[derive(Debug, Error)]
pub enum DataSourceError {
    #[error("Dataset not found: id={id}, table={table}")]
    NotFound { id: String, table: String },

    #[error("Invalid dataset reference: {0}")]
    InvalidReference(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Data service request failed: {0}")]
    Http(String),

    #[error("Malformed dataset: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for DataSourceError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.to_string())
    }
}

impl From<crate::domain::models::DatasetError> for DataSourceError {
    fn from(err: crate::domain::models::DatasetError) -> Self {
        Self::Parse(err.to_string())
    }
}

/// Envelope encoding or decoding failed.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unsupported envelope schema '{schema}' version {version}")]
    UnsupportedSchema { schema: String, version: u32 },
}
