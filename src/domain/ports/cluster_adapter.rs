//! Cluster adapter port - interface for clustering algorithm families.

use crate::domain::errors::{ConfigurationError, EvaluationError, FitError, PopulateError};
use crate::domain::models::{AlgorithmKind, ClusterOutput, Dataset, EvaluationSummary};

/// What an adapter reports after a run.
#[derive(Debug, Clone, PartialEq)]
pub struct Population {
    pub output: ClusterOutput,
    /// One line per field that could not be produced for this run.
    pub notes: Vec<String>,
}

impl Population {
    pub const fn new(output: ClusterOutput) -> Self {
        Self {
            output,
            notes: Vec::new(),
        }
    }

    pub fn note(&mut self, message: impl Into<String>) {
        self.notes.push(message.into());
    }
}

/// Trait for clustering algorithm families.
///
/// An adapter wraps one clustering algorithm behind a uniform
/// configure / fit / evaluate / populate lifecycle. Instances hold
/// per-run state and must not be reused across requests.
pub trait ClusterAdapter: Send {
    /// Family this adapter implements.
    fn kind(&self) -> AlgorithmKind;

    /// Option tokens used when the caller's tokens cannot be applied.
    fn default_options(&self) -> Vec<String>;

    /// Revision string echoed in the envelope.
    fn revision(&self) -> &'static str;

    /// Reset to defaults and apply `options`. Leaves defaults in place on error.
    fn configure(&mut self, options: &[String]) -> Result<(), ConfigurationError>;

    /// Build the model from `dataset`.
    fn fit(&mut self, dataset: &Dataset) -> Result<(), FitError>;

    /// Assign every instance of `dataset` to the fitted model.
    fn evaluate(&mut self, dataset: &Dataset) -> Result<EvaluationSummary, EvaluationError>;

    /// Snapshot this family's output fields.
    fn populate(&self) -> Result<Population, PopulateError>;
}

/// Factory for creating adapter instances.
pub trait AdapterFactory: Send + Sync {
    /// Create a fresh adapter for `kind`.
    fn create(&self, kind: AlgorithmKind) -> Box<dyn ClusterAdapter>;
}
