//! The uniform, transportable result of a clustering run.
//!
//! Every response carries one [`ResultEnvelope`]. Run metadata is always
//! present; the data region is a single `Option<RunReport>` whose
//! [`ClusterOutput`] variant holds only the fields its family produces.
//! A run that failed carries no report at all, so an envelope is either
//! fully populated or diagnostic-only.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::algorithm::AlgorithmKind;

/// First line of every rendered diagnostic log.
pub const LOG_HEADER: &str = "==== clusterhub run diagnostics ====";

/// Why a run produced no data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// One or more required request parameters were absent.
    MissingParameters,
    /// A request parameter was present but unusable.
    InvalidParameter,
    /// The dataset reference could not be resolved.
    DatasetUnavailable,
    /// The algorithm code is not in the registry.
    UnknownAlgorithm,
    /// Neither the caller's nor the default options could be applied.
    Configuration,
    /// The dataset is incompatible with the selected family.
    Fit,
    /// The fitted model could not be evaluated against the dataset.
    Evaluation,
}

/// Accumulating, line-oriented diagnostic log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiagnosticLog {
    lines: Vec<String>,
}

impl DiagnosticLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `message` attributed to `source` (an algorithm name or "service").
    pub fn push(&mut self, source: &str, message: impl AsRef<str>) {
        self.lines.push(format!("[INFO] {source}: {}", message.as_ref()));
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|l| l.contains(needle))
    }

    /// Render the log as free text, header first.
    pub fn render(&self) -> String {
        let mut out = String::from(LOG_HEADER);
        for line in &self.lines {
            out.push('\n');
            out.push_str(line);
        }
        out
    }
}

/// Primitive snapshot of a fitted distance function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistanceFunctionSnapshot {
    /// Distance name, e.g. `EuclideanDistance`.
    pub name: String,
    /// ARFF text of the instances the distance was normalised against.
    pub instances: String,
    /// Attribute range selector, e.g. `first-last`.
    pub attribute_indices: String,
    pub invert_selection: bool,
    pub options: Vec<String>,
}

/// Text format of a graph snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphType {
    /// Graphviz `digraph` text.
    Tree,
    /// Newick tree text.
    Newick,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub graph_type: GraphType,
    pub text: String,
}

/// Normal distribution fitted to one numeric attribute within one cluster.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalEstimate {
    pub mean: f64,
    pub std_dev: f64,
    /// Sum of instance weights that contributed to the estimate.
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CentroidOutput {
    /// Requested number of clusters.
    pub num_clusters: usize,
    /// Number of non-empty clusters produced.
    pub number_of_clusters: usize,
    pub cluster_sizes: Vec<usize>,
    /// ARFF snapshot, one row per cluster.
    pub centroids: String,
    /// `[cluster][attribute][value]` frequency counts; empty for numeric attributes.
    pub nominal_counts: Vec<Vec<Vec<usize>>>,
    /// ARFF snapshot of per-cluster standard deviations.
    pub std_devs: String,
    pub distance_function: DistanceFunctionSnapshot,
    pub squared_error: f64,
    pub max_iterations: usize,
    pub iterations: usize,
    /// Instance to cluster index map; present only when instance order was preserved.
    pub assignments: Option<Vec<usize>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbabilisticOutput {
    /// Requested number of clusters; `-1` asks for cross-validated selection.
    pub num_clusters: i64,
    pub number_of_clusters: usize,
    pub cluster_priors: Vec<f64>,
    /// `[cluster][attribute]`; `None` for non-numeric attributes.
    pub numeric_models: Vec<Vec<Option<NormalEstimate>>>,
    pub min_std_dev: f64,
    pub max_iterations: usize,
    pub iterations: usize,
    /// Mean log-likelihood of the training data.
    pub log_likelihood: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchicalOutput {
    pub num_clusters: usize,
    pub number_of_clusters: usize,
    pub link_type: String,
    pub print_newick: bool,
    pub distance_function: DistanceFunctionSnapshot,
    pub graph: GraphSnapshot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptualOutput {
    pub acuity: f64,
    pub cutoff: f64,
    pub number_of_clusters: usize,
    pub graph: GraphSnapshot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedBasedOutput {
    pub num_clusters: usize,
    pub number_of_clusters: usize,
}

/// Family-specific model output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum ClusterOutput {
    CentroidBased(CentroidOutput),
    Probabilistic(ProbabilisticOutput),
    Hierarchical(HierarchicalOutput),
    Conceptual(ConceptualOutput),
    SeedBased(SeedBasedOutput),
}

impl ClusterOutput {
    pub const fn kind(&self) -> AlgorithmKind {
        match self {
            Self::CentroidBased(_) => AlgorithmKind::SimpleKMeans,
            Self::Probabilistic(_) => AlgorithmKind::Em,
            Self::Hierarchical(_) => AlgorithmKind::Hierarchical,
            Self::Conceptual(_) => AlgorithmKind::Cobweb,
            Self::SeedBased(_) => AlgorithmKind::FarthestFirst,
        }
    }

    pub const fn number_of_clusters(&self) -> usize {
        match self {
            Self::CentroidBased(o) => o.number_of_clusters,
            Self::Probabilistic(o) => o.number_of_clusters,
            Self::Hierarchical(o) => o.number_of_clusters,
            Self::Conceptual(o) => o.number_of_clusters,
            Self::SeedBased(o) => o.number_of_clusters,
        }
    }
}

/// Statistics from assigning the training instances back to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    /// Instances per cluster, indexed by cluster number.
    pub cluster_counts: Vec<usize>,
    /// Instances the model refused to place.
    pub unclustered: usize,
    /// Mean log-likelihood, for density-based models.
    pub log_likelihood: Option<f64>,
    /// Human-readable cluster distribution.
    pub summary: String,
}

/// Data region of a successful run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub evaluation: EvaluationSummary,
    pub output: ClusterOutput,
}

/// Uniform response of every run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEnvelope {
    pub run_id: Uuid,
    pub algorithm_type: Option<u8>,
    pub algorithm_name: Option<String>,
    pub correct: bool,
    pub failure: Option<FailureKind>,
    pub log: DiagnosticLog,
    pub options: Vec<String>,
    pub revision: Option<String>,
    report: Option<RunReport>,
}

impl Default for ResultEnvelope {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultEnvelope {
    /// Fresh envelope for a new run: correct, no data.
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            algorithm_type: None,
            algorithm_name: None,
            correct: true,
            failure: None,
            log: DiagnosticLog::new(),
            options: Vec::new(),
            revision: None,
            report: None,
        }
    }

    /// Diagnostic-only envelope produced before any adapter runs.
    pub fn diagnostic(failure: FailureKind, message: impl AsRef<str>) -> Self {
        let mut envelope = Self::new();
        envelope.log.push("service", message);
        envelope.fail(failure);
        envelope
    }

    /// Mark the run as failed and drop every data field.
    pub fn fail(&mut self, failure: FailureKind) {
        self.correct = false;
        self.failure = Some(failure);
        self.report = None;
    }

    /// Attach the data region. Ignored once the run has failed.
    pub fn set_report(&mut self, report: RunReport) -> bool {
        if self.correct {
            self.report = Some(report);
            true
        } else {
            false
        }
    }

    pub const fn report(&self) -> Option<&RunReport> {
        self.report.as_ref()
    }

    pub fn output(&self) -> Option<&ClusterOutput> {
        self.report.as_ref().map(|r| &r.output)
    }

    pub fn evaluation(&self) -> Option<&EvaluationSummary> {
        self.report.as_ref().map(|r| &r.evaluation)
    }

    pub const fn is_diagnostic_only(&self) -> bool {
        self.report.is_none()
    }

    /// `correct == false` implies no data and a recorded failure kind.
    pub const fn is_consistent(&self) -> bool {
        if self.correct {
            self.failure.is_none()
        } else {
            self.report.is_none() && self.failure.is_some()
        }
    }

    /// The diagnostic log as free text.
    pub fn info(&self) -> String {
        self.log.render()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed_report() -> RunReport {
        RunReport {
            evaluation: EvaluationSummary {
                cluster_counts: vec![3],
                unclustered: 0,
                log_likelihood: None,
                summary: String::new(),
            },
            output: ClusterOutput::SeedBased(SeedBasedOutput {
                num_clusters: 1,
                number_of_clusters: 1,
            }),
        }
    }

    #[test]
    fn test_new_envelope_is_correct_and_empty() {
        let envelope = ResultEnvelope::new();
        assert!(envelope.correct);
        assert!(envelope.is_diagnostic_only());
        assert!(envelope.is_consistent());
    }

    #[test]
    fn test_fail_drops_report() {
        let mut envelope = ResultEnvelope::new();
        assert!(envelope.set_report(seed_report()));
        envelope.fail(FailureKind::Fit);
        assert!(!envelope.correct);
        assert!(envelope.report().is_none());
        assert!(envelope.is_consistent());
        assert!(!envelope.set_report(seed_report()));
        assert!(envelope.report().is_none());
    }

    #[test]
    fn test_diagnostic_envelope() {
        let envelope = ResultEnvelope::diagnostic(FailureKind::MissingParameters, "missing id");
        assert!(!envelope.correct);
        assert_eq!(envelope.failure, Some(FailureKind::MissingParameters));
        assert!(envelope.info().starts_with(LOG_HEADER));
        assert!(envelope.info().ends_with("[INFO] service: missing id"));
    }

    #[test]
    fn test_output_kind() {
        assert_eq!(seed_report().output.kind(), AlgorithmKind::FarthestFirst);
        assert_eq!(seed_report().output.number_of_clusters(), 1);
    }
}
