//! Clusterer adapters: one [`ClusterAdapter`] per algorithm family.
//!
//! Each adapter owns its option grammar and wraps one engine algorithm from
//! [`crate::infrastructure::clustering`]. Adapters are created fresh for
//! every run through [`ClustererRegistry`].
//!
//! [`ClusterAdapter`]: crate::domain::ports::ClusterAdapter

pub mod cobweb;
pub mod em;
pub mod farthest_first;
pub mod hierarchical;
mod options;
pub mod registry;
pub mod simple_kmeans;

pub use cobweb::CobwebAdapter;
pub use em::EmAdapter;
pub use farthest_first::FarthestFirstAdapter;
pub use hierarchical::HierarchicalAdapter;
pub use registry::ClustererRegistry;
pub use simple_kmeans::SimpleKMeansAdapter;

use crate::domain::errors::{EvaluationError, FitError};
use crate::domain::models::{
    Attribute, AttributeKind, Dataset, DistanceFunctionSnapshot, EvaluationSummary, Value,
};
use crate::infrastructure::clustering::{
    self as engine, ClusterEvaluation, Clusterer, Metric, Table,
};

impl From<engine::Error> for FitError {
    fn from(err: engine::Error) -> Self {
        match err {
            engine::Error::EmptyInput => Self::EmptyDataset,
            engine::Error::UnsupportedAttribute { name, kind } => Self::UnsupportedAttribute {
                attribute: name,
                kind: kind.to_string(),
            },
            engine::Error::InvalidClusterCount { requested, n_items } => Self::InvalidClusterCount {
                requested,
                available: n_items,
            },
            other => Self::Engine(other.to_string()),
        }
    }
}

impl From<engine::Error> for EvaluationError {
    fn from(err: engine::Error) -> Self {
        Self::Engine(err.to_string())
    }
}

impl From<ClusterEvaluation> for EvaluationSummary {
    fn from(eval: ClusterEvaluation) -> Self {
        let summary = eval.summary();
        Self {
            cluster_counts: eval.cluster_counts,
            unclustered: eval.unclustered,
            log_likelihood: eval.log_likelihood,
            summary,
        }
    }
}

/// Encode `dataset` and reject empty input before any engine call.
pub(crate) fn training_table(dataset: &Dataset) -> Result<Table, FitError> {
    let table = Table::from_dataset(dataset)?;
    if table.is_empty() {
        return Err(FitError::EmptyDataset);
    }
    Ok(table)
}

/// Assign every instance of `dataset` to `model`.
pub(crate) fn evaluate_model(
    model: Option<&dyn Clusterer>,
    dataset: &Dataset,
) -> Result<EvaluationSummary, EvaluationError> {
    let model = model.ok_or(EvaluationError::NotFitted)?;
    let table = Table::from_dataset(dataset)?;
    Ok(engine::evaluate(model, &table)?.into())
}

/// Turn encoded rows back into instances of `attributes`.
///
/// `NaN` becomes a missing value; nominal cells are rounded to the nearest
/// domain index and clamped into the domain.
pub(crate) fn decode_rows(attributes: &[Attribute], rows: &[Vec<f64>]) -> Vec<Vec<Value>> {
    rows.iter()
        .map(|row| {
            row.iter()
                .zip(attributes)
                .map(|(&v, attr)| match &attr.kind {
                    _ if v.is_nan() => Value::Missing,
                    AttributeKind::Numeric => Value::Numeric(v),
                    AttributeKind::Nominal(domain) => {
                        let last = domain.len().saturating_sub(1);
                        Value::Nominal((v.round().max(0.0) as usize).min(last))
                    }
                    AttributeKind::Text => Value::Missing,
                })
                .collect()
        })
        .collect()
}

/// ARFF text of `rows` under the header of `template`.
pub(crate) fn arff_snapshot(template: &Dataset, rows: &[Vec<f64>]) -> Result<String, FitError> {
    let decoded = decode_rows(template.attributes(), rows);
    template
        .with_instances(template.relation(), decoded)
        .map(|d| d.to_string())
        .map_err(|e| FitError::Engine(e.to_string()))
}

/// Primitive description of the distance used on `dataset`.
pub(crate) fn distance_snapshot(metric: Metric, dataset: &Dataset) -> DistanceFunctionSnapshot {
    DistanceFunctionSnapshot {
        name: metric.name().to_string(),
        instances: dataset.to_string(),
        attribute_indices: "first-last".to_string(),
        invert_selection: false,
        options: vec!["-R".to_string(), "first-last".to_string()],
    }
}

/// Parse a distance name such as `Euclidean` or `ManhattanDistance`.
pub(crate) fn parse_metric(name: &str) -> Option<Metric> {
    let name = name.trim().to_ascii_lowercase();
    let name = name.strip_suffix("distance").unwrap_or(&name);
    match name {
        "euclidean" => Some(Metric::Euclidean),
        "manhattan" => Some(Metric::Manhattan),
        _ => None,
    }
}
