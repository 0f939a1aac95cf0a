//! Probabilistic family (EM).

use crate::domain::errors::{ConfigurationError, EvaluationError, FitError, PopulateError};
use crate::domain::models::{
    AlgorithmKind, ClusterOutput, Dataset, EvaluationSummary, NormalEstimate, ProbabilisticOutput,
};
use crate::domain::ports::{ClusterAdapter, Population};
use crate::infrastructure::clustering::{Clusterer, Em, EmModel, Estimator};

use super::options::{read_settings, Arity, Setting};
use super::{evaluate_model, training_table};

const FLAGS: &[(&str, Arity)] = &[
    ("-N", Arity::Value),
    ("-I", Arity::Value),
    ("-M", Arity::Value),
    ("-S", Arity::Value),
    ("-X", Arity::Value),
    ("-max", Arity::Value),
];

#[derive(Debug, Clone, PartialEq)]
struct Settings {
    /// `None` selects the count by cross-validation (`-N -1`).
    num_clusters: Option<usize>,
    max_iterations: usize,
    min_std_dev: f64,
    seed: u64,
    folds: usize,
    max_clusters: Option<usize>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            num_clusters: None,
            max_iterations: 100,
            min_std_dev: 1e-6,
            seed: 100,
            folds: 10,
            max_clusters: None,
        }
    }
}

/// `-1` means "unset"; anything else must be a positive count.
fn optional_count(setting: &Setting<'_>) -> Result<Option<usize>, ConfigurationError> {
    let v: i64 = setting.parse("an integer")?;
    match v {
        -1 => Ok(None),
        v if v >= 1 => Ok(usize::try_from(v).ok()),
        _ => Err(setting.out_of_range("must be -1 or at least 1")),
    }
}

impl Settings {
    fn parse(tokens: &[String]) -> Result<Self, ConfigurationError> {
        let mut s = Self::default();
        for setting in read_settings(tokens, FLAGS)? {
            match setting.flag {
                "-N" => s.num_clusters = optional_count(&setting)?,
                "-I" => s.max_iterations = setting.parse_at_least(1)?,
                "-M" => {
                    let v = setting.parse_f64()?;
                    if v <= 0.0 {
                        return Err(setting.out_of_range("must be positive"));
                    }
                    s.min_std_dev = v;
                }
                "-S" => s.seed = setting.parse_seed()?,
                "-X" => s.folds = setting.parse_at_least(2)?,
                "-max" => s.max_clusters = optional_count(&setting)?,
                _ => {}
            }
        }
        Ok(s)
    }

    fn builder(&self) -> Em {
        Em::new()
            .with_k(self.num_clusters)
            .with_max_iterations(self.max_iterations)
            .with_min_std_dev(self.min_std_dev)
            .with_seed(self.seed)
            .with_folds(self.folds)
            .with_max_clusters(self.max_clusters)
    }
}

/// EM adapter.
#[derive(Default)]
pub struct EmAdapter {
    settings: Settings,
    model: Option<EmModel>,
}

impl EmAdapter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClusterAdapter for EmAdapter {
    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::Em
    }

    fn default_options(&self) -> Vec<String> {
        Vec::new()
    }

    fn revision(&self) -> &'static str {
        concat!("EM ", env!("CARGO_PKG_VERSION"))
    }

    fn configure(&mut self, options: &[String]) -> Result<(), ConfigurationError> {
        self.settings = Settings::default();
        self.model = None;
        self.settings = Settings::parse(options)?;
        Ok(())
    }

    fn fit(&mut self, dataset: &Dataset) -> Result<(), FitError> {
        let table = training_table(dataset)?;
        self.model = Some(self.settings.builder().fit(&table)?);
        Ok(())
    }

    fn evaluate(&mut self, dataset: &Dataset) -> Result<EvaluationSummary, EvaluationError> {
        evaluate_model(self.model.as_ref().map(|m| m as &dyn Clusterer), dataset)
    }

    fn populate(&self) -> Result<Population, PopulateError> {
        let model = self.model.as_ref().ok_or(PopulateError::NotFitted)?;
        let numeric_models = model
            .estimators
            .iter()
            .map(|cluster| {
                cluster
                    .iter()
                    .map(|est| match est {
                        Estimator::Normal {
                            mean,
                            std_dev,
                            weight,
                        } => Some(NormalEstimate {
                            mean: *mean,
                            std_dev: *std_dev,
                            weight: *weight,
                        }),
                        Estimator::Discrete { .. } => None,
                    })
                    .collect()
            })
            .collect();

        let num_clusters = self
            .settings
            .num_clusters
            .and_then(|k| i64::try_from(k).ok())
            .unwrap_or(-1);
        Ok(Population::new(ClusterOutput::Probabilistic(ProbabilisticOutput {
            num_clusters,
            number_of_clusters: model.number_of_clusters(),
            cluster_priors: model.priors.clone(),
            numeric_models,
            min_std_dev: self.settings.min_std_dev,
            max_iterations: self.settings.max_iterations,
            iterations: model.iterations,
            log_likelihood: model.log_likelihood,
        })))
    }
}
