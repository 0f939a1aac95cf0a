//! Seed-based family (farthest-first traversal).

use crate::domain::errors::{ConfigurationError, EvaluationError, FitError, PopulateError};
use crate::domain::models::{
    AlgorithmKind, ClusterOutput, Dataset, EvaluationSummary, SeedBasedOutput,
};
use crate::domain::ports::{ClusterAdapter, Population};
use crate::infrastructure::clustering::{Clusterer, FarthestFirst, FarthestFirstModel};

use super::options::{read_settings, Arity};
use super::{evaluate_model, training_table};

const FLAGS: &[(&str, Arity)] = &[("-N", Arity::Value), ("-S", Arity::Value)];

#[derive(Debug, Clone, PartialEq, Eq)]
struct Settings {
    num_clusters: usize,
    seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            num_clusters: 2,
            seed: 1,
        }
    }
}

impl Settings {
    fn parse(tokens: &[String]) -> Result<Self, ConfigurationError> {
        let mut s = Self::default();
        for setting in read_settings(tokens, FLAGS)? {
            match setting.flag {
                "-N" => s.num_clusters = setting.parse_at_least(1)?,
                "-S" => s.seed = setting.parse_seed()?,
                _ => {}
            }
        }
        Ok(s)
    }
}

/// Farthest-first adapter.
#[derive(Default)]
pub struct FarthestFirstAdapter {
    settings: Settings,
    model: Option<FarthestFirstModel>,
}

impl FarthestFirstAdapter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClusterAdapter for FarthestFirstAdapter {
    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::FarthestFirst
    }

    fn default_options(&self) -> Vec<String> {
        Vec::new()
    }

    fn revision(&self) -> &'static str {
        concat!("FarthestFirst ", env!("CARGO_PKG_VERSION"))
    }

    fn configure(&mut self, options: &[String]) -> Result<(), ConfigurationError> {
        self.settings = Settings::default();
        self.model = None;
        self.settings = Settings::parse(options)?;
        Ok(())
    }

    fn fit(&mut self, dataset: &Dataset) -> Result<(), FitError> {
        let table = training_table(dataset)?;
        let model = FarthestFirst::new(self.settings.num_clusters)
            .with_seed(self.settings.seed)
            .fit(&table)?;
        self.model = Some(model);
        Ok(())
    }

    fn evaluate(&mut self, dataset: &Dataset) -> Result<EvaluationSummary, EvaluationError> {
        evaluate_model(self.model.as_ref().map(|m| m as &dyn Clusterer), dataset)
    }

    fn populate(&self) -> Result<Population, PopulateError> {
        let model = self.model.as_ref().ok_or(PopulateError::NotFitted)?;
        Ok(Population::new(ClusterOutput::SeedBased(SeedBasedOutput {
            num_clusters: self.settings.num_clusters,
            number_of_clusters: model.number_of_clusters(),
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Attribute, Value};

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| (*s).to_string()).collect()
    }

    fn line(n: usize) -> Dataset {
        Dataset::new(
            "line",
            vec![Attribute::numeric("x")],
            (0..n).map(|i| vec![Value::Numeric(i as f64)]).collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_configure_parses_grammar() {
        let mut adapter = FarthestFirstAdapter::new();
        adapter.configure(&tokens(&["-N", "4", "-S", "3"])).unwrap();
        assert_eq!(
            adapter.settings,
            Settings {
                num_clusters: 4,
                seed: 3
            }
        );
    }

    #[test]
    fn test_negative_seed_is_out_of_range() {
        let mut adapter = FarthestFirstAdapter::new();
        assert!(matches!(
            adapter.configure(&tokens(&["-S", "-4"])),
            Err(ConfigurationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_lifecycle() {
        let mut adapter = FarthestFirstAdapter::new();
        adapter.configure(&tokens(&["-N", "3"])).unwrap();
        adapter.fit(&line(9)).unwrap();
        let eval = adapter.evaluate(&line(9)).unwrap();
        assert_eq!(eval.cluster_counts.len(), 3);
        assert_eq!(eval.cluster_counts.iter().sum::<usize>(), 9);
        let population = adapter.populate().unwrap();
        assert_eq!(population.output.number_of_clusters(), 3);
    }

    #[test]
    fn test_evaluate_before_fit() {
        let mut adapter = FarthestFirstAdapter::new();
        assert_eq!(adapter.evaluate(&line(2)).unwrap_err(), EvaluationError::NotFitted);
    }
}
