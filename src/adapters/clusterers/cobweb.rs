//! Conceptual family (Cobweb), fitted incrementally.

use crate::domain::errors::{ConfigurationError, EvaluationError, FitError, PopulateError};
use crate::domain::models::{
    AlgorithmKind, ClusterOutput, ConceptualOutput, Dataset, EvaluationSummary, GraphSnapshot,
    GraphType,
};
use crate::domain::ports::{ClusterAdapter, Population};
use crate::infrastructure::clustering::{Clusterer, Cobweb, CobwebTree};

use super::options::{read_settings, Arity};
use super::{evaluate_model, training_table};

const FLAGS: &[(&str, Arity)] = &[("-A", Arity::Value), ("-C", Arity::Value), ("-S", Arity::Value)];

#[derive(Debug, Clone, PartialEq)]
struct Settings {
    acuity: f64,
    cutoff: f64,
    seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            acuity: 1.0,
            cutoff: 0.002_820_947_917_738_781_5,
            seed: 42,
        }
    }
}

impl Settings {
    fn parse(tokens: &[String]) -> Result<Self, ConfigurationError> {
        let mut s = Self::default();
        for setting in read_settings(tokens, FLAGS)? {
            match setting.flag {
                "-A" => {
                    let v = setting.parse_f64()?;
                    if v <= 0.0 {
                        return Err(setting.out_of_range("must be positive"));
                    }
                    s.acuity = v;
                }
                "-C" => s.cutoff = setting.parse_f64()?,
                "-S" => s.seed = setting.parse_seed()?,
                _ => {}
            }
        }
        Ok(s)
    }

    fn builder(&self) -> Cobweb {
        Cobweb::new()
            .with_acuity(self.acuity)
            .with_cutoff(self.cutoff)
            .with_seed(self.seed)
    }
}

/// Cobweb adapter.
#[derive(Default)]
pub struct CobwebAdapter {
    settings: Settings,
    tree: Option<CobwebTree>,
}

impl CobwebAdapter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClusterAdapter for CobwebAdapter {
    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::Cobweb
    }

    fn default_options(&self) -> Vec<String> {
        Vec::new()
    }

    fn revision(&self) -> &'static str {
        concat!("Cobweb ", env!("CARGO_PKG_VERSION"))
    }

    fn configure(&mut self, options: &[String]) -> Result<(), ConfigurationError> {
        self.settings = Settings::default();
        self.tree = None;
        self.settings = Settings::parse(options)?;
        Ok(())
    }

    /// Streams the instances into the tree one at a time, then finalises it.
    fn fit(&mut self, dataset: &Dataset) -> Result<(), FitError> {
        let table = training_table(dataset)?;
        let config = self.settings.builder();
        let mut tree = config.start(table.columns())?;
        for i in config.presentation_order(table.len()) {
            tree.update(&table.rows()[i])?;
        }
        tree.update_finished();
        self.tree = Some(tree);
        Ok(())
    }

    fn evaluate(&mut self, dataset: &Dataset) -> Result<EvaluationSummary, EvaluationError> {
        evaluate_model(self.tree.as_ref().map(|t| t as &dyn Clusterer), dataset)
    }

    fn populate(&self) -> Result<Population, PopulateError> {
        let tree = self.tree.as_ref().ok_or(PopulateError::NotFitted)?;
        Ok(Population::new(ClusterOutput::Conceptual(ConceptualOutput {
            acuity: tree.acuity(),
            cutoff: tree.cutoff(),
            number_of_clusters: tree.number_of_clusters(),
            graph: GraphSnapshot {
                graph_type: GraphType::Tree,
                text: tree.graph(),
            },
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

    fn animals() -> Dataset {
        let rows = [(0, 4.0), (0, 4.2), (1, 2.0), (1, 2.1), (2, 0.0), (2, 0.1)]
            .iter()
            .map(|(class, legs)| vec![Value::Nominal(*class), Value::Numeric(*legs)])
            .collect();
        Dataset::new(
            "animals",
            vec![
                Attribute::nominal("class", ["mammal", "bird", "fish"]),
                Attribute::numeric("legs"),
            ],
            rows,
        )
        .unwrap()
    }

    #[test]
    fn test_configure_parses_grammar() {
        let mut adapter = CobwebAdapter::new();
        adapter.configure(&tokens(&["-A", "0.5", "-C", "0.1", "-S", "7"])).unwrap();
        assert_eq!(
            adapter.settings,
            Settings {
                acuity: 0.5,
                cutoff: 0.1,
                seed: 7
            }
        );
    }

    #[test]
    fn test_rejects_zero_acuity() {
        let mut adapter = CobwebAdapter::new();
        assert!(matches!(
            adapter.configure(&tokens(&["-A", "0"])),
            Err(ConfigurationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_populate_has_tree_graph() {
        let mut adapter = CobwebAdapter::new();
        adapter.configure(&[]).unwrap();
        adapter.fit(&animals()).unwrap();
        let eval = adapter.evaluate(&animals()).unwrap();
        assert_eq!(eval.cluster_counts.iter().sum::<usize>(), 6);

        let ClusterOutput::Conceptual(out) = adapter.populate().unwrap().output else {
            panic!("wrong family");
        };
        assert!((out.acuity - 1.0).abs() < f64::EPSILON);
        assert_eq!(out.graph.graph_type, GraphType::Tree);
        assert!(out.graph.text.starts_with("digraph CobwebTree {"));
        assert_eq!(out.number_of_clusters, eval.cluster_counts.len());
    }
}
