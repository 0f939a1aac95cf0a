//! Hierarchical family (agglomerative clustering).

use crate::domain::errors::{ConfigurationError, EvaluationError, FitError, PopulateError};
use crate::domain::models::{
    AlgorithmKind, ClusterOutput, Dataset, EvaluationSummary, GraphSnapshot, GraphType,
    HierarchicalOutput,
};
use crate::domain::ports::{ClusterAdapter, Population};
use crate::infrastructure::clustering::{
    Clusterer, Hierarchical, HierarchicalModel, Linkage, Metric,
};

use super::options::{read_settings, Arity};
use super::{distance_snapshot, evaluate_model, parse_metric, training_table};

const FLAGS: &[(&str, Arity)] = &[
    ("-N", Arity::Value),
    ("-L", Arity::Value),
    ("-P", Arity::Switch),
    ("-A", Arity::Value),
];

#[derive(Debug, Clone, PartialEq)]
struct Settings {
    num_clusters: usize,
    linkage: Linkage,
    print_newick: bool,
    metric: Metric,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            num_clusters: 2,
            linkage: Linkage::Single,
            print_newick: false,
            metric: Metric::Euclidean,
        }
    }
}

impl Settings {
    fn parse(tokens: &[String]) -> Result<Self, ConfigurationError> {
        let mut s = Self::default();
        for setting in read_settings(tokens, FLAGS)? {
            match setting.flag {
                "-N" => s.num_clusters = setting.parse_at_least(1)?,
                "-L" => {
                    let expected = "expected SINGLE, COMPLETE, AVERAGE, MEAN, CENTROID or WARD";
                    s.linkage = Linkage::from_name(setting.value()?.trim())
                        .ok_or_else(|| setting.invalid(expected))?;
                }
                "-P" => s.print_newick = true,
                "-A" => {
                    s.metric = parse_metric(setting.value()?)
                        .ok_or_else(|| setting.invalid("expected Euclidean or Manhattan"))?;
                }
                _ => {}
            }
        }
        Ok(s)
    }
}

struct Fitted {
    model: HierarchicalModel,
    output: HierarchicalOutput,
}

/// Hierarchical clustering adapter.
#[derive(Default)]
pub struct HierarchicalAdapter {
    settings: Settings,
    fitted: Option<Fitted>,
}

impl HierarchicalAdapter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClusterAdapter for HierarchicalAdapter {
    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::Hierarchical
    }

    fn default_options(&self) -> Vec<String> {
        Vec::new()
    }

    fn revision(&self) -> &'static str {
        concat!("HierarchicalClusterer ", env!("CARGO_PKG_VERSION"))
    }

    fn configure(&mut self, options: &[String]) -> Result<(), ConfigurationError> {
        self.settings = Settings::default();
        self.fitted = None;
        self.settings = Settings::parse(options)?;
        Ok(())
    }

    fn fit(&mut self, dataset: &Dataset) -> Result<(), FitError> {
        let table = training_table(dataset)?;
        let model = Hierarchical::new(self.settings.num_clusters)
            .with_linkage(self.settings.linkage)
            .with_metric(self.settings.metric)
            .fit(&table)?;
        let output = HierarchicalOutput {
            num_clusters: self.settings.num_clusters,
            number_of_clusters: model.number_of_clusters(),
            link_type: model.linkage().name().to_string(),
            print_newick: self.settings.print_newick,
            distance_function: distance_snapshot(self.settings.metric, dataset),
            graph: GraphSnapshot {
                graph_type: GraphType::Newick,
                text: model.newick(),
            },
        };
        self.fitted = Some(Fitted { model, output });
        Ok(())
    }

    fn evaluate(&mut self, dataset: &Dataset) -> Result<EvaluationSummary, EvaluationError> {
        evaluate_model(self.fitted.as_ref().map(|f| &f.model as &dyn Clusterer), dataset)
    }

    fn populate(&self) -> Result<Population, PopulateError> {
        let fitted = self.fitted.as_ref().ok_or(PopulateError::NotFitted)?;
        Ok(Population::new(ClusterOutput::Hierarchical(fitted.output.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Attribute, Value};

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| (*s).to_string()).collect()
    }

    fn heights() -> Dataset {
        Dataset::new(
            "heights",
            vec![Attribute::numeric("h")],
            [150.0, 152.0, 180.0, 181.0]
                .iter()
                .map(|v| vec![Value::Numeric(*v)])
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_configure_parses_grammar() {
        let mut adapter = HierarchicalAdapter::new();
        adapter
            .configure(&tokens(&["-N", "3", "-L", "WARD", "-P", "-A", "Manhattan"]))
            .unwrap();
        assert_eq!(
            adapter.settings,
            Settings {
                num_clusters: 3,
                linkage: Linkage::Ward,
                print_newick: true,
                metric: Metric::Manhattan,
            }
        );
    }

    #[test]
    fn test_unknown_link_type() {
        let mut adapter = HierarchicalAdapter::new();
        assert!(matches!(
            adapter.configure(&tokens(&["-L", "NEIGHBOR_JOINING"])),
            Err(ConfigurationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_populate_has_newick_graph() {
        let mut adapter = HierarchicalAdapter::new();
        adapter.configure(&tokens(&["-L", "COMPLETE"])).unwrap();
        adapter.fit(&heights()).unwrap();
        let eval = adapter.evaluate(&heights()).unwrap();
        assert_eq!(eval.cluster_counts, vec![2, 2]);
        let ClusterOutput::Hierarchical(out) = adapter.populate().unwrap().output else {
            panic!("wrong family");
        };
        assert_eq!(out.link_type, "COMPLETE");
        assert_eq!(out.graph.graph_type, GraphType::Newick);
        assert_eq!(out.graph.text.lines().count(), 2);
    }

    #[test]
    fn test_more_clusters_than_instances_is_fatal() {
        let mut adapter = HierarchicalAdapter::new();
        adapter.configure(&tokens(&["-N", "9"])).unwrap();
        assert!(matches!(
            adapter.fit(&heights()),
            Err(FitError::InvalidClusterCount { requested: 9, available: 4 })
        ));
    }
}
