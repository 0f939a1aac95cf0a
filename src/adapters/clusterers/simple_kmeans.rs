//! Centroid-based family (k-means).

use crate::domain::errors::{ConfigurationError, EvaluationError, FitError, PopulateError};
use crate::domain::models::{
    AlgorithmKind, CentroidOutput, ClusterOutput, Dataset, EvaluationSummary,
};
use crate::domain::ports::{ClusterAdapter, Population};
use crate::infrastructure::clustering::{Clusterer, KMeans, KMeansModel, Metric};

use super::options::{read_settings, Arity};
use super::{arff_snapshot, distance_snapshot, evaluate_model, parse_metric, training_table};

const FLAGS: &[(&str, Arity)] = &[
    ("-N", Arity::Value),
    ("-I", Arity::Value),
    ("-S", Arity::Value),
    ("-A", Arity::Value),
    ("-O", Arity::Switch),
    ("-M", Arity::Switch),
];

#[derive(Debug, Clone, PartialEq)]
struct Settings {
    num_clusters: usize,
    max_iterations: usize,
    seed: u64,
    metric: Metric,
    preserve_order: bool,
    keep_missing: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            num_clusters: 2,
            max_iterations: 500,
            seed: 10,
            metric: Metric::Euclidean,
            preserve_order: false,
            keep_missing: false,
        }
    }
}

impl Settings {
    fn parse(tokens: &[String]) -> Result<Self, ConfigurationError> {
        let mut s = Self::default();
        for setting in read_settings(tokens, FLAGS)? {
            match setting.flag {
                "-N" => s.num_clusters = setting.parse_at_least(1)?,
                "-I" => s.max_iterations = setting.parse_at_least(1)?,
                "-S" => s.seed = setting.parse_seed()?,
                "-A" => {
                    s.metric = parse_metric(setting.value()?)
                        .ok_or_else(|| setting.invalid("expected Euclidean or Manhattan"))?;
                }
                "-O" => s.preserve_order = true,
                "-M" => s.keep_missing = true,
                _ => {}
            }
        }
        Ok(s)
    }

    fn builder(&self) -> KMeans {
        KMeans::new(self.num_clusters)
            .with_max_iterations(self.max_iterations)
            .with_seed(self.seed)
            .with_metric(self.metric)
            .with_preserve_order(self.preserve_order)
            .with_replace_missing(!self.keep_missing)
    }
}

struct Fitted {
    model: KMeansModel,
    output: CentroidOutput,
}

/// K-means adapter.
#[derive(Default)]
pub struct SimpleKMeansAdapter {
    settings: Settings,
    fitted: Option<Fitted>,
}

impl SimpleKMeansAdapter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClusterAdapter for SimpleKMeansAdapter {
    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::SimpleKMeans
    }

    fn default_options(&self) -> Vec<String> {
        vec!["-O".to_string()]
    }

    fn revision(&self) -> &'static str {
        concat!("SimpleKMeans ", env!("CARGO_PKG_VERSION"))
    }

    fn configure(&mut self, options: &[String]) -> Result<(), ConfigurationError> {
        self.settings = Settings::default();
        self.fitted = None;
        self.settings = Settings::parse(options)?;
        Ok(())
    }

    fn fit(&mut self, dataset: &Dataset) -> Result<(), FitError> {
        let table = training_table(dataset)?;
        let model = self.settings.builder().fit(&table)?;

        let template = dataset
            .with_instances(dataset.relation(), Vec::new())
            .map_err(|e| FitError::Engine(e.to_string()))?;
        let output = CentroidOutput {
            num_clusters: self.settings.num_clusters,
            number_of_clusters: model.number_of_clusters(),
            cluster_sizes: model.cluster_sizes.clone(),
            centroids: arff_snapshot(&template, &model.centroids)?,
            nominal_counts: model.nominal_counts.clone(),
            std_devs: arff_snapshot(&template, &model.std_devs)?,
            distance_function: distance_snapshot(self.settings.metric, dataset),
            squared_error: model.squared_error,
            max_iterations: self.settings.max_iterations,
            iterations: model.iterations,
            assignments: model.assignments.clone(),
        };
        self.fitted = Some(Fitted { model, output });
        Ok(())
    }

    fn evaluate(&mut self, dataset: &Dataset) -> Result<EvaluationSummary, EvaluationError> {
        evaluate_model(self.fitted.as_ref().map(|f| &f.model as &dyn Clusterer), dataset)
    }

    fn populate(&self) -> Result<Population, PopulateError> {
        let fitted = self.fitted.as_ref().ok_or(PopulateError::NotFitted)?;
        let mut population = Population::new(ClusterOutput::CentroidBased(fitted.output.clone()));
        if fitted.output.assignments.is_none() {
            population
                .note("assignments unavailable: instance order was not preserved (enable -O)");
        }
        Ok(population)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Attribute, Value};

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| (*s).to_string()).collect()
    }

    fn points() -> Dataset {
        let rows = [0.0, 0.5, 1.0, 20.0, 20.5, 21.0]
            .iter()
            .map(|v| vec![Value::Numeric(*v), Value::Nominal(usize::from(*v > 10.0))])
            .collect();
        Dataset::new(
            "points",
            vec![Attribute::numeric("x"), Attribute::nominal("side", ["left", "right"])],
            rows,
        )
        .unwrap()
    }

    #[test]
    fn test_configure_parses_grammar() {
        let mut adapter = SimpleKMeansAdapter::new();
        adapter
            .configure(&tokens(&["-N", "3", "-I", "10", "-S", "4", "-A", "Manhattan", "-O", "-M"]))
            .unwrap();
        assert_eq!(
            adapter.settings,
            Settings {
                num_clusters: 3,
                max_iterations: 10,
                seed: 4,
                metric: Metric::Manhattan,
                preserve_order: true,
                keep_missing: true,
            }
        );
    }

    #[test]
    fn test_configure_failure_leaves_defaults() {
        let mut adapter = SimpleKMeansAdapter::new();
        adapter.configure(&tokens(&["-N", "4"])).unwrap();
        let err = adapter.configure(&tokens(&["-N", "3", "-Z"])).unwrap_err();
        assert_eq!(err, ConfigurationError::UnknownOption("-Z".to_string()));
        assert_eq!(adapter.settings, Settings::default());
    }

    #[test]
    fn test_full_lifecycle_with_order() {
        let mut adapter = SimpleKMeansAdapter::new();
        adapter.configure(&adapter.default_options()).unwrap();
        adapter.fit(&points()).unwrap();
        let eval = adapter.evaluate(&points()).unwrap();
        assert_eq!(eval.cluster_counts.iter().sum::<usize>(), 6);

        let population = adapter.populate().unwrap();
        assert!(population.notes.is_empty());
        let ClusterOutput::CentroidBased(out) = population.output else {
            panic!("wrong family");
        };
        assert_eq!(out.number_of_clusters, 2);
        assert_eq!(out.assignments.as_ref().map(Vec::len), Some(6));
        assert!(out.centroids.starts_with("@relation points"));
        assert_eq!(out.nominal_counts.len(), 2);
        assert_eq!(out.distance_function.name, "EuclideanDistance");
    }

    #[test]
    fn test_assignments_note_without_order() {
        let mut adapter = SimpleKMeansAdapter::new();
        adapter.configure(&[]).unwrap();
        adapter.fit(&points()).unwrap();
        let population = adapter.populate().unwrap();
        assert_eq!(population.notes.len(), 1);
        assert!(population.notes[0].contains("assignments"));
    }

    #[test]
    fn test_rejects_string_attributes() {
        let dataset = Dataset::new(
            "notes",
            vec![Attribute::text("note")],
            vec![vec![Value::Text("a".into())]],
        )
        .unwrap();
        let mut adapter = SimpleKMeansAdapter::new();
        adapter.configure(&[]).unwrap();
        assert!(matches!(
            adapter.fit(&dataset),
            Err(FitError::UnsupportedAttribute { .. })
        ));
    }

    #[test]
    fn test_populate_before_fit() {
        let adapter = SimpleKMeansAdapter::new();
        assert_eq!(adapter.populate().unwrap_err(), PopulateError::NotFitted);
    }
}
