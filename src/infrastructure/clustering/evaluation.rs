//! Assign a table back to a fitted model and summarise the result.

use std::fmt::Write as _;

use super::error::{Error, Result};
use super::table::Table;
use super::traits::Clusterer;

/// Cluster distribution of a table under a fitted model.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterEvaluation {
    /// Instances per cluster, indexed by cluster number.
    pub cluster_counts: Vec<usize>,
    /// Instances the model could not place.
    pub unclustered: usize,
    /// Mean log density, for density models.
    pub log_likelihood: Option<f64>,
}

/// Place every row of `table` with `model`.
///
/// Rows of the wrong arity are an error; any other refusal counts the row
/// as unclustered.
pub fn evaluate(model: &dyn Clusterer, table: &Table) -> Result<ClusterEvaluation> {
    let k = model.number_of_clusters();
    if k == 0 {
        return Err(Error::InvalidClusterCount {
            requested: 0,
            n_items: table.len(),
        });
    }

    let mut cluster_counts = vec![0usize; k];
    let mut unclustered = 0;
    let mut log_sum = Some(0.0);

    for row in table.rows() {
        match model.cluster_instance(row) {
            Ok(c) if c < k => cluster_counts[c] += 1,
            Ok(_) => unclustered += 1,
            Err(e @ Error::DimensionMismatch { .. }) => return Err(e),
            Err(_) => unclustered += 1,
        }
        log_sum = log_sum.zip(model.log_density(row)).map(|(s, d)| s + d);
    }

    let log_likelihood = log_sum
        .filter(|_| !table.is_empty())
        .map(|s| s / table.len() as f64)
        .filter(|ll| ll.is_finite());

    Ok(ClusterEvaluation {
        cluster_counts,
        unclustered,
        log_likelihood,
    })
}

impl ClusterEvaluation {
    /// Placed instances.
    pub fn clustered(&self) -> usize {
        self.cluster_counts.iter().sum()
    }

    /// Text report of the distribution, one line per cluster.
    pub fn summary(&self) -> String {
        let total = self.clustered();
        let mut out = String::from("Clustered Instances\n\n");
        for (c, &count) in self.cluster_counts.iter().enumerate() {
            let pct = if total == 0 {
                0.0
            } else {
                100.0 * count as f64 / total as f64
            };
            let _ = writeln!(out, "{c:<7} {count:>5} ({pct:>3.0}%)");
        }
        if let Some(ll) = self.log_likelihood {
            let _ = write!(out, "\nLog likelihood: {ll:.5}\n");
        }
        if self.unclustered > 0 {
            let _ = write!(out, "\nUnclustered instances : {}\n", self.unclustered);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clustering::{Column, FarthestFirst};

    #[test]
    fn test_counts_every_instance() {
        let table = Table::new(
            vec![Column::Numeric],
            vec![vec![0.0], vec![0.1], vec![9.0], vec![9.1], vec![9.2]],
        )
        .unwrap();
        let model = FarthestFirst::new(2).fit(&table).unwrap();
        let eval = evaluate(&model, &table).unwrap();
        let mut counts = eval.cluster_counts.clone();
        counts.sort_unstable();
        assert_eq!(counts, vec![2, 3]);
        assert_eq!(eval.unclustered, 0);
        assert!(eval.log_likelihood.is_none());
        assert!(eval.summary().starts_with("Clustered Instances\n\n0 "));
    }

    #[test]
    fn test_summary_lists_percentages() {
        let eval = ClusterEvaluation {
            cluster_counts: vec![1, 3],
            unclustered: 2,
            log_likelihood: Some(-1.25),
        };
        let text = eval.summary();
        assert!(text.contains("0           1 ( 25%)"));
        assert!(text.contains("1           3 ( 75%)"));
        assert!(text.contains("Log likelihood: -1.25000"));
        assert!(text.contains("Unclustered instances : 2"));
    }
}
