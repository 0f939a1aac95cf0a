//! Expectation-maximisation over a mixture of independent attribute models.
//!
//! Each cluster models every numeric attribute with a normal distribution
//! and every nominal attribute with a Laplace-smoothed discrete
//! distribution. Attributes are assumed independent given the cluster.
//! Missing values are skipped in both steps.
//!
//! The initial memberships come from a k-means run with the same seed.
//! When no cluster count is given, it is chosen by cross-validation: start
//! at one cluster and keep adding clusters while the held-out
//! log-likelihood improves.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::error::{Error, Result};
use super::kmeans::KMeans;
use super::table::{Column, Table};
use super::traits::Clusterer;

/// Iterations stop once the log-likelihood improves by less than this.
const CONVERGENCE: f64 = 1e-6;

/// EM configuration.
#[derive(Debug, Clone)]
pub struct Em {
    k: Option<usize>,
    max_iterations: usize,
    min_std_dev: f64,
    seed: u64,
    folds: usize,
    max_clusters: Option<usize>,
}

impl Default for Em {
    fn default() -> Self {
        Self {
            k: None,
            max_iterations: 100,
            min_std_dev: 1e-6,
            seed: 100,
            folds: 10,
            max_clusters: None,
        }
    }
}

impl Em {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fix the number of clusters. `None` selects it by cross-validation.
    pub fn with_k(mut self, k: Option<usize>) -> Self {
        self.k = k;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_min_std_dev(mut self, min_std_dev: f64) -> Self {
        self.min_std_dev = min_std_dev;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_folds(mut self, folds: usize) -> Self {
        self.folds = folds;
        self
    }

    /// Upper bound for cross-validated selection.
    pub fn with_max_clusters(mut self, max_clusters: Option<usize>) -> Self {
        self.max_clusters = max_clusters;
        self
    }

    pub fn fit(&self, table: &Table) -> Result<EmModel> {
        if table.is_empty() {
            return Err(Error::EmptyInput);
        }
        if !(self.min_std_dev.is_finite() && self.min_std_dev > 0.0) {
            return Err(Error::InvalidParameter {
                name: "min_std_dev",
                message: "must be positive",
            });
        }
        if self.max_iterations == 0 {
            return Err(Error::InvalidParameter {
                name: "max_iterations",
                message: "must be at least 1",
            });
        }

        let k = match self.k {
            Some(k) if k == 0 || k > table.len() => {
                return Err(Error::InvalidClusterCount {
                    requested: k,
                    n_items: table.len(),
                })
            }
            Some(k) => k,
            None => self.select_k(table)?,
        };
        self.fit_k(table, k)
    }

    /// Cross-validated choice of cluster count.
    fn select_k(&self, table: &Table) -> Result<usize> {
        let n = table.len();
        let folds = self.folds.clamp(2, n.max(2));
        if n < 2 {
            return Ok(1);
        }

        let mut order: Vec<usize> = (0..n).collect();
        order.shuffle(&mut StdRng::seed_from_u64(self.seed));

        let mut best_k = 1;
        let mut best_ll = self.cross_validate(table, &order, folds, 1)?;
        let cap = self.max_clusters.unwrap_or(n);
        let mut k = 2;
        while k <= cap {
            let Ok(ll) = self.cross_validate(table, &order, folds, k) else {
                break;
            };
            if ll > best_ll {
                best_ll = ll;
                best_k = k;
                k += 1;
            } else {
                break;
            }
        }
        Ok(best_k)
    }

    /// Mean held-out log-likelihood of a `k`-cluster model.
    fn cross_validate(
        &self,
        table: &Table,
        order: &[usize],
        folds: usize,
        k: usize,
    ) -> Result<f64> {
        let n = order.len();
        let mut total = 0.0;
        for f in 0..folds {
            let lo = f * n / folds;
            let hi = (f + 1) * n / folds;
            if lo == hi {
                continue;
            }
            let train: Vec<Vec<f64>> = order[..lo]
                .iter()
                .chain(&order[hi..])
                .map(|&i| table.rows()[i].clone())
                .collect();
            if train.len() < k {
                return Err(Error::InvalidClusterCount {
                    requested: k,
                    n_items: train.len(),
                });
            }
            let model = self.fit_k(&Table::new(table.columns().to_vec(), train)?, k)?;
            for &i in &order[lo..hi] {
                total += model.log_density_of(&table.rows()[i]);
            }
        }
        let ll = total / n as f64;
        if ll.is_finite() {
            Ok(ll)
        } else {
            Err(Error::Numerical("held-out log-likelihood is not finite".to_string()))
        }
    }

    fn fit_k(&self, table: &Table, k: usize) -> Result<EmModel> {
        let init = KMeans::new(k)
            .with_seed(self.seed)
            .with_preserve_order(true)
            .fit(table)?;
        let k = init.number_of_clusters();
        let mut weights: Vec<Vec<f64>> = init
            .assignments
            .unwrap_or_default()
            .iter()
            .map(|&c| {
                let mut w = vec![0.0; k];
                w[c] = 1.0;
                w
            })
            .collect();

        let fallback = global_estimates(table, self.min_std_dev);
        let mut model = EmModel {
            columns: table.columns().to_vec(),
            priors: vec![1.0 / k as f64; k],
            estimators: Vec::new(),
            iterations: 0,
            log_likelihood: 0.0,
        };
        model.maximise(table, &weights, self.min_std_dev, &fallback);

        let mut ll = f64::NEG_INFINITY;
        for i in 0..self.max_iterations {
            let prev = ll;
            ll = model.expect(table, &mut weights);
            model.iterations = i + 1;
            if !ll.is_finite() {
                return Err(Error::Numerical("log-likelihood is not finite".to_string()));
            }
            if i > 0 && ll - prev < CONVERGENCE {
                break;
            }
            model.maximise(table, &weights, self.min_std_dev, &fallback);
        }
        model.log_likelihood = ll;
        Ok(model)
    }
}

/// Per-cluster model of one attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum Estimator {
    Normal { mean: f64, std_dev: f64, weight: f64 },
    Discrete { probabilities: Vec<f64>, weight: f64 },
}

impl Estimator {
    fn log_probability(&self, x: f64) -> f64 {
        match self {
            Self::Normal { mean, std_dev, .. } => {
                let z = (x - mean) / std_dev;
                -0.5 * z * z - std_dev.ln() - 0.5 * (2.0 * std::f64::consts::PI).ln()
            }
            Self::Discrete { probabilities, .. } => probabilities
                .get(x as usize)
                .map_or(f64::NEG_INFINITY, |p| p.ln()),
        }
    }
}

/// Dataset-wide estimates used when a cluster loses all weight for an attribute.
fn global_estimates(table: &Table, min_std_dev: f64) -> Vec<Estimator> {
    let uniform = vec![1.0; table.len()];
    table
        .columns()
        .iter()
        .enumerate()
        .map(|(col, kind)| {
            let cells = table.rows().iter().map(|r| r[col]).zip(uniform.iter().copied());
            estimate(*kind, cells, min_std_dev)
        })
        .collect()
}

/// Weighted estimate from `(value, weight)` pairs, ignoring missing values.
fn estimate(kind: Column, cells: impl Iterator<Item = (f64, f64)>, min_std_dev: f64) -> Estimator {
    let cells: Vec<(f64, f64)> = cells.filter(|(v, _)| !v.is_nan()).collect();
    let weight: f64 = cells.iter().map(|(_, w)| w).sum();
    match kind {
        Column::Numeric => {
            if weight <= f64::EPSILON {
                return Estimator::Normal {
                    mean: 0.0,
                    std_dev: min_std_dev.max(1.0),
                    weight: 0.0,
                };
            }
            let mean = cells.iter().map(|(v, w)| v * w).sum::<f64>() / weight;
            let var = cells.iter().map(|(v, w)| w * (v - mean).powi(2)).sum::<f64>() / weight;
            Estimator::Normal {
                mean,
                std_dev: var.max(0.0).sqrt().max(min_std_dev),
                weight,
            }
        }
        Column::Nominal(card) => {
            let mut counts = vec![1.0; card];
            for (v, w) in &cells {
                if let Some(slot) = counts.get_mut(*v as usize) {
                    *slot += w;
                }
            }
            let total = weight + card as f64;
            Estimator::Discrete {
                probabilities: counts.into_iter().map(|c| c / total).collect(),
                weight,
            }
        }
    }
}

fn log_sum_exp(values: &[f64]) -> f64 {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max == f64::NEG_INFINITY {
        return max;
    }
    max + values.iter().map(|v| (v - max).exp()).sum::<f64>().ln()
}

/// A fitted EM mixture.
#[derive(Debug, Clone)]
pub struct EmModel {
    columns: Vec<Column>,
    /// Mixing weights, summing to 1.
    pub priors: Vec<f64>,
    /// `[cluster][attribute]`.
    pub estimators: Vec<Vec<Estimator>>,
    pub iterations: usize,
    /// Mean log-likelihood of the training data.
    pub log_likelihood: f64,
}

impl EmModel {
    /// Recompute priors and estimators from soft memberships.
    fn maximise(
        &mut self,
        table: &Table,
        weights: &[Vec<f64>],
        min_std_dev: f64,
        fallback: &[Estimator],
    ) {
        let k = self.priors.len();
        let totals: Vec<f64> = (0..k).map(|c| weights.iter().map(|w| w[c]).sum()).collect();
        let sum: f64 = totals.iter().sum();
        self.priors = totals.iter().map(|t| t / sum).collect();

        self.estimators = (0..k)
            .map(|c| {
                self.columns
                    .iter()
                    .enumerate()
                    .map(|(col, kind)| {
                        let cells = table.rows().iter().zip(weights).map(|(r, w)| (r[col], w[c]));
                        let est = estimate(*kind, cells, min_std_dev);
                        match (est, &fallback[col]) {
                            (
                                Estimator::Normal { weight, .. },
                                Estimator::Normal { mean, std_dev, .. },
                            ) if weight <= f64::EPSILON => Estimator::Normal {
                                mean: *mean,
                                std_dev: *std_dev,
                                weight: 0.0,
                            },
                            (est, _) => est,
                        }
                    })
                    .collect()
            })
            .collect();
    }

    /// Soft memberships for every row; returns the mean log-likelihood.
    fn expect(&self, table: &Table, weights: &mut [Vec<f64>]) -> f64 {
        let mut total = 0.0;
        for (row, w) in table.rows().iter().zip(weights.iter_mut()) {
            let joint = self.log_joint(row);
            let lse = log_sum_exp(&joint);
            for (wc, lj) in w.iter_mut().zip(&joint) {
                *wc = (lj - lse).exp();
            }
            total += lse;
        }
        total / table.len() as f64
    }

    /// `ln P(cluster) + ln P(row | cluster)` for every cluster.
    fn log_joint(&self, row: &[f64]) -> Vec<f64> {
        self.priors
            .iter()
            .zip(&self.estimators)
            .map(|(prior, ests)| {
                prior.ln()
                    + row
                        .iter()
                        .zip(ests)
                        .filter(|(v, _)| !v.is_nan())
                        .map(|(v, e)| e.log_probability(*v))
                        .sum::<f64>()
            })
            .collect()
    }

    fn log_density_of(&self, row: &[f64]) -> f64 {
        log_sum_exp(&self.log_joint(row))
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }
}

impl Clusterer for EmModel {
    fn number_of_clusters(&self) -> usize {
        self.priors.len()
    }

    fn cluster_instance(&self, row: &[f64]) -> Result<usize> {
        if row.len() != self.columns.len() {
            return Err(Error::DimensionMismatch {
                expected: self.columns.len(),
                found: row.len(),
            });
        }
        let joint = self.log_joint(row);
        let mut best = 0;
        for (c, lj) in joint.iter().enumerate() {
            if *lj > joint[best] {
                best = c;
            }
        }
        Ok(best)
    }

    fn log_density(&self, row: &[f64]) -> Option<f64> {
        (row.len() == self.columns.len()).then(|| self.log_density_of(row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blobs() -> Table {
        let mut rows = Vec::new();
        for i in 0..8 {
            let d = f64::from(i) * 0.1;
            rows.push(vec![d, 1.0 - d]);
            rows.push(vec![20.0 + d, 30.0 - d]);
        }
        Table::new(vec![Column::Numeric, Column::Numeric], rows).unwrap()
    }

    #[test]
    fn test_priors_sum_to_one() {
        let model = Em::new().with_k(Some(2)).fit(&blobs()).unwrap();
        let sum: f64 = model.priors.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert_eq!(model.number_of_clusters(), 2);
        assert!(model.log_likelihood.is_finite());
        assert!(model.iterations >= 1);
    }

    #[test]
    fn test_separates_blobs() {
        let table = blobs();
        let model = Em::new().with_k(Some(2)).fit(&table).unwrap();
        let a = model.cluster_instance(&table.rows()[0]).unwrap();
        let b = model.cluster_instance(&table.rows()[1]).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_cross_validation_finds_more_than_one_cluster() {
        let model = Em::new().fit(&blobs()).unwrap();
        assert!(model.number_of_clusters() >= 2);
    }

    #[test]
    fn test_std_dev_respects_minimum() {
        let table = Table::new(vec![Column::Numeric], vec![vec![1.0]; 4]).unwrap();
        let model = Em::new().with_k(Some(1)).with_min_std_dev(0.5).fit(&table).unwrap();
        match &model.estimators[0][0] {
            Estimator::Normal { std_dev, .. } => assert!((*std_dev - 0.5).abs() < 1e-12),
            Estimator::Discrete { .. } => panic!("expected a normal estimator"),
        }
    }

    #[test]
    fn test_discrete_estimates_are_smoothed() {
        let table = Table::new(vec![Column::Nominal(3)], vec![vec![0.0], vec![0.0]]).unwrap();
        let model = Em::new().with_k(Some(1)).fit(&table).unwrap();
        match &model.estimators[0][0] {
            Estimator::Discrete { probabilities, .. } => {
                assert!((probabilities[0] - 0.6).abs() < 1e-9);
                assert!((probabilities[2] - 0.2).abs() < 1e-9);
            }
            Estimator::Normal { .. } => panic!("expected a discrete estimator"),
        }
    }

    #[test]
    fn test_rejects_non_positive_min_std_dev() {
        let err = Em::new().with_min_std_dev(0.0).fit(&blobs()).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { .. }));
    }
}
