//! K-means over mixed numeric/nominal instances.
//!
//! Centroids are attribute-wise means (numeric) and modes (nominal), and
//! distances are range-normalised (see [`Distance`]). Initial centroids are
//! distinct training instances drawn with a seeded RNG, so a fixed seed
//! always produces the same model.
//!
//! ```text
//! repeat:
//!   assign every instance to its nearest centroid
//!   stop if no assignment changed or the iteration cap is reached
//!   move each centroid to the mean/mode of its members
//!   drop clusters that lost all members
//! ```

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::distance::{nearest, Distance, Metric};
use super::error::{Error, Result};
use super::table::{column_summary, nominal_counts, replace_missing, Column, Table};
use super::traits::Clusterer;

/// K-means configuration.
#[derive(Debug, Clone)]
pub struct KMeans {
    k: usize,
    max_iterations: usize,
    seed: u64,
    metric: Metric,
    preserve_order: bool,
    replace_missing: bool,
}

impl KMeans {
    /// Create a clusterer for `k` clusters with default settings.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            max_iterations: 500,
            seed: 10,
            metric: Metric::Euclidean,
            preserve_order: false,
            replace_missing: true,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    /// Keep the per-instance assignments in the fitted model.
    pub fn with_preserve_order(mut self, preserve_order: bool) -> Self {
        self.preserve_order = preserve_order;
        self
    }

    /// Replace missing values with column means/modes before clustering.
    pub fn with_replace_missing(mut self, replace_missing: bool) -> Self {
        self.replace_missing = replace_missing;
        self
    }

    pub const fn k(&self) -> usize {
        self.k
    }

    pub const fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Fit centroids to `table`.
    pub fn fit(&self, table: &Table) -> Result<KMeansModel> {
        if table.is_empty() {
            return Err(Error::EmptyInput);
        }
        if self.k == 0 || self.k > table.len() {
            return Err(Error::InvalidClusterCount {
                requested: self.k,
                n_items: table.len(),
            });
        }
        if self.max_iterations == 0 {
            return Err(Error::InvalidParameter {
                name: "max_iterations",
                message: "must be at least 1",
            });
        }

        let fill = self.replace_missing.then(|| table.means_and_modes());
        let data = match &fill {
            Some(fill) => table.with_missing_replaced(fill),
            None => table.clone(),
        };
        let distance = Distance::fit(self.metric, &data);
        let rows = data.rows();

        let mut centroids = self.initial_centroids(rows);
        let mut assignments = vec![usize::MAX; rows.len()];
        let mut iterations = 0;

        loop {
            iterations += 1;
            let mut changed = false;
            for (i, row) in rows.iter().enumerate() {
                let (c, _) = nearest(&distance, row, &centroids).unwrap_or((0, 0.0));
                if assignments[i] != c {
                    assignments[i] = c;
                    changed = true;
                }
            }

            let (moved, kept) = move_centroids(data.columns(), rows, &assignments, centroids.len());
            if kept.len() < centroids.len() {
                // Renumber surviving clusters; members must be reassigned.
                changed = true;
                let remap = remap_table(&kept, centroids.len());
                for a in &mut assignments {
                    *a = remap[*a];
                }
            }
            centroids = moved;

            if !changed || iterations >= self.max_iterations {
                break;
            }
        }

        // Final assignment against the settled centroids.
        for (i, row) in rows.iter().enumerate() {
            assignments[i] = nearest(&distance, row, &centroids).map_or(0, |(c, _)| c);
        }
        let k = centroids.len();
        let mut cluster_sizes = vec![0usize; k];
        let mut squared_error = 0.0;
        for (row, &c) in rows.iter().zip(&assignments) {
            cluster_sizes[c] += 1;
            squared_error += distance.error_term(row, &centroids[c]);
        }

        let members = |c: usize| {
            rows.iter()
                .zip(&assignments)
                .filter(move |&(_, &a)| a == c)
                .map(|(r, _)| r)
        };

        let std_devs = (0..k)
            .map(|c| {
                data.columns()
                    .iter()
                    .enumerate()
                    .map(|(col, kind)| match kind {
                        Column::Numeric => std_dev(members(c).map(|r| r[col])),
                        Column::Nominal(_) => f64::NAN,
                    })
                    .collect()
            })
            .collect();

        let cluster_nominal_counts = (0..k)
            .map(|c| {
                data.columns()
                    .iter()
                    .enumerate()
                    .map(|(col, kind)| match kind {
                        Column::Numeric => Vec::new(),
                        Column::Nominal(card) => nominal_counts(*card, members(c).map(|r| r[col])),
                    })
                    .collect()
            })
            .collect();

        Ok(KMeansModel {
            centroids,
            std_devs,
            cluster_sizes,
            nominal_counts: cluster_nominal_counts,
            squared_error,
            iterations,
            assignments: self.preserve_order.then_some(assignments),
            distance,
            fill,
        })
    }

    /// Draw `k` distinct instances, fewer if the data has fewer distinct rows.
    fn initial_centroids(&self, rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut order: Vec<usize> = (0..rows.len()).collect();
        let mut centroids: Vec<Vec<f64>> = Vec::with_capacity(self.k);

        for j in (0..rows.len()).rev() {
            let pick = rng.random_range(0..=j);
            let candidate = &rows[order[pick]];
            if !centroids.iter().any(|c| same_row(c, candidate)) {
                centroids.push(candidate.clone());
                if centroids.len() == self.k {
                    break;
                }
            }
            order.swap(pick, j);
        }
        centroids
    }
}

/// Rows are equal, treating two missing cells as equal.
fn same_row(a: &[f64], b: &[f64]) -> bool {
    a.iter()
        .zip(b)
        .all(|(x, y)| (x.is_nan() && y.is_nan()) || x == y)
}

/// New centroids for the non-empty clusters, plus the old indices that survived.
fn move_centroids(
    columns: &[Column],
    rows: &[Vec<f64>],
    assignments: &[usize],
    k: usize,
) -> (Vec<Vec<f64>>, Vec<usize>) {
    let mut centroids = Vec::with_capacity(k);
    let mut kept = Vec::with_capacity(k);
    for c in 0..k {
        let members: Vec<&Vec<f64>> = rows
            .iter()
            .zip(assignments)
            .filter(|&(_, &a)| a == c)
            .map(|(r, _)| r)
            .collect();
        if members.is_empty() {
            continue;
        }
        let centroid = columns
            .iter()
            .enumerate()
            .map(|(col, kind)| column_summary(*kind, members.iter().map(|r| r[col])))
            .collect();
        centroids.push(centroid);
        kept.push(c);
    }
    (centroids, kept)
}

fn remap_table(kept: &[usize], k: usize) -> Vec<usize> {
    let mut remap = vec![0usize; k];
    for (new, &old) in kept.iter().enumerate() {
        remap[old] = new;
    }
    remap
}

/// Sample standard deviation ignoring missing values; 0 for fewer than two values.
fn std_dev(values: impl Iterator<Item = f64>) -> f64 {
    let values: Vec<f64> = values.filter(|v| !v.is_nan()).collect();
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    var.max(0.0).sqrt()
}

/// A fitted k-means model.
#[derive(Debug, Clone)]
pub struct KMeansModel {
    /// Encoded centroids; `NaN` where a cluster had no observed value.
    pub centroids: Vec<Vec<f64>>,
    /// Per-cluster standard deviations; `NaN` for nominal attributes.
    pub std_devs: Vec<Vec<f64>>,
    pub cluster_sizes: Vec<usize>,
    /// `[cluster][attribute][value]`, empty for numeric attributes.
    pub nominal_counts: Vec<Vec<Vec<usize>>>,
    pub squared_error: f64,
    pub iterations: usize,
    pub assignments: Option<Vec<usize>>,
    distance: Distance,
    fill: Option<Vec<f64>>,
}

impl KMeansModel {
    pub const fn distance(&self) -> &Distance {
        &self.distance
    }
}

impl Clusterer for KMeansModel {
    fn number_of_clusters(&self) -> usize {
        self.centroids.len()
    }

    fn cluster_instance(&self, row: &[f64]) -> Result<usize> {
        let expected = self.centroids.first().map_or(0, Vec::len);
        if row.len() != expected {
            return Err(Error::DimensionMismatch {
                expected,
                found: row.len(),
            });
        }
        let row = match &self.fill {
            Some(fill) => replace_missing(row, fill),
            None => row.to_vec(),
        };
        nearest(&self.distance, &row, &self.centroids)
            .map(|(c, _)| c)
            .ok_or(Error::EmptyInput)
    }
}
