//! Farthest-first traversal.
//!
//! The first centre is a seeded random instance; each further centre is
//! the instance farthest from all centres chosen so far. Instances belong
//! to their nearest centre. One pass, no iteration.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::distance::{nearest, Distance, Metric};
use super::error::{Error, Result};
use super::table::Table;
use super::traits::Clusterer;

#[derive(Debug, Clone)]
pub struct FarthestFirst {
    k: usize,
    seed: u64,
}

impl FarthestFirst {
    pub fn new(k: usize) -> Self {
        Self { k, seed: 1 }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn fit(&self, table: &Table) -> Result<FarthestFirstModel> {
        let n = table.len();
        if n == 0 {
            return Err(Error::EmptyInput);
        }
        if self.k == 0 || self.k > n {
            return Err(Error::InvalidClusterCount {
                requested: self.k,
                n_items: n,
            });
        }

        let distance = Distance::fit(Metric::Euclidean, table);
        let rows = table.rows();
        let mut rng = StdRng::seed_from_u64(self.seed);
        let first = rng.random_range(0..n);

        let mut chosen = vec![false; n];
        let mut min_dist: Vec<f64> =
            rows.iter().map(|r| distance.distance(r, &rows[first])).collect();
        chosen[first] = true;
        let mut centres = vec![first];

        while centres.len() < self.k {
            let mut far: Option<(usize, f64)> = None;
            for i in (0..n).filter(|&i| !chosen[i]) {
                if far.is_none_or(|(_, d)| min_dist[i] > d) {
                    far = Some((i, min_dist[i]));
                }
            }
            let Some((next, _)) = far else { break };
            chosen[next] = true;
            centres.push(next);
            for (i, r) in rows.iter().enumerate() {
                min_dist[i] = min_dist[i].min(distance.distance(r, &rows[next]));
            }
        }

        Ok(FarthestFirstModel {
            centres: centres.iter().map(|&i| rows[i].clone()).collect(),
            centre_indices: centres,
            distance,
        })
    }
}

/// Fitted farthest-first centres.
#[derive(Debug, Clone)]
pub struct FarthestFirstModel {
    pub centres: Vec<Vec<f64>>,
    /// Training-row index of each centre.
    pub centre_indices: Vec<usize>,
    distance: Distance,
}

impl Clusterer for FarthestFirstModel {
    fn number_of_clusters(&self) -> usize {
        self.centres.len()
    }

    fn cluster_instance(&self, row: &[f64]) -> Result<usize> {
        let expected = self.centres.first().map_or(0, Vec::len);
        if row.len() != expected {
            return Err(Error::DimensionMismatch {
                expected,
                found: row.len(),
            });
        }
        nearest(&self.distance, row, &self.centres)
            .map(|(c, _)| c)
            .ok_or(Error::EmptyInput)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clustering::Column;

    fn corners() -> Table {
        Table::new(
            vec![Column::Numeric, Column::Numeric],
            vec![
                vec![0.0, 0.0],
                vec![0.0, 1.0],
                vec![1.0, 0.0],
                vec![1.0, 1.0],
                vec![0.5, 0.5],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_picks_distinct_centres() {
        let model = FarthestFirst::new(4).fit(&corners()).unwrap();
        let mut idx = model.centre_indices.clone();
        idx.sort_unstable();
        idx.dedup();
        assert_eq!(idx.len(), 4);
    }

    #[test]
    fn test_second_centre_is_farthest() {
        let model = FarthestFirst::new(2).fit(&corners()).unwrap();
        let [a, b] = [model.centres[0].clone(), model.centres[1].clone()];
        // the opposite corner, or a corner when starting from the middle
        let gap = (a[0] - b[0]).abs() + (a[1] - b[1]).abs();
        assert!(gap >= 1.0);
    }

    #[test]
    fn test_seed_is_deterministic() {
        let a = FarthestFirst::new(3).with_seed(9).fit(&corners()).unwrap();
        let b = FarthestFirst::new(3).with_seed(9).fit(&corners()).unwrap();
        assert_eq!(a.centre_indices, b.centre_indices);
    }

    #[test]
    fn test_rejects_too_many_clusters() {
        assert!(matches!(
            FarthestFirst::new(6).fit(&corners()),
            Err(Error::InvalidClusterCount { requested: 6, n_items: 5 })
        ));
    }
}
