use super::error::Result;

/// A fitted clustering model that can place new instances.
pub trait Clusterer {
    /// Number of clusters the model distinguishes.
    fn number_of_clusters(&self) -> usize;

    /// Cluster index for an encoded instance (NaN marks a missing value).
    fn cluster_instance(&self, row: &[f64]) -> Result<usize>;

    /// Log density of the instance under the model, for density-based models.
    fn log_density(&self, _row: &[f64]) -> Option<f64> {
        None
    }
}
