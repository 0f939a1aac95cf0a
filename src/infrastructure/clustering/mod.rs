//! Clustering engine.
//!
//! Five algorithm families over mixed numeric/nominal tables:
//!
//! | Family | Type | Model |
//! |---|---|---|
//! | k-means | [`KMeans`] | centroids (mean / mode) |
//! | EM | [`Em`] | mixture of per-attribute normal / discrete estimators |
//! | agglomerative | [`Hierarchical`] | merge tree cut at `k` clusters |
//! | Cobweb / Classit | [`Cobweb`] | incremental concept tree |
//! | farthest-first | [`FarthestFirst`] | traversal centres |
//!
//! Data enters through [`Table`], a dense `f64` encoding of a
//! [`Dataset`](crate::domain::models::Dataset) in which `NaN` marks a
//! missing value. Every fitted model implements [`Clusterer`] and can be
//! summarised with [`evaluate`].
//!
//! ```rust
//! use clusterhub::infrastructure::clustering::{evaluate, Column, KMeans, Table};
//!
//! let table = Table::new(
//!     vec![Column::Numeric],
//!     vec![vec![0.0], vec![0.2], vec![9.8], vec![10.0]],
//! )
//! .unwrap();
//! let model = KMeans::new(2).fit(&table).unwrap();
//! let eval = evaluate(&model, &table).unwrap();
//! assert_eq!(eval.cluster_counts, vec![2, 2]);
//! ```

mod cobweb;
mod distance;
mod em;
mod error;
mod evaluation;
mod farthest_first;
mod hierarchical;
mod kmeans;
mod table;
mod traits;

pub use cobweb::{Cobweb, CobwebTree};
pub use distance::{Distance, Metric};
pub use em::{Em, EmModel, Estimator};
pub use error::{Error, Result};
pub use evaluation::{evaluate, ClusterEvaluation};
pub use farthest_first::{FarthestFirst, FarthestFirstModel};
pub use hierarchical::{Hierarchical, HierarchicalModel, Linkage};
pub use kmeans::{KMeans, KMeansModel};
pub use table::{encode, Column, Table};
pub use traits::Clusterer;
