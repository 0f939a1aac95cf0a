//! Port trait definitions (Hexagonal Architecture)
//!
//! - `ClusterAdapter` / `AdapterFactory`: clustering algorithm families
//! - `DatasetSource`: dataset resolution by `(id, table)`

pub mod cluster_adapter;
pub mod dataset_source;

pub use cluster_adapter::{AdapterFactory, ClusterAdapter, Population};
pub use dataset_source::DatasetSource;
