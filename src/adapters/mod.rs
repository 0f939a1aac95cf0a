//! Adapters for clustering families, dataset sources and HTTP transport.

pub mod clusterers;
pub mod data_sources;
pub mod http;
