//! clusterhub - clustering algorithms behind a REST façade
//!
//! A request names a dataset by `(id, table)` and picks one of five
//! clustering families. The service resolves the dataset, runs the
//! algorithm and answers with a uniform [`ResultEnvelope`] that carries the
//! family-specific output and an accumulated diagnostic log.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): datasets, the result envelope, errors and ports
//! - **Service Layer** (`services`): registry, dispatcher, run service, envelope codec
//! - **Adapters** (`adapters`): clustering families, dataset sources, HTTP transport
//! - **Infrastructure Layer** (`infrastructure`): clustering engine, ARFF, config, logging
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use clusterhub::adapters::clusterers::ClustererRegistry;
//! use clusterhub::domain::models::{Attribute, Dataset, Value};
//! use clusterhub::services::{AlgorithmRegistry, Dispatcher};
//!
//! let dataset = Dataset::new(
//!     "points",
//!     vec![Attribute::numeric("x")],
//!     vec![
//!         vec![Value::Numeric(0.0)],
//!         vec![Value::Numeric(0.5)],
//!         vec![Value::Numeric(9.5)],
//!         vec![Value::Numeric(10.0)],
//!     ],
//! )
//! .unwrap();
//!
//! let dispatcher = Dispatcher::new(
//!     Arc::new(AlgorithmRegistry::standard()),
//!     Arc::new(ClustererRegistry::new()),
//! );
//! let envelope = dispatcher.run(5, &dataset, &[]);
//! assert!(envelope.correct);
//! assert!(envelope.info().ends_with("FarthestFirst: OK"));
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{
    AlgorithmEntry, AlgorithmKind, ClusterOutput, Config, Dataset, FailureKind, LoggingConfig,
    ResultEnvelope,
};
pub use domain::ports::{AdapterFactory, ClusterAdapter, DatasetSource};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{AlgorithmRegistry, Dispatcher, RunRequest, RunService};
