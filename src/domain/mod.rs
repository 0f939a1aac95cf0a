//! Domain layer for clusterhub
//!
//! Datasets, the result envelope, the algorithm catalogue and the ports the
//! service talks to.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{
    CodecError, ConfigurationError, DataSourceError, EvaluationError, FitError, PopulateError,
};
