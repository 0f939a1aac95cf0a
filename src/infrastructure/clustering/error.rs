use thiserror::Error;

/// Errors returned by clustering algorithms in this module.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Input has no instances.
    #[error("empty input")]
    EmptyInput,

    /// An attribute type the algorithm cannot handle.
    #[error("cannot handle {kind} attribute '{name}'")]
    UnsupportedAttribute {
        /// Attribute name.
        name: String,
        /// Attribute type name.
        kind: &'static str,
    },

    /// Invalid parameter value.
    #[error("invalid parameter {name}: {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Human-readable explanation.
        message: &'static str,
    },

    /// Requested cluster count is incompatible with the dataset.
    #[error("invalid cluster count: requested {requested}, but dataset has {n_items} items")]
    InvalidClusterCount {
        /// Number of clusters requested.
        requested: usize,
        /// Number of items in the dataset.
        n_items: usize,
    },

    /// An instance has a different number of values than the training data.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Expected number of attributes.
        expected: usize,
        /// Found number of attributes.
        found: usize,
    },

    /// Numerical breakdown during fitting.
    #[error("numerical failure: {0}")]
    Numerical(String),
}

/// Result type used by the clustering engine.
pub type Result<T> = std::result::Result<T, Error>;
