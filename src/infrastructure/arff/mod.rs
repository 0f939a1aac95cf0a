//! ARFF text codec
//!
//! Reading lives here; rendering is the `Display` impl of
//! [`Dataset`](crate::domain::models::Dataset).

mod reader;

pub use reader::parse_arff;

use thiserror::Error;

use crate::domain::models::DatasetError;

/// ARFF parsing errors
#[derive(Error, Debug)]
pub enum ArffError {
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("attribute '{attribute}' has unsupported type '{kind}'")]
    UnsupportedType { attribute: String, kind: String },

    #[error("missing @relation declaration")]
    MissingRelation,

    #[error("missing @data section")]
    MissingData,

    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

impl From<ArffError> for crate::domain::errors::DataSourceError {
    fn from(err: ArffError) -> Self {
        Self::Parse(err.to_string())
    }
}
