//! Infrastructure layer module
//!
//! - ARFF text codec
//! - The clustering engine the algorithm adapters wrap
//! - Configuration management
//! - Logging infrastructure

pub mod arff;
pub mod clustering;
pub mod config;
pub mod logging;
