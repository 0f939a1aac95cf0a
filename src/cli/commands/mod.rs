//! Subcommand implementations.

pub mod algorithms;
pub mod run;
pub mod serve;

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::adapters::clusterers::ClustererRegistry;
use crate::adapters::data_sources;
use crate::domain::models::Config;
use crate::infrastructure::config::ConfigLoader;
use crate::services::{AlgorithmRegistry, Dispatcher, RunService};

/// Load the configuration named on the command line, or the project default.
pub fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    match path {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}

/// Dispatcher over the standard registry and the built-in clusterers.
pub fn standard_dispatcher() -> Dispatcher {
    Dispatcher::new(
        Arc::new(AlgorithmRegistry::standard()),
        Arc::new(ClustererRegistry::new()),
    )
}

/// Wire the run service from configuration.
pub fn build_run_service(config: &Config) -> Result<Arc<RunService>> {
    let source = data_sources::from_config(&config.data_source)
        .context("Failed to create dataset source")?;
    Ok(Arc::new(RunService::new(Arc::new(standard_dispatcher()), source)))
}
