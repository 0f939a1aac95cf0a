pub mod algorithm_registry;
pub mod dispatcher;
pub mod envelope_codec;
pub mod run_service;

pub use algorithm_registry::AlgorithmRegistry;
pub use dispatcher::{Dispatcher, RunState};
pub use run_service::{RunRequest, RunService};
