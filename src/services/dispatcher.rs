//! Run lifecycle: resolve, configure, fit, evaluate, populate.
//!
//! Two error tiers:
//! - options the adapter rejects are logged and replaced by the adapter's
//!   defaults, and the run continues;
//! - a dataset the adapter cannot fit or evaluate aborts the run with a
//!   diagnostic-only envelope.
//!
//! The dispatcher itself never fails; every outcome is an envelope.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::domain::models::{Dataset, FailureKind, ResultEnvelope, RunReport};
use crate::domain::ports::{AdapterFactory, ClusterAdapter};

use super::algorithm_registry::AlgorithmRegistry;

/// Lifecycle position of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Configuring,
    /// Caller options rejected; defaults in effect.
    ConfigFallback,
    Fitting,
    Evaluating,
    /// Report attached, run correct.
    Populated,
    /// Diagnostic-only envelope.
    Aborted,
}

/// Accumulates the envelope and mirrors log lines to tracing.
struct Run {
    envelope: ResultEnvelope,
    source: &'static str,
    state: RunState,
}

impl Run {
    fn new(source: &'static str) -> Self {
        Self {
            envelope: ResultEnvelope::new(),
            source,
            state: RunState::Idle,
        }
    }

    fn enter(&mut self, state: RunState) {
        debug!(run_id = %self.envelope.run_id, from = ?self.state, to = ?state, "run state");
        self.state = state;
    }

    fn log(&mut self, message: impl AsRef<str>) {
        let message = message.as_ref();
        info!(run_id = %self.envelope.run_id, algorithm = self.source, "{message}");
        self.envelope.log.push(self.source, message);
    }

    fn abort(mut self, failure: FailureKind) -> ResultEnvelope {
        warn!(run_id = %self.envelope.run_id, algorithm = self.source, ?failure, "run aborted");
        self.enter(RunState::Aborted);
        self.envelope.fail(failure);
        self.envelope
    }
}

/// Runs one algorithm over one dataset and returns the envelope.
pub struct Dispatcher {
    registry: Arc<AlgorithmRegistry>,
    factory: Arc<dyn AdapterFactory>,
}

impl Dispatcher {
    pub fn new(registry: Arc<AlgorithmRegistry>, factory: Arc<dyn AdapterFactory>) -> Self {
        Self { registry, factory }
    }

    pub fn registry(&self) -> &Arc<AlgorithmRegistry> {
        &self.registry
    }

    /// Execute a run. Never fails: problems are reported in the envelope.
    #[instrument(skip(self, dataset, options), fields(relation = dataset.relation()))]
    pub fn run(&self, code: i64, dataset: &Dataset, options: &[String]) -> ResultEnvelope {
        let Some(kind) = self.registry.resolve(code) else {
            let mut run = Run::new("Unknown");
            run.envelope.algorithm_type = u8::try_from(code).ok();
            run.envelope.algorithm_name = Some("Unknown".to_string());
            run.envelope.options = options.to_vec();
            run.log(format!("unknown algorithm type {code}"));
            return run.abort(FailureKind::UnknownAlgorithm);
        };

        let mut adapter = self.factory.create(kind);
        let mut run = Run::new(kind.name());
        run.envelope.algorithm_type = Some(kind.code());
        run.envelope.algorithm_name = Some(kind.name().to_string());
        run.envelope.revision = Some(adapter.revision().to_string());

        run.enter(RunState::Configuring);
        match Self::configure(&mut run, adapter.as_mut(), options) {
            Some(used) => run.envelope.options = used,
            None => return run.abort(FailureKind::Configuration),
        }

        run.enter(RunState::Fitting);
        if let Err(err) = adapter.fit(dataset) {
            run.log(err.to_string());
            return run.abort(FailureKind::Fit);
        }

        run.enter(RunState::Evaluating);
        let evaluation = match adapter.evaluate(dataset) {
            Ok(evaluation) => evaluation,
            Err(err) => {
                run.log(err.to_string());
                return run.abort(FailureKind::Evaluation);
            }
        };

        let population = match adapter.populate() {
            Ok(population) => population,
            Err(err) => {
                run.log(err.to_string());
                return run.abort(FailureKind::Evaluation);
            }
        };
        for note in &population.notes {
            run.log(note);
        }
        run.envelope.set_report(RunReport {
            evaluation,
            output: population.output,
        });
        run.enter(RunState::Populated);
        run.log("OK");
        run.envelope
    }

    /// Apply `options`, falling back to the adapter defaults once.
    ///
    /// Returns the tokens actually in effect, or `None` if even the
    /// defaults were rejected.
    fn configure(
        run: &mut Run,
        adapter: &mut dyn ClusterAdapter,
        options: &[String],
    ) -> Option<Vec<String>> {
        let Err(err) = adapter.configure(options) else {
            return Some(options.to_vec());
        };
        run.log(err.to_string());

        let defaults = adapter.default_options();
        run.enter(RunState::ConfigFallback);
        run.log(format!("falling back to default options: {}", defaults.join(" ")));
        match adapter.configure(&defaults) {
            Ok(()) => Some(defaults),
            Err(err) => {
                run.log(err.to_string());
                None
            }
        }
    }
}
