//! Common test utilities for integration tests
//!
//! Provides shared fixtures and helpers used across the integration test
//! files.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use clusterhub::adapters::clusterers::ClustererRegistry;
use clusterhub::adapters::data_sources::InMemoryDataSource;
use clusterhub::domain::models::{Attribute, Dataset, Value};
use clusterhub::infrastructure::arff::parse_arff;
use clusterhub::services::{AlgorithmRegistry, Dispatcher, RunService};

/// Path of a bundled demo dataset
pub fn demo_path(table: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("data")
        .join("demo")
        .join(format!("{table}.arff"))
}

/// The bundled weather table
pub fn weather() -> Dataset {
    let text = std::fs::read_to_string(demo_path("weather")).expect("weather.arff should exist");
    parse_arff(&text).expect("weather.arff should parse")
}

/// The bundled table with a string attribute
pub fn notes() -> Dataset {
    let text = std::fs::read_to_string(demo_path("notes")).expect("notes.arff should exist");
    parse_arff(&text).expect("notes.arff should parse")
}

/// Two well separated numeric blobs of `per_blob` points each
pub fn blobs(per_blob: usize) -> Dataset {
    let mut rows = Vec::with_capacity(per_blob * 2);
    for i in 0..per_blob {
        let jitter = i as f64 * 0.1;
        rows.push(vec![Value::Numeric(jitter), Value::Numeric(1.0 - jitter)]);
        rows.push(vec![Value::Numeric(20.0 + jitter), Value::Numeric(21.0 - jitter)]);
    }
    Dataset::new(
        "blobs",
        vec![Attribute::numeric("x"), Attribute::numeric("y")],
        rows,
    )
    .expect("blobs dataset should be valid")
}

/// Empty dataset with the weather schema
pub fn empty() -> Dataset {
    weather().with_instances("empty", Vec::new()).expect("schema should be reusable")
}

/// Dispatcher over the standard registry, with the registry handle
pub fn dispatcher() -> (Dispatcher, Arc<AlgorithmRegistry>) {
    let registry = Arc::new(AlgorithmRegistry::standard());
    let dispatcher = Dispatcher::new(Arc::clone(&registry), Arc::new(ClustererRegistry::new()));
    (dispatcher, registry)
}

/// Run service backed by an in-memory source holding the demo tables under id `demo`
pub fn run_service() -> (Arc<RunService>, Arc<AlgorithmRegistry>) {
    let (dispatcher, registry) = dispatcher();
    let source = InMemoryDataSource::new()
        .with_dataset("demo", "weather", weather())
        .with_dataset("demo", "notes", notes())
        .with_dataset("demo", "blobs", blobs(5))
        .with_dataset("demo", "empty", empty());
    (
        Arc::new(RunService::new(Arc::new(dispatcher), Arc::new(source))),
        registry,
    )
}

/// Option tokens from string literals
pub fn tokens(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|s| (*s).to_string()).collect()
}
