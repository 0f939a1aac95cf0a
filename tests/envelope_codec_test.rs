//! Transport round-trip of populated envelopes.

mod common;

use clusterhub::domain::models::{AlgorithmKind, FailureKind, ResultEnvelope};
use clusterhub::services::envelope_codec::{decode, encode, encode_pretty};
use common::{dispatcher, weather};

#[test]
fn test_round_trip_for_every_family() {
    let (dispatcher, _) = dispatcher();
    let dataset = weather();

    for kind in AlgorithmKind::ALL {
        let envelope = dispatcher.run(i64::from(kind.code()), &dataset, &[]);
        assert!(envelope.correct, "{kind}");
        let decoded = decode(&encode(&envelope).unwrap()).unwrap();
        assert_eq!(decoded, envelope, "{kind}");
        assert_eq!(decode(&encode_pretty(&envelope).unwrap()).unwrap(), envelope, "{kind}");
    }
}

#[test]
fn test_round_trip_preserves_diagnostic_only() {
    let (dispatcher, _) = dispatcher();
    let envelope = dispatcher.run(9, &weather(), &[]);
    let decoded = decode(&encode(&envelope).unwrap()).unwrap();
    assert!(decoded.is_diagnostic_only());
    assert_eq!(decoded.failure, Some(FailureKind::UnknownAlgorithm));
    assert!(decoded.is_consistent());
}

#[test]
fn test_family_tag_is_visible_on_the_wire() {
    let (dispatcher, _) = dispatcher();
    let envelope = dispatcher.run(3, &weather(), &[]);
    let value: serde_json::Value = serde_json::from_str(&encode(&envelope).unwrap()).unwrap();
    assert_eq!(value["envelope"]["report"]["output"]["family"], "hierarchical");
    assert_eq!(value["envelope"]["algorithm_name"], "HierarchicalClusterer");
}

#[test]
fn test_encoding_is_stable() {
    let envelope = ResultEnvelope::diagnostic(FailureKind::Evaluation, "stable");
    assert_eq!(encode(&envelope).unwrap(), encode(&envelope.clone()).unwrap());
}
