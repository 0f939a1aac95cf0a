//! Property tests for the option-string grammar.

use clusterhub::adapters::clusterers::ClustererRegistry;
use clusterhub::domain::models::{parse_option_string, AlgorithmKind};
use clusterhub::domain::ports::AdapterFactory;
use proptest::prelude::*;

proptest! {
    /// Every produced flag token is dash-prefixed and no token is blank
    #[test]
    fn prop_tokens_are_well_formed(raw in ".{0,64}") {
        let tokens = parse_option_string(&raw);
        for token in &tokens {
            prop_assert!(!token.trim().is_empty());
        }
        if let Some(first) = tokens.first() {
            prop_assert!(first.starts_with('-'));
        }
    }

    /// Each non-blank token yields one flag and at most one value
    #[test]
    fn prop_at_most_one_value_per_flag(
        parts in prop::collection::vec(("[A-Za-z]{1,4}", prop::option::of("[0-9]{1,3}")), 0..6)
    ) {
        let raw: Vec<String> = parts
            .iter()
            .map(|(flag, value)| match value {
                Some(v) => format!("{flag} {v}"),
                None => flag.clone(),
            })
            .collect();
        let tokens = parse_option_string(&raw.join(";"));
        let expected: usize = parts.iter().map(|(_, v)| 1 + usize::from(v.is_some())).sum();
        prop_assert_eq!(tokens.len(), expected);
    }

    /// Configure never panics and a rejected configure leaves defaults usable
    #[test]
    fn prop_configure_is_total(raw in "[-A-Za-z0-9 ;.]{0,40}") {
        let registry = ClustererRegistry::new();
        let tokens = parse_option_string(&raw);
        for kind in AlgorithmKind::ALL {
            let mut adapter = registry.create(kind);
            if adapter.configure(&tokens).is_err() {
                let defaults = adapter.default_options();
                prop_assert!(adapter.configure(&defaults).is_ok());
            }
        }
    }
}
