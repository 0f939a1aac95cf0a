//! Read-only table of the algorithms the service publishes.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::domain::models::{AlgorithmEntry, AlgorithmKind};

/// Algorithm table, built once at startup and shared behind an `Arc`.
#[derive(Debug)]
pub struct AlgorithmRegistry {
    entries: Vec<AlgorithmEntry>,
    lookups: AtomicUsize,
}

impl AlgorithmRegistry {
    /// The five standard families, codes 1 through 5.
    pub fn standard() -> Self {
        Self {
            entries: AlgorithmKind::ALL.into_iter().map(AlgorithmEntry::from).collect(),
            lookups: AtomicUsize::new(0),
        }
    }

    /// Entries in code order.
    pub fn list_algorithms(&self) -> &[AlgorithmEntry] {
        &self.entries
    }

    /// Family for a request code, if the code is registered.
    pub fn resolve(&self, code: i64) -> Option<AlgorithmKind> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        let kind = AlgorithmKind::from_code(code)?;
        self.entries
            .iter()
            .any(|e| e.code == kind.code())
            .then_some(kind)
    }

    /// Number of `resolve` calls so far.
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::Relaxed)
    }
}

impl Default for AlgorithmRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_order() {
        let registry = AlgorithmRegistry::standard();
        let names: Vec<&str> = registry.list_algorithms().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["SimpleKMeans", "EM", "HierarchicalClusterer", "Cobweb", "FarthestFirst"]
        );
        let codes: Vec<u8> = registry.list_algorithms().iter().map(|e| e.code).collect();
        assert_eq!(codes, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_listing_is_stable() {
        let registry = AlgorithmRegistry::standard();
        assert_eq!(registry.list_algorithms(), registry.list_algorithms());
    }

    #[test]
    fn test_resolve_counts_lookups() {
        let registry = AlgorithmRegistry::standard();
        assert_eq!(registry.resolve(3), Some(AlgorithmKind::Hierarchical));
        assert_eq!(registry.resolve(0), None);
        assert_eq!(registry.resolve(99), None);
        assert_eq!(registry.lookup_count(), 3);
    }
}
