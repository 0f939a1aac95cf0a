//! Clusterer registry and factory.

use crate::domain::models::AlgorithmKind;
use crate::domain::ports::{AdapterFactory, ClusterAdapter};

use super::cobweb::CobwebAdapter;
use super::em::EmAdapter;
use super::farthest_first::FarthestFirstAdapter;
use super::hierarchical::HierarchicalAdapter;
use super::simple_kmeans::SimpleKMeansAdapter;

/// Builds a fresh adapter for every run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClustererRegistry;

impl ClustererRegistry {
    pub const fn new() -> Self {
        Self
    }

    /// Create an adapter by family.
    pub fn create_by_kind(&self, kind: AlgorithmKind) -> Box<dyn ClusterAdapter> {
        match kind {
            AlgorithmKind::SimpleKMeans => Box::new(SimpleKMeansAdapter::new()),
            AlgorithmKind::Em => Box::new(EmAdapter::new()),
            AlgorithmKind::Hierarchical => Box::new(HierarchicalAdapter::new()),
            AlgorithmKind::Cobweb => Box::new(CobwebAdapter::new()),
            AlgorithmKind::FarthestFirst => Box::new(FarthestFirstAdapter::new()),
        }
    }
}

impl AdapterFactory for ClustererRegistry {
    fn create(&self, kind: AlgorithmKind) -> Box<dyn ClusterAdapter> {
        self.create_by_kind(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_by_kind() {
        let registry = ClustererRegistry::new();
        for kind in AlgorithmKind::ALL {
            assert_eq!(registry.create(kind).kind(), kind);
        }
    }

    #[test]
    fn test_default_options() {
        let registry = ClustererRegistry::new();
        assert_eq!(registry.create(AlgorithmKind::SimpleKMeans).default_options(), vec!["-O"]);
        assert!(registry.create(AlgorithmKind::Em).default_options().is_empty());
    }

    #[test]
    fn test_defaults_always_configure() {
        let registry = ClustererRegistry::new();
        for kind in AlgorithmKind::ALL {
            let mut adapter = registry.create(kind);
            let defaults = adapter.default_options();
            assert!(adapter.configure(&defaults).is_ok(), "{kind}");
        }
    }
}
