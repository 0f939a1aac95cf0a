use serde::{Deserialize, Serialize};

/// Clustering family an algorithm code maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlgorithmKind {
    /// Centroid-based (k-means).
    SimpleKMeans,
    /// Probabilistic (expectation maximisation).
    Em,
    /// Agglomerative hierarchical clustering.
    Hierarchical,
    /// Conceptual, incremental clustering.
    Cobweb,
    /// Seed-based farthest-first traversal.
    FarthestFirst,
}

impl AlgorithmKind {
    /// All families in registry order.
    pub const ALL: [Self; 5] = [
        Self::SimpleKMeans,
        Self::Em,
        Self::Hierarchical,
        Self::Cobweb,
        Self::FarthestFirst,
    ];

    /// Public algorithm code.
    pub const fn code(self) -> u8 {
        match self {
            Self::SimpleKMeans => 1,
            Self::Em => 2,
            Self::Hierarchical => 3,
            Self::Cobweb => 4,
            Self::FarthestFirst => 5,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::SimpleKMeans => "SimpleKMeans",
            Self::Em => "EM",
            Self::Hierarchical => "HierarchicalClusterer",
            Self::Cobweb => "Cobweb",
            Self::FarthestFirst => "FarthestFirst",
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|k| i64::from(k.code()) == code)
    }
}

impl std::fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One row of the algorithm registry, as published to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlgorithmEntry {
    pub code: u8,
    pub name: String,
}

impl From<AlgorithmKind> for AlgorithmEntry {
    fn from(kind: AlgorithmKind) -> Self {
        Self {
            code: kind.code(),
            name: kind.name().to_string(),
        }
    }
}
