pub mod algorithm;
pub mod config;
pub mod dataset;
pub mod envelope;
pub mod options;

pub use algorithm::{AlgorithmEntry, AlgorithmKind};
pub use config::{
    Config, DataSourceConfig, DataSourceKind, LogFormat, LoggingConfig, RotationPolicy,
    ServerConfig,
};
pub use dataset::{Attribute, AttributeKind, Dataset, DatasetError, Instance, Value};
pub use envelope::{
    CentroidOutput, ClusterOutput, ConceptualOutput, DiagnosticLog, DistanceFunctionSnapshot,
    EvaluationSummary, FailureKind, GraphSnapshot, GraphType, HierarchicalOutput, NormalEstimate,
    ProbabilisticOutput, ResultEnvelope, RunReport, SeedBasedOutput, LOG_HEADER,
};
pub use options::parse_option_string;
