//! `algorithms`: print the registry.

use anyhow::Result;
use serde::Serialize;

use crate::cli::output::{list_table, output, CommandOutput};
use crate::domain::models::AlgorithmEntry;
use crate::services::AlgorithmRegistry;

#[derive(Debug, Serialize)]
pub struct AlgorithmListOutput {
    pub algorithms: Vec<AlgorithmEntry>,
}

impl CommandOutput for AlgorithmListOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["code", "name"]);
        for entry in &self.algorithms {
            table.add_row(vec![entry.code.to_string(), entry.name.clone()]);
        }
        table.to_string()
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.algorithms).unwrap_or_default()
    }
}

pub fn execute(json_mode: bool) -> Result<()> {
    let registry = AlgorithmRegistry::standard();
    let out = AlgorithmListOutput {
        algorithms: registry.list_algorithms().to_vec(),
    };
    output(&out, json_mode);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_output_lists_every_algorithm() {
        let out = AlgorithmListOutput {
            algorithms: AlgorithmRegistry::standard().list_algorithms().to_vec(),
        };
        let text = out.to_human();
        for name in ["SimpleKMeans", "EM", "HierarchicalClusterer", "Cobweb", "FarthestFirst"] {
            assert!(text.contains(name), "{name}");
        }
        assert_eq!(out.to_json().as_array().map(Vec::len), Some(5));
    }
}
