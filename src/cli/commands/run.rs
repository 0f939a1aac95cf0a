//! `run`: dispatch one algorithm over a local ARFF file.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::output::{list_table, output, truncate, CommandOutput};
use crate::domain::models::{parse_option_string, ResultEnvelope};
use crate::infrastructure::arff::parse_arff;
use crate::services::envelope_codec;

use super::standard_dispatcher;

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct RunOutput {
    pub envelope: ResultEnvelope,
}

impl CommandOutput for RunOutput {
    fn to_human(&self) -> String {
        let e = &self.envelope;
        let mut table = list_table(&["field", "value"]);
        table.add_row(vec![
            "algorithm".to_string(),
            format!(
                "{} ({})",
                e.algorithm_name.as_deref().unwrap_or("-"),
                e.algorithm_type.map_or_else(|| "-".to_string(), |c| c.to_string())
            ),
        ]);
        table.add_row(vec!["correct".to_string(), e.correct.to_string()]);
        if let Some(failure) = e.failure {
            table.add_row(vec!["failure".to_string(), format!("{failure:?}")]);
        }
        table.add_row(vec!["options".to_string(), truncate(&e.options.join(" "), 60)]);
        table.add_row(vec!["revision".to_string(), e.revision.clone().unwrap_or_default()]);
        if let Some(output) = e.output() {
            table.add_row(vec!["clusters".to_string(), output.number_of_clusters().to_string()]);
        }

        let mut text = table.to_string();
        if let Some(evaluation) = e.evaluation() {
            text.push_str("\n\n");
            text.push_str(&evaluation.summary);
        }
        text.push_str("\n\n");
        text.push_str(&e.info());
        text
    }

    fn to_json(&self) -> serde_json::Value {
        envelope_codec::encode(&self.envelope)
            .ok()
            .and_then(|text| serde_json::from_str(&text).ok())
            .unwrap_or_default()
    }
}

pub async fn execute(
    algorithm: i64,
    file: &Path,
    options: Option<&str>,
    json_mode: bool,
) -> Result<()> {
    let text = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let dataset = parse_arff(&text).with_context(|| format!("Failed to parse {}", file.display()))?;
    let tokens = parse_option_string(options.unwrap_or_default());

    let envelope =
        tokio::task::spawn_blocking(move || standard_dispatcher().run(algorithm, &dataset, &tokens))
            .await
            .context("Run task failed")?;

    output(&RunOutput { envelope }, json_mode);
    Ok(())
}
