//! Resolve command

use super::load_submission;
use crate::output::OutputFormat;
use crate::SubmissionArgs;
use colored::Colorize;
use sase_forms::display_value;
use sase_rules::{EngineConfig, FieldResolver};
use serde::Serialize;
use serde_json::Value;
use tabled::Tabled;

#[derive(Debug, Serialize, Tabled)]
pub struct ResolutionRow {
    pub key: String,
    pub tier: String,
    pub source: String,
    #[tabled(skip)]
    pub value: Option<Value>,
    #[serde(skip)]
    #[tabled(rename = "value")]
    pub display: String,
}

pub fn handle(
    input: &SubmissionArgs,
    keys: &[String],
    config: &EngineConfig,
    format: OutputFormat,
) -> Result<(), String> {
    let (fields, data) = load_submission(input)?;
    let resolver = FieldResolver::with_config(&fields, &data, config.resolver.clone());

    let rows: Vec<ResolutionRow> = keys
        .iter()
        .map(|key| match resolver.resolve_traced(key) {
            Some(found) => ResolutionRow {
                key: key.clone(),
                tier: found.tier.as_str().to_string(),
                source: found.source,
                display: display_value(&found.value),
                value: Some(found.value),
            },
            None => ResolutionRow {
                key: key.clone(),
                tier: "unresolved".red().to_string(),
                source: "-".into(),
                value: None,
                display: String::new(),
            },
        })
        .collect();

    format.print_rows(&rows);
    Ok(())
}
