//! Evaluate command

use super::load_submission;
use crate::input;
use crate::output::OutputFormat;
use crate::SubmissionArgs;
use colored::Colorize;
use sase_rules::{EngineConfig, RuleEngine};
use serde::Serialize;
use std::path::Path;
use tabled::Tabled;

#[derive(Debug, Serialize, Tabled)]
pub struct RuleRow {
    pub id: String,
    pub name: String,
    pub enabled: bool,
    #[tabled(display_with = "display_matched")]
    pub matched: bool,
    pub template_id: String,
}

fn display_matched(matched: &bool) -> String {
    if *matched {
        "yes".green().bold().to_string()
    } else {
        "no".dimmed().to_string()
    }
}

pub fn handle(
    args: &SubmissionArgs,
    rules_path: &Path,
    config: &EngineConfig,
    format: OutputFormat,
) -> Result<(), String> {
    let (fields, data) = load_submission(args)?;
    let rules = input::load_rules(rules_path).map_err(|e| format!("{e:#}"))?;

    let engine = RuleEngine::new(config.clone());
    let resolver = engine.resolver(&fields, &data);
    let matched: Vec<&str> = engine
        .select(&rules, &resolver)
        .into_iter()
        .map(|r| r.id.as_str())
        .collect();

    let rows: Vec<RuleRow> = rules
        .iter()
        .map(|rule| RuleRow {
            id: rule.id.clone(),
            name: rule.name.clone(),
            enabled: rule.enabled,
            matched: matched.contains(&rule.id.as_str()),
            template_id: rule.template_id.clone(),
        })
        .collect();
    format.print_rows(&rows);

    let stats = engine.stats();
    if stats.invalid_conditions > 0 {
        eprintln!(
            "{} {} malformed condition(s) evaluated as false",
            "warning:".yellow().bold(),
            stats.invalid_conditions
        );
    }
    Ok(())
}
