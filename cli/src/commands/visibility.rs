//! Visibility command

use super::load_submission;
use crate::output::OutputFormat;
use crate::SubmissionArgs;
use colored::Colorize;
use sase_rules::{is_visible, EngineConfig, FieldResolver};
use serde::Serialize;
use tabled::Tabled;

#[derive(Debug, Serialize, Tabled)]
pub struct VisibilityRow {
    pub field_id: String,
    pub label: String,
    #[tabled(display_with = "display_visible")]
    pub visible: bool,
    pub conditional: bool,
}

fn display_visible(visible: &bool) -> String {
    if *visible {
        "shown".green().to_string()
    } else {
        "hidden".red().to_string()
    }
}

pub fn handle(input: &SubmissionArgs, config: &EngineConfig, format: OutputFormat) -> Result<(), String> {
    let (fields, data) = load_submission(input)?;
    let resolver = FieldResolver::with_config(&fields, &data, config.resolver.clone());

    let rows: Vec<VisibilityRow> = fields
        .iter()
        .map(|field| VisibilityRow {
            field_id: field.id.clone(),
            label: field.label.clone(),
            visible: is_visible(field.visibility.as_ref(), &resolver),
            conditional: field.visibility.is_some(),
        })
        .collect();

    format.print_rows(&rows);
    Ok(())
}
