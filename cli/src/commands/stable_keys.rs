//! Stable key command

use crate::input;
use crate::output::{or_dash, OutputFormat};
use colored::Colorize;
use serde::Serialize;
use std::path::Path;
use tabled::Tabled;

#[derive(Debug, Serialize, Tabled)]
pub struct StableKeyRow {
    pub field_id: String,
    pub label: String,
    pub stable_key: String,
    #[tabled(display_with = "display_assigned")]
    pub newly_assigned: bool,
    #[tabled(display_with = "or_dash")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mapping: Option<String>,
}

fn display_assigned(assigned: &bool) -> String {
    if *assigned {
        "new".green().to_string()
    } else {
        "kept".dimmed().to_string()
    }
}

pub fn handle(path: &Path, write: bool, format: OutputFormat) -> Result<(), String> {
    let mut form = input::load_form(path).map_err(|e| format!("{e:#}"))?;
    let before: Vec<bool> = form
        .flattened_fields()
        .iter()
        .map(|f| f.stable_id().is_some())
        .collect();

    let assigned = form.ensure_stable_keys();
    let rows: Vec<StableKeyRow> = form
        .flattened_fields()
        .iter()
        .zip(before)
        .map(|(field, had_key)| StableKeyRow {
            field_id: field.id.clone(),
            label: field.label.clone(),
            stable_key: field.stable_id().unwrap_or_default().to_string(),
            newly_assigned: !had_key,
            mapping: field.mapping().map(str::to_string),
        })
        .collect();
    format.print_rows(&rows);

    if write && assigned > 0 {
        input::save_form(&form, path).map_err(|e| format!("{e:#}"))?;
        eprintln!("Wrote {} new stable key(s) to {}", assigned, path.display());
    }
    Ok(())
}
