//! Input file loading

use anyhow::{Context, Result};
use sase_forms::{FieldConfig, Form, SubmissionData};
use sase_rules::{EmailRule, EmailTemplate};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Parse a JSON or YAML file, chosen by extension.
pub fn load<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content =
        fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;

    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml" | "yml") => serde_yaml::from_str(&content)
            .with_context(|| format!("invalid YAML in {}", path.display())),
        _ => serde_json::from_str(&content)
            .with_context(|| format!("invalid JSON in {}", path.display())),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FormFile {
    Fields(Vec<FieldConfig>),
    Form(Form),
}

/// Load a form file holding either a full form or a bare field list.
pub fn load_form(path: &Path) -> Result<Form> {
    Ok(match load::<FormFile>(path)? {
        FormFile::Form(form) => form,
        FormFile::Fields(fields) => {
            let name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("form")
                .to_string();
            let mut form = Form::with_id(name.clone(), name);
            for field in fields {
                form.add_field(None, field);
            }
            form.take_events();
            form
        }
    })
}

pub fn load_data(path: &Path) -> Result<SubmissionData> {
    load(path)
}

pub fn load_rules(path: &Path) -> Result<Vec<EmailRule>> {
    load(path)
}

pub fn load_templates(path: &Path) -> Result<Vec<EmailTemplate>> {
    load(path)
}

/// Write a form back in the format its extension names.
pub fn save_form(form: &Form, path: &Path) -> Result<()> {
    let content = match path.extension().and_then(|e| e.to_str()) {
        Some("yaml" | "yml") => serde_yaml::to_string(form)?,
        _ => serde_json::to_string_pretty(form)?,
    };
    fs::write(path, content).with_context(|| format!("cannot write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_field_list_and_yaml() {
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("contact.json");
        fs::write(&json_path, r#"[{"id": "f1", "label": "Email", "type": "email"}]"#).unwrap();
        let form = load_form(&json_path).unwrap();
        assert_eq!(form.id(), "contact");
        assert_eq!(form.flattened_fields().len(), 1);

        let yaml_path = dir.path().join("data.yaml");
        fs::write(&yaml_path, "f1: ada@example.com\nf2: 3\n").unwrap();
        let data = load_data(&yaml_path).unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data.keys().next().map(String::as_str), Some("f1"));
    }

    #[test]
    fn test_errors_name_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");
        fs::write(&path, "{not json").unwrap();
        let err = format!("{:#}", load_rules(&path).unwrap_err());
        assert!(err.contains("rules.json"));
    }
}
