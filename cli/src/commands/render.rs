//! Render command

use super::load_submission;
use crate::SubmissionArgs;
use sase_rules::{EngineConfig, FieldResolver, TemplateInterpolator};
use std::fs;
use std::path::Path;

pub fn handle(
    input: &SubmissionArgs,
    template: Option<String>,
    template_file: Option<&Path>,
    config: &EngineConfig,
) -> Result<(), String> {
    let text = match (template, template_file) {
        (Some(text), _) => text,
        (None, Some(path)) => fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {}", path.display(), e))?,
        (None, None) => return Err("either --template or --template-file is required".into()),
    };

    let (fields, data) = load_submission(input)?;
    let resolver = FieldResolver::with_config(&fields, &data, config.resolver.clone());
    let interpolator = TemplateInterpolator::new(&config.template_cache);

    println!("{}", interpolator.render(&text, &resolver));
    Ok(())
}
