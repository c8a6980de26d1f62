//! CLI Commands

pub mod config;
pub mod dispatch;
pub mod evaluate;
pub mod render;
pub mod resolve;
pub mod stable_keys;
pub mod visibility;

use crate::{input, SubmissionArgs};
use sase_forms::{FieldConfig, SubmissionData};

/// Fields (in form order) and data named by the shared arguments.
pub(crate) fn load_submission(args: &SubmissionArgs) -> Result<(Vec<FieldConfig>, SubmissionData), String> {
    let form = input::load_form(&args.form).map_err(|e| format!("{e:#}"))?;
    let data = input::load_data(&args.data).map_err(|e| format!("{e:#}"))?;
    Ok((form.flattened_fields(), data))
}
