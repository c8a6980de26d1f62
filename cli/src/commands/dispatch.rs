//! Dispatch command

use crate::output::OutputFormat;
use crate::{input, SubmissionArgs};
use colored::Colorize;
use sase_forms::{
    FormRepository, FormSubmission, InMemoryFormRepository, InMemorySubmissionRepository,
    SubmissionRepository,
};
use sase_rules::{
    DispatchReport, EngineConfig, InMemoryRuleRepository, InMemoryTemplateRepository,
    RuleEngine, RuleRepository, SkipReason, SubmissionDispatcher, TemplateRepository,
};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tabled::Tabled;

#[derive(Debug, Serialize, Tabled)]
pub struct EmailRow {
    pub rule_id: String,
    pub to: String,
    pub subject: String,
    pub status: String,
}

pub async fn handle(
    args: &SubmissionArgs,
    rules_path: &Path,
    templates_path: &Path,
    config: EngineConfig,
    format: OutputFormat,
) -> Result<(), String> {
    let err = |e: anyhow::Error| format!("{e:#}");
    let form = input::load_form(&args.form).map_err(err)?;
    let data = input::load_data(&args.data).map_err(err)?;
    let rules = input::load_rules(rules_path).map_err(err)?;
    let templates = input::load_templates(templates_path).map_err(err)?;

    let forms = Arc::new(InMemoryFormRepository::new());
    let submissions = Arc::new(InMemorySubmissionRepository::new());
    let rule_repo = Arc::new(InMemoryRuleRepository::new());
    let template_repo = Arc::new(InMemoryTemplateRepository::new());

    let submission = FormSubmission::create(form.id(), data);
    forms.save(&form).await.map_err(|e| e.to_string())?;
    submissions.save(&submission).await.map_err(|e| e.to_string())?;
    for rule in &rules {
        rule_repo.save(form.id(), rule).await.map_err(|e| e.to_string())?;
    }
    for template in &templates {
        template_repo.save(template).await.map_err(|e| e.to_string())?;
    }

    let dispatcher = SubmissionDispatcher::new(
        forms,
        submissions,
        rule_repo,
        template_repo,
        Arc::new(RuleEngine::new(config)),
    );
    let report = dispatcher
        .dispatch(form.id(), &submission.id)
        .await
        .map_err(|e| e.to_string())?;

    match format {
        OutputFormat::Table => print_table(&report),
        _ => format.print(&report),
    }
    Ok(())
}

fn print_table(report: &DispatchReport) {
    let mut rows: Vec<EmailRow> = report
        .emails
        .iter()
        .map(|email| EmailRow {
            rule_id: email.rule_id.clone(),
            to: email.to.join(", "),
            subject: email.subject.clone(),
            status: "ready".green().to_string(),
        })
        .collect();

    rows.extend(report.skipped.iter().map(|skipped| EmailRow {
        rule_id: skipped.rule_id.clone(),
        to: "-".into(),
        subject: "-".into(),
        status: match &skipped.reason {
            SkipReason::NoRecipients => "skipped: no recipients".yellow().to_string(),
            SkipReason::TemplateUnavailable { template_id, .. } => {
                format!("skipped: template {template_id} unavailable").yellow().to_string()
            }
        },
    }));

    OutputFormat::Table.print_rows(&rows);
    if !report.assigned_keys.is_empty() {
        eprintln!("{} stable key(s) assigned during dispatch", report.assigned_keys.len());
    }
}
