//! Submission dispatch
//!
//! Orchestrates one submission through the engine: backfill stable keys on
//! the form, select matching rules, resolve recipients and render templates.
//! Sending is left to the caller; dispatch only produces [`OutgoingEmail`]s.

use crate::engine::RuleEngine;
use crate::repository::{RuleRepository, TemplateRepository};
use crate::resolver::FieldResolver;
use crate::rule::EmailRule;
use sase_common::{SaseError, SaseResult, Timestamp};
use sase_forms::{
    DomainEvent, FormEvent, FormRepository, RepositoryError, SubmissionRepository,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Rendered email ready to hand to a mailer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingEmail {
    pub rule_id: String,
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

/// Why a matching rule produced no email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    NoRecipients,
    TemplateUnavailable { template_id: String, error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRule {
    pub rule_id: String,
    #[serde(flatten)]
    pub reason: SkipReason,
}

/// Stable key written back to the form during dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignedKey {
    pub field_id: String,
    pub stable_key: String,
}

/// Outcome of dispatching one submission.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DispatchReport {
    pub form_id: String,
    pub submission_id: String,
    pub assigned_keys: Vec<AssignedKey>,
    pub emails: Vec<OutgoingEmail>,
    pub skipped: Vec<SkippedRule>,
}

/// Submission dispatch service
pub struct SubmissionDispatcher {
    forms: Arc<dyn FormRepository>,
    submissions: Arc<dyn SubmissionRepository>,
    rules: Arc<dyn RuleRepository>,
    templates: Arc<dyn TemplateRepository>,
    engine: Arc<RuleEngine>,
}

impl SubmissionDispatcher {
    pub fn new(
        forms: Arc<dyn FormRepository>,
        submissions: Arc<dyn SubmissionRepository>,
        rules: Arc<dyn RuleRepository>,
        templates: Arc<dyn TemplateRepository>,
        engine: Arc<RuleEngine>,
    ) -> Self {
        Self {
            forms,
            submissions,
            rules,
            templates,
            engine,
        }
    }

    pub fn engine(&self) -> &Arc<RuleEngine> {
        &self.engine
    }

    /// Dispatch a stored submission of a stored form.
    pub async fn dispatch(&self, form_id: &str, submission_id: &str) -> SaseResult<DispatchReport> {
        let start = Timestamp::now();

        let mut form = self.forms.get(form_id).await.map_err(|e| match e {
            RepositoryError::NotFound(_) => SaseError::FormNotFound(form_id.to_string()),
            other => storage(other),
        })?;

        let mut assigned_keys = Vec::new();
        if form.ensure_stable_keys() > 0 {
            assigned_keys = form
                .take_events()
                .into_iter()
                .filter_map(|event| match event {
                    DomainEvent::Form(FormEvent::StableKeyAssigned {
                        field_id,
                        stable_key,
                        ..
                    }) => Some(AssignedKey {
                        field_id,
                        stable_key,
                    }),
                    _ => None,
                })
                .collect();
            self.forms.save(&form).await.map_err(storage)?;
            info!(form_id, assigned = assigned_keys.len(), "persisted new stable keys");
        }

        let submission = self
            .submissions
            .get(submission_id)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound(_) => {
                    SaseError::SubmissionNotFound(submission_id.to_string())
                }
                other => storage(other),
            })?;
        if submission.form_id != form_id {
            return Err(SaseError::SubmissionNotFound(format!(
                "{submission_id} (belongs to form {})",
                submission.form_id
            )));
        }

        let rules = self.rules.rules_for_form(form_id).await.map_err(storage)?;
        let fields = form.flattened_fields();
        let resolver = self.engine.resolver(&fields, &submission.data);
        let matched = self.engine.select(&rules, &resolver);

        let mut report = DispatchReport {
            form_id: form_id.to_string(),
            submission_id: submission_id.to_string(),
            assigned_keys,
            ..Default::default()
        };

        for rule in matched {
            match self.render_rule(rule, &resolver).await {
                Ok(email) => report.emails.push(email),
                Err(reason) => {
                    warn!(rule_id = %rule.id, ?reason, "matching rule skipped");
                    report.skipped.push(SkippedRule {
                        rule_id: rule.id.clone(),
                        reason,
                    });
                }
            }
        }

        info!(
            form_id,
            submission_id,
            emails = report.emails.len(),
            skipped = report.skipped.len(),
            elapsed_us = start.elapsed_micros(),
            "submission dispatched"
        );
        Ok(report)
    }

    async fn render_rule(
        &self,
        rule: &EmailRule,
        resolver: &FieldResolver<'_>,
    ) -> Result<OutgoingEmail, SkipReason> {
        let to = rule.recipients(resolver);
        if to.is_empty() {
            return Err(SkipReason::NoRecipients);
        }

        let template = self.templates.get(&rule.template_id).await.map_err(|e| {
            SkipReason::TemplateUnavailable {
                template_id: rule.template_id.clone(),
                error: e.to_string(),
            }
        })?;

        let (subject, body) = self.engine.render(&template, resolver);
        Ok(OutgoingEmail {
            rule_id: rule.id.clone(),
            to,
            subject,
            body,
        })
    }
}

fn storage(e: RepositoryError) -> SaseError {
    SaseError::StorageError(e.to_string())
}
