//! Email automation rules and templates

use crate::condition::ConditionGroup;
use crate::resolver::FieldResolver;
use sase_forms::display_value;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where a rule sends its email.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipientType {
    /// Address taken from a submitted field
    #[default]
    Field,
    /// Fixed comma-separated address list
    Static,
}

/// Sends an email template when a submission matches its conditions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailRule {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    /// Absent or empty matches every submission.
    #[serde(default)]
    pub conditions: ConditionGroup,
    #[serde(default)]
    pub recipient_type: RecipientType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_email: Option<String>,
    pub template_id: String,
}

fn enabled_by_default() -> bool {
    true
}

impl EmailRule {
    pub fn new(id: impl Into<String>, template_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            enabled: true,
            conditions: ConditionGroup::default(),
            recipient_type: RecipientType::Field,
            recipient_field: None,
            recipient_email: None,
            template_id: template_id.into(),
        }
    }

    pub fn with_conditions(mut self, conditions: ConditionGroup) -> Self {
        self.conditions = conditions;
        self
    }

    pub fn to_field(mut self, key: impl Into<String>) -> Self {
        self.recipient_type = RecipientType::Field;
        self.recipient_field = Some(key.into());
        self
    }

    pub fn to_static(mut self, emails: impl Into<String>) -> Self {
        self.recipient_type = RecipientType::Static;
        self.recipient_email = Some(emails.into());
        self
    }

    /// Addresses this rule sends to for the resolver's submission.
    ///
    /// Only entries containing `@` are kept; an empty list means the rule
    /// has nowhere to send.
    pub fn recipients(&self, resolver: &FieldResolver<'_>) -> Vec<String> {
        let raw = match self.recipient_type {
            RecipientType::Static => self.recipient_email.clone().unwrap_or_default(),
            RecipientType::Field => self
                .recipient_field
                .as_deref()
                .and_then(|key| resolver.resolve(key))
                .map(|value| match value {
                    Value::Array(items) => items.iter().map(display_value).collect::<Vec<_>>().join(","),
                    other => display_value(&other),
                })
                .unwrap_or_default(),
        };

        raw.split([',', ';'])
            .map(str::trim)
            .filter(|addr| addr.contains('@'))
            .map(str::to_string)
            .collect()
    }
}

/// Subject and body rendered for a matching rule.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailTemplate {
    pub id: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
}

impl EmailTemplate {
    pub fn new(id: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            subject: subject.into(),
            body: body.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sase_forms::{FieldConfig, FieldType, SubmissionData};
    use serde_json::json;

    #[test]
    fn test_rule_from_json_defaults() {
        let rule: EmailRule = serde_json::from_value(json!({
            "id": "r1",
            "name": "Notify sales",
            "recipientType": "static",
            "recipientEmail": "sales@example.com, ops@example.com",
            "templateId": "t1"
        }))
        .unwrap();

        assert!(rule.enabled);
        assert!(rule.conditions.is_empty());
        assert_eq!(rule.recipient_type, RecipientType::Static);
    }

    #[test]
    fn test_conditions_as_json_string() {
        let rule: EmailRule = serde_json::from_value(json!({
            "id": "r2",
            "templateId": "t1",
            "conditions": "[{\"field\":\"f1\",\"stableId\":\"plan\",\"label\":\"Plan\",\"operator\":\"equals\",\"value\":\"pro\"}]"
        }))
        .unwrap();
        assert_eq!(rule.conditions.leaves().len(), 1);
    }

    #[test]
    fn test_static_recipients_filtered() {
        let data = SubmissionData::new();
        let resolver = FieldResolver::new(&[], &data);
        let rule = EmailRule::new("r1", "t1").to_static("a@x.io, not-an-address ,b@y.io;");
        assert_eq!(rule.recipients(&resolver), vec!["a@x.io", "b@y.io"]);
    }

    #[test]
    fn test_field_recipients_resolve_by_stable_key() {
        let fields = vec![FieldConfig::new("f_77", "Work Email", FieldType::Email).with_stable_id("email")];
        let data = SubmissionData::new().with("f_77", " ada@example.com ");
        let resolver = FieldResolver::new(&fields, &data);

        let rule = EmailRule::new("r1", "t1").to_field("email");
        assert_eq!(rule.recipients(&resolver), vec!["ada@example.com"]);

        let unresolved = EmailRule::new("r2", "t1").to_field("managerEmail");
        let empty = SubmissionData::new();
        assert!(unresolved.recipients(&FieldResolver::new(&[], &empty)).is_empty());
    }
}
