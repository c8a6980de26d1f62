//! Forms value objects

pub mod options;
pub mod visibility;

use serde::{Deserialize, Serialize};

/// One configurable form field.
///
/// `id` is ephemeral: the builder regenerates it whenever the form is rebuilt.
/// `stable_id` is the key everything else should refer to; once assigned it
/// never changes for the life of the field.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldConfig {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stable_id: Option<String>,
    /// Administrator override, wins over every inferred key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping: Option<String>,
    /// Builder-assigned machine name, when the builder emits one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(
        default,
        deserialize_with = "options::deserialize_options",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub options: Vec<FieldOption>,
    #[serde(default)]
    pub required: bool,
    #[serde(
        default,
        rename = "conditionalLogic",
        deserialize_with = "visibility::deserialize_visibility",
        skip_serializing_if = "Option::is_none"
    )]
    pub visibility: Option<FieldVisibility>,
}

impl FieldConfig {
    pub fn new(id: impl Into<String>, label: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            field_type,
            ..Default::default()
        }
    }

    pub fn with_stable_id(mut self, stable_id: impl Into<String>) -> Self {
        self.stable_id = Some(stable_id.into());
        self
    }

    pub fn with_mapping(mut self, mapping: impl Into<String>) -> Self {
        self.mapping = Some(mapping.into());
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_options(mut self, options: Vec<FieldOption>) -> Self {
        self.options = options;
        self
    }

    pub fn with_visibility(mut self, visibility: FieldVisibility) -> Self {
        self.visibility = Some(visibility);
        self
    }

    /// Precomputed stable key, ignoring blank values.
    pub fn stable_id(&self) -> Option<&str> {
        non_blank(self.stable_id.as_deref())
    }

    /// Administrator mapping, ignoring blank values.
    pub fn mapping(&self) -> Option<&str> {
        non_blank(self.mapping.as_deref())
    }

    /// Builder machine name, ignoring blank values.
    pub fn key(&self) -> Option<&str> {
        non_blank(self.key.as_deref())
    }

    /// Label for a stored option value, if this field has one.
    pub fn option_label(&self, value: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|o| o.value == value)
            .map(|o| o.label.as_str())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    Text,
    Textarea,
    Email,
    Tel,
    Phone,
    Name,
    Number,
    Select,
    Radio,
    Checkbox,
    Date,
    Time,
    File,
    Hidden,
    #[serde(other)]
    Other,
}

impl FieldType {
    pub fn is_phone(&self) -> bool {
        matches!(self, FieldType::Tel | FieldType::Phone)
    }
}

/// Canonical `{value, label}` option.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    pub value: String,
    pub label: String,
}

impl FieldOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Show/hide rule attached to a field on the public form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldVisibility {
    pub when: VisibilityCondition,
    #[serde(default)]
    pub action: VisibilityAction,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibilityCondition {
    #[serde(default)]
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_label: Option<String>,
    #[serde(default)]
    pub operator: ConditionalOperator,
    #[serde(default)]
    pub value: serde_json::Value,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisibilityAction {
    #[default]
    Show,
    Hide,
}

/// Operators shared by email rule conditions and field visibility logic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConditionalOperator {
    Equals,
    #[serde(alias = "not_equals")]
    NotEquals,
    Contains,
    #[serde(alias = "not_contains")]
    NotContains,
    #[serde(alias = "starts_with")]
    StartsWith,
    #[serde(alias = "ends_with")]
    EndsWith,
    #[serde(alias = "greater_than")]
    GreaterThan,
    #[serde(alias = "less_than")]
    LessThan,
    #[serde(alias = "is_empty")]
    IsEmpty,
    #[serde(alias = "is_not_empty")]
    IsNotEmpty,
    #[default]
    #[serde(other)]
    Unknown,
}

impl ConditionalOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionalOperator::Equals => "equals",
            ConditionalOperator::NotEquals => "notEquals",
            ConditionalOperator::Contains => "contains",
            ConditionalOperator::NotContains => "notContains",
            ConditionalOperator::StartsWith => "startsWith",
            ConditionalOperator::EndsWith => "endsWith",
            ConditionalOperator::GreaterThan => "greaterThan",
            ConditionalOperator::LessThan => "lessThan",
            ConditionalOperator::IsEmpty => "isEmpty",
            ConditionalOperator::IsNotEmpty => "isNotEmpty",
            ConditionalOperator::Unknown => "unknown",
        }
    }
}
