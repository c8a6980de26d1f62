//! Rule condition model
//!
//! Conditions arrive as loosely-shaped JSON: a flat array (implicit AND), an
//! `{operator: "and"|"or", conditions: [...]}` group, a bare leaf condition,
//! or any of those encoded as a JSON string. They are parsed once into
//! [`ConditionGroup`] so evaluation never re-inspects raw JSON.

use sase_forms::ConditionalOperator;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

/// Single comparison against a submitted field.
///
/// The field is identified three ways (ephemeral id, stable key, label) so the
/// condition keeps working after the form is rebuilt.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_id: Option<String>,
    #[serde(default)]
    pub stable_id: String,
    #[serde(default)]
    pub label: String,
    pub operator: ConditionalOperator,
    /// `None` when the key is missing; an explicit JSON null is `Some(Null)`.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

/// Why a leaf condition cannot be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidCondition {
    #[error("condition has no `{0}`")]
    MissingIdentifier(&'static str),
    #[error("`{0}` condition has no value")]
    MissingValue(&'static str),
}

impl Condition {
    pub fn new(
        field: impl Into<String>,
        stable_id: impl Into<String>,
        label: impl Into<String>,
        operator: ConditionalOperator,
        value: impl Into<Value>,
    ) -> Self {
        Self {
            field: Some(field.into()),
            field_id: None,
            stable_id: stable_id.into(),
            label: label.into(),
            operator,
            value: Some(value.into()),
        }
    }

    /// `field`, falling back to the older `fieldId` spelling.
    pub fn primary_key(&self) -> Option<&str> {
        [self.field.as_deref(), self.field_id.as_deref()]
            .into_iter()
            .flatten()
            .find(|k| !k.trim().is_empty())
    }

    /// All three identification channels must be present, and a value unless
    /// the operator only tests for emptiness.
    pub fn validate(&self) -> Result<(), InvalidCondition> {
        if self.primary_key().is_none() {
            return Err(InvalidCondition::MissingIdentifier("field"));
        }
        if self.stable_id.trim().is_empty() {
            return Err(InvalidCondition::MissingIdentifier("stableId"));
        }
        if self.label.trim().is_empty() {
            return Err(InvalidCondition::MissingIdentifier("label"));
        }
        let emptiness = matches!(
            self.operator,
            ConditionalOperator::IsEmpty | ConditionalOperator::IsNotEmpty
        );
        if self.value.is_none() && !emptiness {
            return Err(InvalidCondition::MissingValue(self.operator.as_str()));
        }
        Ok(())
    }

    /// Expected value; absent reads as null.
    pub fn expected(&self) -> &Value {
        self.value.as_ref().unwrap_or(&Value::Null)
    }

    /// Lookup keys in resolution order.
    pub fn lookup_keys(&self) -> impl Iterator<Item = &str> {
        [
            self.primary_key(),
            Some(self.stable_id.as_str()),
            Some(self.label.as_str()),
        ]
        .into_iter()
        .flatten()
        .filter(|k| !k.trim().is_empty())
    }
}

/// Boolean tree of conditions.
#[derive(Clone, Debug, PartialEq)]
pub enum ConditionGroup {
    Leaf(Condition),
    And(Vec<ConditionGroup>),
    Or(Vec<ConditionGroup>),
    /// Unrecognized shape; always evaluates to false.
    Invalid { raw: Value, reason: String },
}

impl Default for ConditionGroup {
    fn default() -> Self {
        ConditionGroup::And(Vec::new())
    }
}

impl ConditionGroup {
    /// Parse the stored JSON shape. Never fails; unrecognized shapes become
    /// [`ConditionGroup::Invalid`].
    pub fn parse(raw: &Value) -> Self {
        match raw {
            Value::Null => Self::default(),
            Value::String(text) => Self::parse_str(text),
            Value::Array(items) => ConditionGroup::And(items.iter().map(Self::parse).collect()),
            Value::Object(map) => match map.get("conditions") {
                Some(children) => Self::parse_group(raw, map.get("operator"), children),
                None => Self::parse_leaf(raw),
            },
            other => Self::invalid(other, "expected an array or object"),
        }
    }

    fn parse_str(text: &str) -> Self {
        if text.trim().is_empty() {
            return Self::default();
        }
        match serde_json::from_str::<Value>(text) {
            Ok(Value::String(_)) => Self::invalid(&Value::String(text.into()), "doubly encoded"),
            Ok(value) => Self::parse(&value),
            Err(e) => {
                debug!(error = %e, "unparsable condition string treated as absent");
                Self::default()
            }
        }
    }

    fn parse_group(raw: &Value, operator: Option<&Value>, children: &Value) -> Self {
        let Value::Array(children) = children else {
            return Self::invalid(raw, "`conditions` is not an array");
        };
        let children = children.iter().map(Self::parse).collect();
        match operator.and_then(Value::as_str).map(str::to_ascii_lowercase).as_deref() {
            Some("and") => ConditionGroup::And(children),
            Some("or") => ConditionGroup::Or(children),
            _ => Self::invalid(raw, "group operator must be `and` or `or`"),
        }
    }

    fn parse_leaf(raw: &Value) -> Self {
        match Condition::deserialize(raw) {
            Ok(condition) => ConditionGroup::Leaf(condition),
            Err(e) => Self::invalid(raw, &e.to_string()),
        }
    }

    fn invalid(raw: &Value, reason: &str) -> Self {
        ConditionGroup::Invalid {
            raw: raw.clone(),
            reason: reason.to_string(),
        }
    }

    /// True for an empty group (of either kind), which matches everything.
    pub fn is_empty(&self) -> bool {
        matches!(self, ConditionGroup::And(c) | ConditionGroup::Or(c) if c.is_empty())
    }

    /// Evaluate with an injected leaf predicate.
    ///
    /// AND and OR short-circuit left to right; empty groups are true and
    /// invalid nodes are false.
    pub fn evaluate_with<F>(&self, leaf: &mut F) -> bool
    where
        F: FnMut(&Condition) -> bool,
    {
        match self {
            ConditionGroup::Leaf(condition) => leaf(condition),
            ConditionGroup::And(children) => children.iter().all(|c| c.evaluate_with(leaf)),
            ConditionGroup::Or(children) => {
                children.is_empty() || children.iter().any(|c| c.evaluate_with(leaf))
            }
            ConditionGroup::Invalid { reason, .. } => {
                warn!(reason = %reason, "invalid condition group evaluates to false");
                false
            }
        }
    }

    /// Every leaf in document order.
    pub fn leaves(&self) -> Vec<&Condition> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'s>(&'s self, out: &mut Vec<&'s Condition>) {
        match self {
            ConditionGroup::Leaf(condition) => out.push(condition),
            ConditionGroup::And(children) | ConditionGroup::Or(children) => {
                children.iter().for_each(|c| c.collect_leaves(out))
            }
            ConditionGroup::Invalid { .. } => {}
        }
    }

    fn to_value(&self) -> Value {
        match self {
            ConditionGroup::Leaf(condition) => {
                serde_json::to_value(condition).unwrap_or(Value::Null)
            }
            ConditionGroup::And(children) => json!({
                "operator": "and",
                "conditions": children.iter().map(Self::to_value).collect::<Vec<_>>(),
            }),
            ConditionGroup::Or(children) => json!({
                "operator": "or",
                "conditions": children.iter().map(Self::to_value).collect::<Vec<_>>(),
            }),
            ConditionGroup::Invalid { raw, .. } => raw.clone(),
        }
    }
}

impl<'de> Deserialize<'de> for ConditionGroup {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<Value>::deserialize(deserializer)?;
        Ok(raw.map(|v| Self::parse(&v)).unwrap_or_default())
    }
}

impl Serialize for ConditionGroup {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}
