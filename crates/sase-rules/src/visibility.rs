//! Field visibility on the public form
//!
//! Visibility rules are written by people typing into the builder, so
//! `equals` and `contains` compare loosely: case, spaces, hyphens and
//! underscores are interchangeable, and a substring hit counts. Only when
//! the text comparison fails does the value's own type decide.

use crate::evaluator::{apply_operator, parse_float};
use crate::resolver::FieldResolver;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use sase_forms::{
    display_value, ConditionalOperator, FieldConfig, FieldVisibility, SubmissionData,
    VisibilityAction, VisibilityCondition,
};
use serde_json::Value;
use tracing::trace;

/// Whether a field with this visibility rule is shown.
///
/// Fields without a rule are always shown. A rule whose referenced field
/// cannot be found hides the field regardless of its action.
pub fn is_visible(visibility: Option<&FieldVisibility>, resolver: &FieldResolver<'_>) -> bool {
    let Some(rule) = visibility else {
        return true;
    };

    let Some(actual) = referenced_value(&rule.when, resolver) else {
        trace!(field = %rule.when.field, "visibility field not found, hiding");
        return false;
    };

    let met = condition_met(rule.when.operator, &actual, &rule.when.value);
    match rule.action {
        VisibilityAction::Show => met,
        VisibilityAction::Hide => !met,
    }
}

/// Visibility of one field for a (partial) submission.
pub fn evaluate_visibility(field: &FieldConfig, fields: &[FieldConfig], data: &SubmissionData) -> bool {
    let resolver = FieldResolver::new(fields, data);
    is_visible(field.visibility.as_ref(), &resolver)
}

/// Fields currently shown, in form order.
pub fn visible_fields<'f>(fields: &'f [FieldConfig], data: &SubmissionData) -> Vec<&'f FieldConfig> {
    let resolver = FieldResolver::new(fields, data);
    fields
        .iter()
        .filter(|f| is_visible(f.visibility.as_ref(), &resolver))
        .collect()
}

fn referenced_value(when: &VisibilityCondition, resolver: &FieldResolver<'_>) -> Option<Value> {
    let keys = [Some(when.field.as_str()), when.field_label.as_deref()]
        .into_iter()
        .flatten()
        .filter(|k| !k.trim().is_empty());
    resolver.resolve_first(keys).map(|r| r.value)
}

fn condition_met(op: ConditionalOperator, actual: &Value, expected: &Value) -> bool {
    use ConditionalOperator::*;

    match op {
        Equals => loose_equals(actual, expected),
        NotEquals => !loose_equals(actual, expected),
        Contains => loose_contains(actual, expected),
        NotContains => !loose_contains(actual, expected),
        GreaterThan | LessThan => match (parse_date(actual), parse_date(expected)) {
            (Some(a), Some(e)) if op == GreaterThan => a > e,
            (Some(a), Some(e)) => a < e,
            _ => apply_operator(op, actual, expected),
        },
        StartsWith | EndsWith | IsEmpty | IsNotEmpty | Unknown => {
            apply_operator(op, actual, expected)
        }
    }
}

fn loose_equals(actual: &Value, expected: &Value) -> bool {
    if let Value::Array(items) = actual {
        return items.iter().any(|item| loose_equals(item, expected));
    }
    text_match(actual, expected) || typed_equals(actual, expected)
}

fn loose_contains(actual: &Value, expected: &Value) -> bool {
    match actual {
        Value::Array(items) => items.iter().any(|item| loose_equals(item, expected)),
        Value::String(haystack) => {
            text_match(actual, expected)
                || expected.as_str().is_some_and(|needle| haystack.contains(needle))
        }
        _ => text_match(actual, expected) || typed_equals(actual, expected),
    }
}

/// Exact match of any spelling variant first, then substring containment.
fn text_match(actual: &Value, expected: &Value) -> bool {
    let (Some(actual), Some(expected)) = (scalar_text(actual), scalar_text(expected)) else {
        return false;
    };
    let actual = variants(&actual);
    let expected = variants(&expected);

    let exact = actual.iter().any(|a| expected.contains(a));
    exact
        || actual
            .iter()
            .any(|a| expected.iter().any(|e| !e.is_empty() && a.contains(e.as_str())))
}

fn typed_equals(actual: &Value, expected: &Value) -> bool {
    if let (Some(a), Some(e)) = (parse_date(actual), parse_date(expected)) {
        return a == e;
    }
    if let (Some(a), Some(e)) = (strict_number(actual), strict_number(expected)) {
        return a == e;
    }
    actual == expected
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(_) | Value::Number(_) | Value::Bool(_) => Some(display_value(value)),
        _ => None,
    }
}

/// Lower-cased text with spaces, hyphens and underscores used as the
/// separator in turn.
fn variants(text: &str) -> [String; 3] {
    let lower = text.trim().to_lowercase();
    let sep = |to: char| {
        lower
            .chars()
            .map(|c| if matches!(c, ' ' | '-' | '_') { to } else { c })
            .collect::<String>()
    };
    [sep(' '), sep('-'), sep('_')]
}

fn strict_number(value: &Value) -> Option<f64> {
    match value {
        Value::String(s) => s.trim().parse().ok(),
        other => parse_float(other),
    }
}

/// ISO date (`2024-05-01`), local datetime or RFC 3339 timestamp.
fn parse_date(value: &Value) -> Option<NaiveDateTime> {
    let text = value.as_str()?.trim();
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sase_forms::FieldType;
    use serde_json::json;

    fn rule(field: &str, operator: ConditionalOperator, value: Value, action: VisibilityAction) -> FieldVisibility {
        FieldVisibility {
            when: VisibilityCondition {
                field: field.into(),
                field_label: None,
                operator,
                value,
            },
            action,
        }
    }

    fn form() -> Vec<FieldConfig> {
        vec![
            FieldConfig::new("f1", "Employment Type", FieldType::Select).with_stable_id("employmentType"),
            FieldConfig::new("f2", "Channels", FieldType::Checkbox),
            FieldConfig::new("f3", "Start Date", FieldType::Date),
            FieldConfig::new("f4", "Seats", FieldType::Number),
        ]
    }

    fn data() -> SubmissionData {
        SubmissionData::new()
            .with("f1", "Full_Time")
            .with("f2", json!(["Email", "SMS"]))
            .with("f3", "2024-05-01")
            .with("f4", "10")
    }

    fn visible(rule: FieldVisibility) -> bool {
        let fields = form();
        let data = data();
        let resolver = FieldResolver::new(&fields, &data);
        is_visible(Some(&rule), &resolver)
    }

    #[test]
    fn test_no_rule_is_visible() {
        let fields = form();
        let data = data();
        let resolver = FieldResolver::new(&fields, &data);
        assert!(is_visible(None, &resolver));
    }

    #[test]
    fn test_separator_variants_match() {
        use ConditionalOperator::*;
        assert!(visible(rule("employmentType", Equals, json!("full time"), VisibilityAction::Show)));
        assert!(visible(rule("f1", Equals, json!("FULL-TIME"), VisibilityAction::Show)));
        assert!(!visible(rule("f1", Equals, json!("part time"), VisibilityAction::Show)));
        assert!(visible(rule("f1", NotEquals, json!("part time"), VisibilityAction::Show)));
    }

    #[test]
    fn test_hide_action_inverts() {
        use ConditionalOperator::*;
        assert!(!visible(rule("f1", Equals, json!("full time"), VisibilityAction::Hide)));
        assert!(visible(rule("f1", Equals, json!("contractor"), VisibilityAction::Hide)));
    }

    #[test]
    fn test_unresolvable_field_hides_for_both_actions() {
        use ConditionalOperator::*;
        assert!(!visible(rule("zzz", Equals, json!("x"), VisibilityAction::Show)));
        assert!(!visible(rule("zzz", Equals, json!("x"), VisibilityAction::Hide)));
    }

    #[test]
    fn test_label_fallback() {
        let mut r = rule("gone", ConditionalOperator::Equals, json!("full time"), VisibilityAction::Show);
        r.when.field = String::new();
        r.when.field_label = Some("Employment Type".into());
        assert!(visible(r));
    }

    #[test]
    fn test_stale_field_id_falls_back_to_label() {
        let fields = vec![
            FieldConfig::new("field_1713", "Contact Email", FieldType::Email),
            FieldConfig::new("field_1712", "Plan", FieldType::Select),
        ];
        let data = SubmissionData::new()
            .with("field_1713", "ada@example.com")
            .with("field_1712", "pro");
        let resolver = FieldResolver::new(&fields, &data);

        let mut r = rule("field_1699", ConditionalOperator::Equals, json!("pro"), VisibilityAction::Show);
        r.when.field_label = Some("Plan".into());
        assert!(is_visible(Some(&r), &resolver));
    }

    #[test]
    fn test_array_values_are_existential() {
        use ConditionalOperator::*;
        assert!(visible(rule("f2", Contains, json!("sms"), VisibilityAction::Show)));
        assert!(visible(rule("f2", Equals, json!("email"), VisibilityAction::Show)));
        assert!(!visible(rule("f2", Contains, json!("post"), VisibilityAction::Show)));
        assert!(visible(rule("f2", NotContains, json!("post"), VisibilityAction::Show)));
    }

    #[test]
    fn test_dates_compare_chronologically() {
        use ConditionalOperator::*;
        assert!(visible(rule("f3", GreaterThan, json!("2024-04-30"), VisibilityAction::Show)));
        assert!(visible(rule("f3", LessThan, json!("2024-05-01T10:00:00Z"), VisibilityAction::Show)));
        assert!(!visible(rule("f3", GreaterThan, json!("2024-12-01"), VisibilityAction::Show)));
    }

    #[test]
    fn test_numbers() {
        use ConditionalOperator::*;
        assert!(visible(rule("f4", Equals, json!(10.0), VisibilityAction::Show)));
        assert!(visible(rule("f4", GreaterThan, json!(5), VisibilityAction::Show)));
        assert!(!visible(rule("f4", LessThan, json!("5"), VisibilityAction::Show)));
    }

    #[test]
    fn test_visible_fields_filters_in_order() {
        let mut fields = form();
        fields[1] = fields[1].clone().with_visibility(rule(
            "employmentType",
            ConditionalOperator::Equals,
            json!("contractor"),
            VisibilityAction::Show,
        ));
        let data = data();
        let ids: Vec<_> = visible_fields(&fields, &data).iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["f1", "f3", "f4"]);

        assert!(!evaluate_visibility(&fields[1], &fields, &data));
    }
}
