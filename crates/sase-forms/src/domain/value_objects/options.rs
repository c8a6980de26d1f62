//! Option normalization
//!
//! Builders have stored field options in three shapes over time:
//!
//! ```text
//! "[\"Basic\",\"Pro\"]"                      JSON-encoded string
//! ["Basic", {"value": "pro", "label": "Pro"}] array of scalars or pairs
//! {"basic": "Basic", "pro": "Pro"}           map of value -> label
//! ```
//!
//! All of them normalize to one `Vec<FieldOption>` at the deserialization
//! boundary, so the rest of the engine only sees the canonical form.

use super::FieldOption;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use tracing::debug;

/// Normalize any accepted options encoding. Unparsable input yields no options.
pub fn normalize_options(raw: &Value) -> Vec<FieldOption> {
    match raw {
        Value::String(encoded) => {
            let encoded = encoded.trim();
            if encoded.is_empty() {
                return Vec::new();
            }
            match serde_json::from_str::<Value>(encoded) {
                Ok(decoded @ (Value::Array(_) | Value::Object(_))) => normalize_options(&decoded),
                Ok(_) => Vec::new(),
                Err(err) => {
                    debug!(error = %err, "discarding unparsable options encoding");
                    Vec::new()
                }
            }
        }
        Value::Array(items) => items.iter().filter_map(option_from_item).collect(),
        Value::Object(map) => map
            .iter()
            .map(|(value, label)| option_from_entry(value, label))
            .collect(),
        _ => Vec::new(),
    }
}

fn option_from_item(item: &Value) -> Option<FieldOption> {
    match item {
        Value::Object(obj) => {
            let value = text_of(obj, "value");
            let label = text_of(obj, "label").or_else(|| text_of(obj, "text"));
            match (value, label) {
                (Some(value), Some(label)) => Some(FieldOption { value, label }),
                (Some(value), None) => Some(FieldOption::new(value.clone(), value)),
                (None, Some(label)) => Some(FieldOption::new(label.clone(), label)),
                (None, None) => None,
            }
        }
        other => scalar_text(other).map(|text| FieldOption::new(text.clone(), text)),
    }
}

fn option_from_entry(value: &str, label: &Value) -> FieldOption {
    let label = match label {
        Value::Object(obj) => text_of(obj, "label").or_else(|| text_of(obj, "value")),
        other => scalar_text(other),
    };
    FieldOption::new(value, label.unwrap_or_else(|| value.to_string()))
}

fn text_of(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(scalar_text)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub(crate) fn deserialize_options<'de, D>(deserializer: D) -> Result<Vec<FieldOption>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().map(normalize_options).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn canonical() -> Vec<FieldOption> {
        vec![
            FieldOption::new("basic", "Basic"),
            FieldOption::new("pro", "Pro"),
        ]
    }

    #[test]
    fn test_three_encodings_normalize_identically() {
        let as_string = json!(r#"[{"value":"basic","label":"Basic"},{"value":"pro","label":"Pro"}]"#);
        let as_array = json!([
            { "value": "basic", "label": "Basic" },
            { "value": "pro", "label": "Pro" }
        ]);
        let as_map = json!({ "basic": "Basic", "pro": "Pro" });

        assert_eq!(normalize_options(&as_string), canonical());
        assert_eq!(normalize_options(&as_array), canonical());
        assert_eq!(normalize_options(&as_map), canonical());
    }

    #[test]
    fn test_scalar_arrays_use_value_as_label() {
        let options = normalize_options(&json!(["Red", 2, true]));
        assert_eq!(
            options,
            vec![
                FieldOption::new("Red", "Red"),
                FieldOption::new("2", "2"),
                FieldOption::new("true", "true"),
            ]
        );
        assert_eq!(normalize_options(&json!("[\"Red\"]")), vec![FieldOption::new("Red", "Red")]);
    }

    #[test]
    fn test_partial_pairs_fill_the_missing_side() {
        let options = normalize_options(&json!([{ "value": "a" }, { "label": "B" }, { "id": 3 }]));
        assert_eq!(
            options,
            vec![FieldOption::new("a", "a"), FieldOption::new("B", "B")]
        );
    }

    #[test]
    fn test_map_with_object_values() {
        let options = normalize_options(&json!({ "x": { "label": "Ex" }, "y": null }));
        assert_eq!(
            options,
            vec![FieldOption::new("x", "Ex"), FieldOption::new("y", "y")]
        );
    }

    #[test]
    fn test_malformed_encodings_are_empty() {
        assert!(normalize_options(&json!("[not json")).is_empty());
        assert!(normalize_options(&json!("")).is_empty());
        assert!(normalize_options(&json!("\"just a string\"")).is_empty());
        assert!(normalize_options(&json!(42)).is_empty());
        assert!(normalize_options(&Value::Null).is_empty());
    }
}
