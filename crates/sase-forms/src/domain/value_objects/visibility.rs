//! Conditional logic decoding
//!
//! `conditionalLogic` has been stored both as an object and as a JSON string.
//! Anything that does not decode to a complete rule is dropped, so one bad
//! rule never fails the field (or the form) that carries it.

use super::FieldVisibility;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

/// Decode a visibility rule, or `None` when the encoding is absent or malformed.
pub fn normalize_visibility(raw: &Value) -> Option<FieldVisibility> {
    match raw {
        Value::Null => None,
        Value::String(encoded) => {
            let encoded = encoded.trim();
            if encoded.is_empty() {
                return None;
            }
            match serde_json::from_str::<Value>(encoded) {
                Ok(decoded @ Value::Object(_)) => normalize_visibility(&decoded),
                Ok(_) => None,
                Err(err) => {
                    debug!(error = %err, "discarding unparsable conditional logic");
                    None
                }
            }
        }
        other => match FieldVisibility::deserialize(other) {
            Ok(visibility) => Some(visibility),
            Err(err) => {
                debug!(error = %err, "discarding malformed conditional logic");
                None
            }
        },
    }
}

pub(crate) fn deserialize_visibility<'de, D>(deserializer: D) -> Result<Option<FieldVisibility>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(normalize_visibility))
}
