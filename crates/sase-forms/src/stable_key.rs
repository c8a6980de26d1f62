//! Stable semantic keys for form fields
//!
//! Precedence, first match wins:
//!
//! 1. the field's existing `stableId` (assignment is idempotent)
//! 2. the administrator `mapping`
//! 3. a canonical key for the field type
//! 4. a canonical key for the label vocabulary
//! 5. the camelCased label
//! 6. the ephemeral field id

use crate::domain::value_objects::{FieldConfig, FieldType};

/// Canonical semantic keys.
pub mod canonical {
    pub const EMAIL: &str = "email";
    pub const PHONE: &str = "phone";
    pub const NAME: &str = "name";
    pub const FIRST_NAME: &str = "firstName";
    pub const LAST_NAME: &str = "lastName";
    pub const COMPANY: &str = "company";
}

enum LabelMatch {
    Contains(&'static str),
    Exact(&'static str),
}

/// Checked in order against the lower-cased, trimmed label.
const LABEL_VOCABULARY: &[(LabelMatch, &str)] = &[
    (LabelMatch::Contains("email"), canonical::EMAIL),
    (LabelMatch::Contains("phone"), canonical::PHONE),
    (LabelMatch::Contains("tel"), canonical::PHONE),
    (LabelMatch::Exact("name"), canonical::NAME),
    (LabelMatch::Exact("full name"), canonical::NAME),
    (LabelMatch::Contains("first name"), canonical::FIRST_NAME),
    (LabelMatch::Contains("last name"), canonical::LAST_NAME),
    (LabelMatch::Contains("company"), canonical::COMPANY),
];

/// Compute the stable key for a field. Never fails; the worst case is the
/// field's own id.
pub fn assign(field: &FieldConfig) -> String {
    if let Some(existing) = field.stable_id() {
        return existing.to_string();
    }
    if let Some(mapping) = field.mapping() {
        return mapping.to_string();
    }
    if let Some(key) = key_for_type(&field.field_type) {
        return key.to_string();
    }
    if let Some(key) = key_for_label(&field.label) {
        return key.to_string();
    }
    let derived = camel_case(&field.label);
    if !derived.is_empty() {
        return derived;
    }
    field.id.clone()
}

fn key_for_type(field_type: &FieldType) -> Option<&'static str> {
    match field_type {
        FieldType::Email => Some(canonical::EMAIL),
        FieldType::Tel | FieldType::Phone => Some(canonical::PHONE),
        FieldType::Name => Some(canonical::NAME),
        _ => None,
    }
}

fn key_for_label(label: &str) -> Option<&'static str> {
    let label = label.trim().to_lowercase();
    if label.is_empty() {
        return None;
    }
    LABEL_VOCABULARY
        .iter()
        .find(|(rule, _)| match rule {
            LabelMatch::Contains(needle) => label.contains(needle),
            LabelMatch::Exact(expected) => label == *expected,
        })
        .map(|(_, key)| *key)
}

/// `"Preferred Contact Method?"` -> `"preferredContactMethod"`.
///
/// Characters that are neither alphanumeric nor whitespace are dropped (so
/// `"E-mail"` becomes one word), whitespace separates words.
pub fn camel_case(label: &str) -> String {
    let cleaned: String = label
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();

    let mut out = String::with_capacity(cleaned.len());
    for (i, word) in cleaned.split_whitespace().enumerate() {
        if i == 0 {
            out.extend(word.chars().flat_map(char::to_lowercase));
            continue;
        }
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.extend(chars.flat_map(char::to_lowercase));
        }
    }
    out
}
