//! Resolution strategies, one per tier

use super::index::IndexedField;
use super::similarity::best_match;
use super::{FieldResolver, Hit};
use sase_forms::stable_key::canonical;
use sase_forms::{display_value, FieldType};
use serde_json::Value;

pub(super) fn direct(r: &FieldResolver<'_>, key: &str) -> Option<Hit> {
    r.data.get(key).map(|v| Hit::new(v, key))
}

pub(super) fn stable_id(r: &FieldResolver<'_>, key: &str) -> Option<Hit> {
    first_with_value(r, r.index.with_stable_id(key))
}

pub(super) fn mapping(r: &FieldResolver<'_>, key: &str) -> Option<Hit> {
    first_with_value(r, r.index.with_mapping(key))
}

pub(super) fn label(r: &FieldResolver<'_>, key: &str) -> Option<Hit> {
    let lowered = key.trim().to_lowercase();
    first_with_value(
        r,
        r.index.iter().filter(|e| {
            (!e.label_lower.is_empty() && e.label_lower == lowered) || e.label_camel == key
        }),
    )
}

pub(super) fn semantic(r: &FieldResolver<'_>, key: &str) -> Option<Hit> {
    match key.trim().to_lowercase().as_str() {
        canonical::EMAIL => email(r),
        canonical::PHONE => phone(r),
        canonical::NAME => full_name(r),
        _ => None,
    }
}

pub(super) fn field_containment(r: &FieldResolver<'_>, key: &str) -> Option<Hit> {
    let needle = key.to_lowercase();
    first_with_value(
        r,
        r.index.iter().filter(|e| {
            contains_either(&e.id_lower, &needle)
                || e.key_lower.as_deref().is_some_and(|k| contains_either(k, &needle))
        }),
    )
}

pub(super) fn key_containment(r: &FieldResolver<'_>, key: &str) -> Option<Hit> {
    let needle = key.to_lowercase();
    r.data
        .iter()
        .find(|(k, _)| contains_either(&k.to_lowercase(), &needle))
        .map(|(k, v)| Hit::new(v, k))
}

pub(super) fn similarity(r: &FieldResolver<'_>, key: &str) -> Option<Hit> {
    let threshold = r.config.similarity_threshold;
    let (found, score) = best_match(key, r.data.keys().map(String::as_str), threshold)?;
    tracing::trace!(key, candidate = found, score, "similarity match");
    r.data.get(found).map(|v| Hit::new(v, found))
}

fn email(r: &FieldResolver<'_>) -> Option<Hit> {
    first_with_value(r, r.index.iter().filter(|e| e.field.field_type == FieldType::Email))
        .or_else(|| first_with_value(r, r.index.iter().filter(|e| e.label_lower.contains("email"))))
        .or_else(|| first_with_value(r, r.index.iter().filter(|e| e.id_lower.contains("email"))))
        .or_else(|| first_data_value(r, |v| v.as_str().is_some_and(|s| s.contains('@'))))
}

fn phone(r: &FieldResolver<'_>) -> Option<Hit> {
    first_with_value(r, r.index.iter().filter(|e| e.field.field_type.is_phone()))
        .or_else(|| {
            first_with_value(
                r,
                r.index.iter().filter(|e| {
                    ["phone", "tel", "mobile"].iter().any(|w| e.label_lower.contains(w))
                }),
            )
        })
        .or_else(|| {
            first_with_value(
                r,
                r.index.iter().filter(|e| e.id_lower.contains("phone") || e.id_lower.contains("tel")),
            )
        })
        .or_else(|| first_data_value(r, |v| v.as_str().is_some_and(looks_like_phone)))
}

const EXACT_NAME_LABELS: &[&str] = &["name", "full name", "your name"];
const NOT_A_FULL_NAME: &[&str] = &["first", "last", "company", "user"];

fn full_name(r: &FieldResolver<'_>) -> Option<Hit> {
    first_with_value(r, r.index.iter().filter(|e| e.field.field_type == FieldType::Name))
        .or_else(|| {
            first_with_value(
                r,
                r.index.iter().filter(|e| EXACT_NAME_LABELS.contains(&e.label_lower.as_str())),
            )
        })
        .or_else(|| {
            first_with_value(
                r,
                r.index.iter().filter(|e| {
                    e.label_lower.contains("name")
                        && !NOT_A_FULL_NAME.iter().any(|w| e.label_lower.contains(w))
                }),
            )
        })
        .or_else(|| composed_name(r))
}

/// First and last name fields joined with a space.
fn composed_name(r: &FieldResolver<'_>) -> Option<Hit> {
    let part = |label: &str, key: &str| {
        first_with_value(
            r,
            r.index.iter().filter(|e| {
                e.label_lower.contains(label) || e.field.stable_id() == Some(key)
            }),
        )
        .map(|hit| (display_value(&hit.value).trim().to_string(), hit.source))
        .filter(|(text, _)| !text.is_empty())
    };

    let parts: Vec<(String, String)> = [
        part("first name", canonical::FIRST_NAME),
        part("last name", canonical::LAST_NAME),
    ]
    .into_iter()
    .flatten()
    .collect();

    let source = parts.first()?.1.clone();
    let joined = parts
        .into_iter()
        .map(|(text, _)| text)
        .collect::<Vec<_>>()
        .join(" ");
    Some(Hit {
        value: Value::String(joined),
        source,
    })
}

fn first_with_value<'e, 'a: 'e, I>(r: &FieldResolver<'a>, entries: I) -> Option<Hit>
where
    I: IntoIterator<Item = &'e IndexedField<'a>>,
{
    entries.into_iter().find_map(|e| r.value_of(e.field))
}

fn first_data_value(r: &FieldResolver<'_>, pred: impl Fn(&Value) -> bool) -> Option<Hit> {
    r.data
        .iter()
        .find(|(_, v)| pred(v))
        .map(|(k, v)| Hit::new(v, k))
}

fn contains_either(a: &str, b: &str) -> bool {
    !a.is_empty() && !b.is_empty() && (a.contains(b) || b.contains(a))
}

fn looks_like_phone(s: &str) -> bool {
    let digits = s.chars().filter(char::is_ascii_digit).count();
    digits >= 7
        && s.chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')' | '.'))
}

#[cfg(test)]
mod tests {
    use super::super::{FieldResolver, Tier};
    use super::*;
    use sase_forms::{FieldConfig, SubmissionData};
    use serde_json::json;

    fn tier_of(fields: &[FieldConfig], data: &SubmissionData, key: &str) -> Option<(Tier, Value)> {
        FieldResolver::new(fields, data)
            .resolve_traced(key)
            .map(|r| (r.tier, r.value))
    }

    #[test]
    fn test_email_heuristic_stages() {
        let by_label = vec![FieldConfig::new("f1", "Your e-mail / email", FieldType::Text)];
        let data = SubmissionData::new().with("f1", "ada@example.com");
        assert_eq!(tier_of(&by_label, &data, "EMAIL").map(|t| t.0), Some(Tier::Semantic));

        let by_id = vec![FieldConfig::new("contact_email_2", "Reach you at", FieldType::Text)];
        let data = SubmissionData::new().with("contact_email_2", "ada@example.com");
        assert_eq!(
            tier_of(&by_id, &data, "email"),
            Some((Tier::Semantic, json!("ada@example.com")))
        );

        let data = SubmissionData::new()
            .with("x1", "hello")
            .with("x2", "grace@example.com");
        assert_eq!(
            tier_of(&[], &data, "email"),
            Some((Tier::Semantic, json!("grace@example.com")))
        );
    }

    #[test]
    fn test_phone_heuristic() {
        let fields = vec![FieldConfig::new("f9", "Mobile", FieldType::Text)];
        let data = SubmissionData::new().with("f9", "07700 900123");
        assert_eq!(tier_of(&fields, &data, "phone").map(|t| t.0), Some(Tier::Semantic));

        let data = SubmissionData::new()
            .with("a", "12")
            .with("b", "+44 (0)20 7946-0958");
        assert_eq!(
            tier_of(&[], &data, "phone"),
            Some((Tier::Semantic, json!("+44 (0)20 7946-0958")))
        );
    }

    #[test]
    fn test_name_heuristic_prefers_full_name_field() {
        let fields = vec![
            FieldConfig::new("f1", "First Name", FieldType::Text),
            FieldConfig::new("f2", "Your Name", FieldType::Text),
        ];
        let data = SubmissionData::new().with("f1", "Ada").with("f2", "Ada Lovelace");
        assert_eq!(
            tier_of(&fields, &data, "name"),
            Some((Tier::Semantic, json!("Ada Lovelace")))
        );
    }

    #[test]
    fn test_name_composed_from_parts() {
        let fields = vec![
            FieldConfig::new("f1", "First Name", FieldType::Text),
            FieldConfig::new("f2", "Family", FieldType::Text).with_stable_id("lastName"),
            FieldConfig::new("f3", "Company Name", FieldType::Text),
        ];
        let data = SubmissionData::new()
            .with("f1", " Ada ")
            .with("f2", "Lovelace")
            .with("f3", "Analytical Engines Ltd");
        let r = FieldResolver::new(&fields, &data).resolve_traced("name").unwrap();
        assert_eq!(r.tier, Tier::Semantic);
        assert_eq!(r.value, json!("Ada Lovelace"));
        assert_eq!(r.source, "f1");

        let only_first = SubmissionData::new().with("f1", "Ada");
        assert_eq!(tier_of(&fields, &only_first, "name").map(|t| t.1), Some(json!("Ada")));
    }

    #[test]
    fn test_field_containment() {
        let fields = vec![
            FieldConfig::new("input_budget_range", "How much?", FieldType::Select),
            FieldConfig::new("f7", "Anything else", FieldType::Textarea).with_key("notes"),
        ];
        let data = SubmissionData::new()
            .with("input_budget_range", "10k-50k")
            .with("f7", "call after 5");
        assert_eq!(
            tier_of(&fields, &data, "budget"),
            Some((Tier::FieldContainment, json!("10k-50k")))
        );
        assert_eq!(
            tier_of(&fields, &data, "additionalNotes"),
            Some((Tier::FieldContainment, json!("call after 5")))
        );
    }

    #[test]
    fn test_key_containment_uses_first_data_key() {
        let data = SubmissionData::new()
            .with("utm_source_primary", "newsletter")
            .with("utm_source", "ads");
        assert_eq!(
            tier_of(&[], &data, "UTM_SOURCE"),
            Some((Tier::KeyContainment, json!("newsletter")))
        );
    }

    #[test]
    fn test_similarity_boundary() {
        let data = SubmissionData::new().with("abxy", "no");
        assert_eq!(tier_of(&[], &data, "abcd"), None);

        let key = format!("{}{}", "a".repeat(51), "b".repeat(49));
        let near = format!("{}{}", "a".repeat(51), "c".repeat(49));
        let data = SubmissionData::new().with(near, "yes");
        assert_eq!(tier_of(&[], &data, &key), Some((Tier::Similarity, json!("yes"))));
    }

    #[test]
    fn test_similarity_tie_uses_submission_order() {
        let data = SubmissionData::new().with("abcx", 1).with("abcy", 2);
        assert_eq!(tier_of(&[], &data, "abcz"), Some((Tier::Similarity, json!(1))));
    }

    #[test]
    fn test_looks_like_phone() {
        assert!(looks_like_phone("+1 (555) 010-9999"));
        assert!(!looks_like_phone("555-01"));
        assert!(!looks_like_phone("call 5550109999"));
    }
}
