//! Field resolution with tiered fallback
//!
//! Field ids are regenerated on every form edit, so rules and templates refer
//! to fields by logical key (a stable key, a raw id, or a label). Resolution
//! walks an ordered list of strategies and stops at the first hit:
//!
//! ```text
//!  key ──► Direct ──► StableId ──► Mapping ──► Label ──► Semantic
//!                                                          │
//!          None ◄── Similarity ◄── KeyContainment ◄── FieldContainment
//! ```
//!
//! Exact and structural tiers come before fuzzy ones. The resolver is built
//! once per submission; tier results are memoized per key.

mod index;
pub mod similarity;
mod strategies;

use crate::config::ResolverConfig;
use dashmap::DashMap;
use index::FieldIndex;
use sase_forms::{FieldConfig, SubmissionData};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, trace};

/// Resolution tier, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// `data[key]`
    Direct,
    /// Field whose stable key equals the logical key
    StableId,
    /// Field whose administrator mapping equals the logical key
    Mapping,
    /// Field whose label (or camelCased label) equals the logical key
    Label,
    /// Email/phone/name heuristics
    Semantic,
    /// Substring match between the key and a field id or machine name
    FieldContainment,
    /// Substring match between the key and a raw submission key
    KeyContainment,
    /// Character-overlap similarity against submission keys
    Similarity,
}

impl Tier {
    /// Exact and structural tiers, tried before any heuristic or fuzzy one.
    pub fn is_exact(&self) -> bool {
        matches!(self, Tier::Direct | Tier::StableId | Tier::Mapping | Tier::Label)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Direct => "direct",
            Tier::StableId => "stable_id",
            Tier::Mapping => "mapping",
            Tier::Label => "label",
            Tier::Semantic => "semantic",
            Tier::FieldContainment => "field_containment",
            Tier::KeyContainment => "key_containment",
            Tier::Similarity => "similarity",
        }
    }
}

/// A resolved value together with where it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    pub value: Value,
    pub tier: Tier,
    /// Submission key the value was read from (for composed values, the
    /// first contributing key).
    pub source: String,
}

/// Strategy output before the driver tags it with its tier.
pub(crate) struct Hit {
    value: Value,
    source: String,
}

impl Hit {
    fn new(value: &Value, source: &str) -> Self {
        Self {
            value: value.clone(),
            source: source.to_string(),
        }
    }
}

type Strategy = fn(&FieldResolver<'_>, &str) -> Option<Hit>;

const STRATEGIES: &[(Tier, Strategy)] = &[
    (Tier::Direct, strategies::direct),
    (Tier::StableId, strategies::stable_id),
    (Tier::Mapping, strategies::mapping),
    (Tier::Label, strategies::label),
    (Tier::Semantic, strategies::semantic),
    (Tier::FieldContainment, strategies::field_containment),
    (Tier::KeyContainment, strategies::key_containment),
    (Tier::Similarity, strategies::similarity),
];

/// Resolves logical keys against one submission.
///
/// Read-only over its inputs. The memo is a concurrent map, so a resolver can
/// be shared by threads evaluating different rules for the same submission.
pub struct FieldResolver<'a> {
    fields: &'a [FieldConfig],
    data: &'a SubmissionData,
    index: FieldIndex<'a>,
    config: ResolverConfig,
    memo: DashMap<String, Option<Resolution>>,
}

impl<'a> FieldResolver<'a> {
    /// Create resolver with default tuning
    pub fn new(fields: &'a [FieldConfig], data: &'a SubmissionData) -> Self {
        Self::with_config(fields, data, ResolverConfig::default())
    }

    /// Create resolver with custom tuning
    pub fn with_config(
        fields: &'a [FieldConfig],
        data: &'a SubmissionData,
        config: ResolverConfig,
    ) -> Self {
        Self {
            fields,
            data,
            index: FieldIndex::build(fields),
            config,
            memo: DashMap::new(),
        }
    }

    pub fn fields(&self) -> &'a [FieldConfig] {
        self.fields
    }

    pub fn data(&self) -> &'a SubmissionData {
        self.data
    }

    /// Value a logical key refers to, or `None` when the field is absent.
    pub fn resolve(&self, key: &str) -> Option<Value> {
        self.resolve_traced(key).map(|r| r.value)
    }

    /// Like [`resolve`](Self::resolve), also reporting the tier that matched.
    pub fn resolve_traced(&self, key: &str) -> Option<Resolution> {
        if key.trim().is_empty() {
            return None;
        }
        if let Some(cached) = self.memo.get(key) {
            return cached.value().clone();
        }

        let resolution = self.run_tiers(key);
        self.memo.insert(key.to_string(), resolution.clone());
        resolution
    }

    /// Resolve the first of several keys naming the same field.
    ///
    /// Every key gets the exact tiers before any key reaches the fuzzy ones,
    /// so a stale id cannot shadow a stable key through a similarity hit.
    pub fn resolve_first<'k, I>(&self, keys: I) -> Option<Resolution>
    where
        I: IntoIterator<Item = &'k str>,
    {
        let mut fuzzy = None;
        for key in keys {
            match self.resolve_traced(key) {
                Some(found) if found.tier.is_exact() => return Some(found),
                Some(found) => {
                    fuzzy.get_or_insert(found);
                }
                None => {}
            }
        }
        fuzzy
    }

    fn run_tiers(&self, key: &str) -> Option<Resolution> {
        for (tier, strategy) in STRATEGIES {
            if *tier == Tier::Semantic && !self.config.semantic_heuristics {
                continue;
            }
            if let Some(hit) = strategy(self, key) {
                trace!(key, tier = ?tier, source = %hit.source, "logical key resolved");
                return Some(Resolution {
                    value: hit.value,
                    tier: *tier,
                    source: hit.source,
                });
            }
        }
        debug!(key, "logical key did not resolve");
        None
    }

    fn value_of(&self, field: &FieldConfig) -> Option<Hit> {
        self.data.get(&field.id).map(|v| Hit::new(v, &field.id))
    }
}

/// Resolve one key with default tuning.
pub fn resolve(key: &str, fields: &[FieldConfig], data: &SubmissionData) -> Option<Value> {
    FieldResolver::new(fields, data).resolve(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sase_forms::FieldType;
    use serde_json::json;

    fn contact_fields() -> Vec<FieldConfig> {
        vec![
            FieldConfig::new("field_101", "Contact Email", FieldType::Email).with_stable_id("workEmail"),
            FieldConfig::new("field_102", "Work Email", FieldType::Text),
            FieldConfig::new("field_103", "Budget", FieldType::Number).with_mapping("projectBudget"),
            FieldConfig::new("field_104", "Preferred Contact Method", FieldType::Select),
        ]
    }

    fn contact_data() -> SubmissionData {
        SubmissionData::new()
            .with("field_101", "ada@example.com")
            .with("field_102", "other@example.com")
            .with("field_103", 5000)
            .with("field_104", "phone")
    }

    #[test]
    fn test_direct_tier() {
        let fields = contact_fields();
        let data = contact_data();
        let resolver = FieldResolver::new(&fields, &data);

        let r = resolver.resolve_traced("field_103").unwrap();
        assert_eq!(r.tier, Tier::Direct);
        assert_eq!(r.value, json!(5000));
    }

    #[test]
    fn test_stable_id_beats_label() {
        let fields = contact_fields();
        let data = contact_data();
        let resolver = FieldResolver::new(&fields, &data);

        // "workEmail" is also the camelCased label of field_102.
        let r = resolver.resolve_traced("workEmail").unwrap();
        assert_eq!(r.tier, Tier::StableId);
        assert_eq!(r.value, json!("ada@example.com"));
        assert_eq!(r.source, "field_101");
    }

    #[test]
    fn test_mapping_and_label_tiers() {
        let fields = contact_fields();
        let data = contact_data();
        let resolver = FieldResolver::new(&fields, &data);

        assert_eq!(resolver.resolve_traced("projectBudget").unwrap().tier, Tier::Mapping);

        let by_label = resolver.resolve_traced("preferred contact METHOD").unwrap();
        assert_eq!(by_label.tier, Tier::Label);
        assert_eq!(by_label.value, json!("phone"));

        let by_camel = resolver.resolve_traced("preferredContactMethod").unwrap();
        assert_eq!(by_camel.tier, Tier::Label);
    }

    #[test]
    fn test_stable_id_without_data_falls_through() {
        let fields = vec![
            FieldConfig::new("old_id", "Email", FieldType::Email).with_stable_id("email"),
            FieldConfig::new("new_id", "Email address", FieldType::Email),
        ];
        let data = SubmissionData::new().with("new_id", "ada@example.com");
        let r = FieldResolver::new(&fields, &data).resolve_traced("email").unwrap();
        assert_eq!(r.tier, Tier::Semantic);
        assert_eq!(r.value, json!("ada@example.com"));
    }

    #[test]
    fn test_unresolved_is_none() {
        let fields = contact_fields();
        let data = contact_data();
        let resolver = FieldResolver::new(&fields, &data);
        assert_eq!(resolver.resolve("zzzz"), None);
        assert_eq!(resolver.resolve(""), None);
        assert_eq!(resolver.resolve("   "), None);
    }

    #[test]
    fn test_null_values_are_present() {
        let data = SubmissionData::new().with("notes", Value::Null);
        let r = FieldResolver::new(&[], &data).resolve_traced("notes").unwrap();
        assert_eq!(r.tier, Tier::Direct);
        assert_eq!(r.value, Value::Null);
    }

    #[test]
    fn test_memoized_result_is_stable() {
        let fields = contact_fields();
        let data = contact_data();
        let resolver = FieldResolver::new(&fields, &data);
        let first = resolver.resolve_traced("workEmail");
        let second = resolver.resolve_traced("workEmail");
        assert_eq!(first, second);
        assert_eq!(resolver.memo.len(), 1);
    }

    #[test]
    fn test_resolve_first_prefers_exact_tier_of_later_key() {
        let fields = vec![
            FieldConfig::new("field_1713", "Email", FieldType::Email).with_stable_id("email"),
            FieldConfig::new("field_1712", "Plan", FieldType::Select).with_stable_id("plan"),
        ];
        let data = SubmissionData::new()
            .with("field_1713", "ada@example.com")
            .with("field_1712", "pro");
        let resolver = FieldResolver::new(&fields, &data);

        // On its own the regenerated id lands on the wrong field by similarity.
        assert_eq!(resolver.resolve_traced("field_1699").unwrap().tier, Tier::Similarity);

        let r = resolver.resolve_first(["field_1699", "plan", "Plan"]).unwrap();
        assert_eq!(r.tier, Tier::StableId);
        assert_eq!(r.value, json!("pro"));

        let fallback = resolver.resolve_first(["field_1699", "", "zzzz"]).unwrap();
        assert_eq!(fallback.tier, Tier::Similarity);
        assert_eq!(resolver.resolve_first(["", "zzzz"]), None);
    }

    #[test]
    fn test_semantic_tier_can_be_disabled() {
        let fields = vec![FieldConfig::new("f1", "Contact", FieldType::Email)];
        let data = SubmissionData::new().with("f1", "ada@example.com");
        let config = ResolverConfig {
            semantic_heuristics: false,
            ..Default::default()
        };
        let resolver = FieldResolver::with_config(&fields, &data, config);
        assert_eq!(resolver.resolve("email"), None);
        assert_eq!(resolve("email", &fields, &data), Some(json!("ada@example.com")));
    }
}
