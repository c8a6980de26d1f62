//! Per-submission field index
//!
//! Every tier rescans the field list, so the lower-cased and camelCased forms
//! of each field are computed once when the resolver is built.

use sase_forms::{camel_case, FieldConfig};
use std::collections::HashMap;

pub(crate) struct IndexedField<'a> {
    pub field: &'a FieldConfig,
    pub label_lower: String,
    pub label_camel: String,
    pub id_lower: String,
    pub key_lower: Option<String>,
}

pub(crate) struct FieldIndex<'a> {
    entries: Vec<IndexedField<'a>>,
    by_stable_id: HashMap<&'a str, Vec<usize>>,
    by_mapping: HashMap<&'a str, Vec<usize>>,
}

impl<'a> FieldIndex<'a> {
    pub fn build(fields: &'a [FieldConfig]) -> Self {
        let mut by_stable_id: HashMap<&'a str, Vec<usize>> = HashMap::new();
        let mut by_mapping: HashMap<&'a str, Vec<usize>> = HashMap::new();
        let mut entries = Vec::with_capacity(fields.len());

        for (pos, field) in fields.iter().enumerate() {
            if let Some(stable_id) = field.stable_id() {
                by_stable_id.entry(stable_id).or_default().push(pos);
            }
            if let Some(mapping) = field.mapping() {
                by_mapping.entry(mapping).or_default().push(pos);
            }
            entries.push(IndexedField {
                field,
                label_lower: field.label.trim().to_lowercase(),
                label_camel: camel_case(&field.label),
                id_lower: field.id.to_lowercase(),
                key_lower: field.key().map(str::to_lowercase),
            });
        }

        Self {
            entries,
            by_stable_id,
            by_mapping,
        }
    }

    /// All fields in form order.
    pub fn iter(&self) -> impl Iterator<Item = &IndexedField<'a>> {
        self.entries.iter()
    }

    pub fn with_stable_id(&self, key: &str) -> impl Iterator<Item = &IndexedField<'a>> {
        self.lookup(&self.by_stable_id, key)
    }

    pub fn with_mapping(&self, key: &str) -> impl Iterator<Item = &IndexedField<'a>> {
        self.lookup(&self.by_mapping, key)
    }

    fn lookup<'s>(
        &'s self,
        map: &'s HashMap<&'a str, Vec<usize>>,
        key: &str,
    ) -> impl Iterator<Item = &'s IndexedField<'a>> {
        map.get(key)
            .into_iter()
            .flatten()
            .map(move |&pos| &self.entries[pos])
    }
}
