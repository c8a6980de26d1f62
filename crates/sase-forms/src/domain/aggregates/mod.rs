//! Form Aggregate
use crate::domain::events::{DomainEvent, FormEvent};
use crate::domain::value_objects::FieldConfig;
use crate::stable_key;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Form {
    id: String,
    #[serde(default)]
    name: String,
    /// Fields placed outside any section; they come first when flattened.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    fields: Vec<FieldConfig>,
    #[serde(default)]
    sections: Vec<FormSection>,
    #[serde(default = "Utc::now")]
    updated_at: DateTime<Utc>,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FormSection {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub fields: Vec<FieldConfig>,
}

impl FormSection {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self { id: id.into(), title: title.into(), fields: vec![] }
    }
}

impl Form {
    pub fn create(name: impl Into<String>) -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string(), name)
    }

    pub fn with_id(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into(), fields: vec![], sections: vec![], updated_at: Utc::now(), events: vec![] }
    }

    pub fn id(&self) -> &str { &self.id }
    pub fn name(&self) -> &str { &self.name }
    pub fn sections(&self) -> &[FormSection] { &self.sections }
    pub fn updated_at(&self) -> DateTime<Utc> { self.updated_at }

    pub fn add_section(&mut self, section: FormSection) {
        self.sections.push(section);
        self.touch();
    }

    /// Add a field to the named section, or to the loose field list when the
    /// section does not exist.
    pub fn add_field(&mut self, section_id: Option<&str>, field: FieldConfig) {
        let event = FormEvent::FieldAdded { form_id: self.id.clone(), field_id: field.id.clone() };
        match section_id.and_then(|id| self.sections.iter_mut().find(|s| s.id == id)) {
            Some(section) => section.fields.push(field),
            None => self.fields.push(field),
        }
        self.events.push(DomainEvent::Form(event));
        self.touch();
    }

    pub fn remove_field(&mut self, field_id: &str) {
        self.fields.retain(|f| f.id != field_id);
        for section in &mut self.sections {
            section.fields.retain(|f| f.id != field_id);
        }
        self.events.push(DomainEvent::Form(FormEvent::FieldRemoved {
            form_id: self.id.clone(),
            field_id: field_id.to_string(),
        }));
        self.touch();
    }

    /// Loose fields followed by every section's fields, in order.
    pub fn flattened_fields(&self) -> Vec<FieldConfig> {
        self.fields_iter().cloned().collect()
    }

    pub fn field(&self, field_id: &str) -> Option<&FieldConfig> {
        self.fields_iter().find(|f| f.id == field_id)
    }

    /// Assign stable keys to every field that lacks one.
    ///
    /// Fields that already carry a key are never touched. Returns the number
    /// of assignments; each one is also recorded as a `StableKeyAssigned`
    /// event for the storage collaborator.
    pub fn ensure_stable_keys(&mut self) -> usize {
        let form_id = self.id.clone();
        let mut assigned = Vec::new();
        let sections = self.sections.iter_mut().flat_map(|s| s.fields.iter_mut());
        for field in self.fields.iter_mut().chain(sections) {
            if field.stable_id().is_some() {
                continue;
            }
            let key = stable_key::assign(field);
            debug!(form_id = %form_id, field_id = %field.id, stable_key = %key, "assigned stable key");
            field.stable_id = Some(key.clone());
            assigned.push(FormEvent::StableKeyAssigned {
                form_id: form_id.clone(),
                field_id: field.id.clone(),
                stable_key: key,
            });
        }
        let count = assigned.len();
        if count > 0 {
            self.events.extend(assigned.into_iter().map(DomainEvent::Form));
            self.touch();
        }
        count
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }

    fn fields_iter(&self) -> impl Iterator<Item = &FieldConfig> {
        self.fields.iter().chain(self.sections.iter().flat_map(|s| s.fields.iter()))
    }

    fn touch(&mut self) { self.updated_at = Utc::now(); }
}
