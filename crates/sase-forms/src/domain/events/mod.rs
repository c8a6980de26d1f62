//! Form events
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum DomainEvent {
    Form(FormEvent),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum FormEvent {
    /// A field received its stable key; the storage collaborator must persist it.
    StableKeyAssigned {
        form_id: String,
        field_id: String,
        stable_key: String,
    },
    FieldAdded { form_id: String, field_id: String },
    FieldRemoved { form_id: String, field_id: String },
}
