//! OpenSASE Form Builder Platform
//!
//! Self-hosted form builder replacing Typeform, JotForm, Google Forms.
//!
//! Field ids are regenerated every time a form is rebuilt, so everything that
//! has to survive an edit (email rules, templates, conditional logic) refers to
//! fields through a *stable key* instead. This crate owns the field model and
//! the assignment of those keys.
//!
//! ## Features
//! - Field configuration model (types, options, conditional logic)
//! - Option and conditional-logic normalization across stored encodings
//! - Stable semantic keys (`email`, `firstName`, ...) derived from field config
//! - Submissions with insertion-ordered data
//! - Form and submission repositories

pub mod domain;
pub mod repository;
pub mod stable_key;
pub mod submission;

pub use domain::aggregates::{Form, FormSection};
pub use domain::events::{DomainEvent, FormEvent};
pub use domain::value_objects::options::normalize_options;
pub use domain::value_objects::visibility::normalize_visibility;
pub use domain::value_objects::{
    ConditionalOperator, FieldConfig, FieldOption, FieldType, FieldVisibility, VisibilityAction,
    VisibilityCondition,
};
pub use repository::{
    FormRepository, InMemoryFormRepository, InMemorySubmissionRepository, RepoResult,
    RepositoryError, SubmissionRepository,
};
pub use stable_key::{assign, camel_case};
pub use submission::{display_value, FormSubmission, SubmissionData};
