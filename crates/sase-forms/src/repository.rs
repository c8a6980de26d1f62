//! Repositories - form configuration and submission providers
//!
//! The engine never persists anything itself. Storage collaborators implement
//! these traits; the in-memory versions back tests and the CLI.

use crate::domain::aggregates::Form;
use crate::submission::FormSubmission;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Repository result type
pub type RepoResult<T> = Result<T, RepositoryError>;

/// Repository errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum RepositoryError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("storage error: {0}")]
    StorageError(String),
}

/// Form configuration provider
#[async_trait]
pub trait FormRepository: Send + Sync {
    /// Get form by ID
    async fn get(&self, id: &str) -> RepoResult<Form>;

    /// Save form (used to persist newly assigned stable keys)
    async fn save(&self, form: &Form) -> RepoResult<()>;
}

/// Submission data provider
#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    async fn get(&self, id: &str) -> RepoResult<FormSubmission>;
    async fn save(&self, submission: &FormSubmission) -> RepoResult<()>;
}

/// In-memory form repository (for testing and development)
pub struct InMemoryFormRepository {
    forms: RwLock<HashMap<String, Form>>,
}

impl InMemoryFormRepository {
    pub fn new() -> Self {
        Self {
            forms: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryFormRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FormRepository for InMemoryFormRepository {
    async fn get(&self, id: &str) -> RepoResult<Form> {
        self.forms
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    /// Stores the form state only; pending events stay with the caller.
    async fn save(&self, form: &Form) -> RepoResult<()> {
        let mut stored = form.clone();
        stored.take_events();
        self.forms.write().insert(form.id().to_string(), stored);
        Ok(())
    }
}

/// In-memory submission repository
pub struct InMemorySubmissionRepository {
    submissions: RwLock<HashMap<String, FormSubmission>>,
}

impl InMemorySubmissionRepository {
    pub fn new() -> Self {
        Self {
            submissions: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemorySubmissionRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SubmissionRepository for InMemorySubmissionRepository {
    async fn get(&self, id: &str) -> RepoResult<FormSubmission> {
        self.submissions
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    async fn save(&self, submission: &FormSubmission) -> RepoResult<()> {
        let mut submissions = self.submissions.write();
        if submissions.contains_key(&submission.id) {
            return Err(RepositoryError::Conflict(format!(
                "submission {} is immutable",
                submission.id
            )));
        }
        submissions.insert(submission.id.clone(), submission.clone());
        Ok(())
    }
}
