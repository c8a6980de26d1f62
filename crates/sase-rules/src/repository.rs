//! Rule and template repositories

use crate::rule::{EmailRule, EmailTemplate};
use async_trait::async_trait;
use parking_lot::RwLock;
use sase_forms::{RepoResult, RepositoryError};
use std::collections::HashMap;

/// Email rules configured per form
#[async_trait]
pub trait RuleRepository: Send + Sync {
    /// Rules for a form, in configured order
    async fn rules_for_form(&self, form_id: &str) -> RepoResult<Vec<EmailRule>>;

    async fn save(&self, form_id: &str, rule: &EmailRule) -> RepoResult<()>;
}

/// Email template provider
#[async_trait]
pub trait TemplateRepository: Send + Sync {
    async fn get(&self, id: &str) -> RepoResult<EmailTemplate>;
    async fn save(&self, template: &EmailTemplate) -> RepoResult<()>;
}

/// In-memory rule repository (for testing and development)
pub struct InMemoryRuleRepository {
    rules: RwLock<HashMap<String, Vec<EmailRule>>>,
}

impl InMemoryRuleRepository {
    pub fn new() -> Self {
        Self {
            rules: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryRuleRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RuleRepository for InMemoryRuleRepository {
    async fn rules_for_form(&self, form_id: &str) -> RepoResult<Vec<EmailRule>> {
        Ok(self.rules.read().get(form_id).cloned().unwrap_or_default())
    }

    async fn save(&self, form_id: &str, rule: &EmailRule) -> RepoResult<()> {
        let mut rules = self.rules.write();
        let form_rules = rules.entry(form_id.to_string()).or_default();
        match form_rules.iter_mut().find(|r| r.id == rule.id) {
            Some(existing) => *existing = rule.clone(),
            None => form_rules.push(rule.clone()),
        }
        Ok(())
    }
}

/// In-memory template repository
pub struct InMemoryTemplateRepository {
    templates: RwLock<HashMap<String, EmailTemplate>>,
}

impl InMemoryTemplateRepository {
    pub fn new() -> Self {
        Self {
            templates: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryTemplateRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TemplateRepository for InMemoryTemplateRepository {
    async fn get(&self, id: &str) -> RepoResult<EmailTemplate> {
        self.templates
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    async fn save(&self, template: &EmailTemplate) -> RepoResult<()> {
        self.templates
            .write()
            .insert(template.id.clone(), template.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rules_keep_order_and_replace_by_id() {
        let repo = InMemoryRuleRepository::new();
        repo.save("form-1", &EmailRule::new("r1", "t1")).await.unwrap();
        repo.save("form-1", &EmailRule::new("r2", "t2")).await.unwrap();
        repo.save("form-1", &EmailRule::new("r1", "t9")).await.unwrap();

        let rules = repo.rules_for_form("form-1").await.unwrap();
        let summary: Vec<_> = rules.iter().map(|r| (r.id.as_str(), r.template_id.as_str())).collect();
        assert_eq!(summary, vec![("r1", "t9"), ("r2", "t2")]);

        assert!(repo.rules_for_form("form-2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_template() {
        let repo = InMemoryTemplateRepository::new();
        repo.save(&EmailTemplate::new("t1", "s", "b")).await.unwrap();
        assert_eq!(repo.get("t1").await.unwrap().subject, "s");
        assert!(matches!(repo.get("t2").await, Err(RepositoryError::NotFound(_))));
    }
}
