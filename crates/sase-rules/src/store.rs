//! Lock-free rule store with hot-swapping

use crate::rule::EmailRule;
use arc_swap::ArcSwap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Lock-free rule store with atomic updates
///
/// Readers take a snapshot and keep evaluating against it while an update
/// swaps in a new rule set.
pub struct RuleStore {
    rules: ArcSwap<Vec<EmailRule>>,
    version: AtomicU64,
}

impl RuleStore {
    /// Create empty store
    pub fn new() -> Self {
        Self {
            rules: ArcSwap::from_pointee(Vec::new()),
            version: AtomicU64::new(0),
        }
    }

    /// Create with initial rules
    pub fn with_rules(rules: Vec<EmailRule>) -> Self {
        Self {
            rules: ArcSwap::from_pointee(rules),
            version: AtomicU64::new(1),
        }
    }

    /// Get current version
    #[inline]
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Current rule set
    pub fn snapshot(&self) -> Arc<Vec<EmailRule>> {
        self.rules.load_full()
    }

    pub fn get(&self, id: &str) -> Option<EmailRule> {
        self.rules.load().iter().find(|r| r.id == id).cloned()
    }

    /// Get number of rules
    pub fn len(&self) -> usize {
        self.rules.load().len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.rules.load().is_empty()
    }

    /// Atomically replace all rules
    pub fn update(&self, rules: Vec<EmailRule>) {
        self.rules.store(Arc::new(rules));
        self.version.fetch_add(1, Ordering::Release);
    }
}

impl Default for RuleStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_update() {
        let store = RuleStore::new();
        assert_eq!(store.version(), 0);
        assert!(store.is_empty());

        store.update(vec![EmailRule::new("r1", "t1"), EmailRule::new("r2", "t2")]);

        assert_eq!(store.version(), 1);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("r2").map(|r| r.template_id), Some("t2".to_string()));
        assert!(store.get("r3").is_none());
    }

    #[test]
    fn test_snapshot_survives_update() {
        let store = RuleStore::with_rules(vec![EmailRule::new("r1", "t1")]);
        let before = store.snapshot();

        store.update(Vec::new());

        assert_eq!(before.len(), 1);
        assert!(store.is_empty());
        assert_eq!(store.version(), 2);
    }
}
