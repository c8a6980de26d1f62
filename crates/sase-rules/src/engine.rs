//! Rule engine: selects matching rules and renders their templates

use crate::config::EngineConfig;
use crate::evaluator::ConditionEvaluator;
use crate::resolver::FieldResolver;
use crate::rule::{EmailRule, EmailTemplate};
use crate::store::RuleStore;
use crate::template::TemplateInterpolator;
use sase_common::{AtomicCounter, Timestamp};
use sase_forms::{FieldConfig, SubmissionData};
use std::sync::Arc;
use tracing::debug;

/// Email rule engine
///
/// Rules are independent of each other: every enabled rule whose conditions
/// hold is selected, in store order. Resolution for a submission goes through
/// one [`FieldResolver`] so rules that share fields share lookups.
pub struct RuleEngine {
    store: Arc<RuleStore>,
    interpolator: TemplateInterpolator,
    config: EngineConfig,

    // Metrics
    evaluations: AtomicCounter,
    matches: AtomicCounter,
    invalid_conditions: AtomicCounter,
}

impl RuleEngine {
    /// Create engine with an empty rule store
    pub fn new(config: EngineConfig) -> Self {
        Self::with_store(Arc::new(RuleStore::new()), config)
    }

    /// Create engine over a shared rule store
    pub fn with_store(store: Arc<RuleStore>, config: EngineConfig) -> Self {
        Self {
            store,
            interpolator: TemplateInterpolator::new(&config.template_cache),
            config,
            evaluations: AtomicCounter::new(0),
            matches: AtomicCounter::new(0),
            invalid_conditions: AtomicCounter::new(0),
        }
    }

    /// Replace the stored rules
    pub fn load_rules(&self, rules: Vec<EmailRule>) {
        debug!(count = rules.len(), "loading email rules");
        self.store.update(rules);
    }

    /// Resolver for one submission, tuned by this engine's config
    pub fn resolver<'a>(&self, fields: &'a [FieldConfig], data: &'a SubmissionData) -> FieldResolver<'a> {
        FieldResolver::with_config(fields, data, self.config.resolver.clone())
    }

    /// Stored rules matching a submission
    pub fn matching_rules(&self, fields: &[FieldConfig], data: &SubmissionData) -> Vec<EmailRule> {
        let rules = self.store.snapshot();
        let resolver = self.resolver(fields, data);
        self.select(&rules, &resolver).into_iter().cloned().collect()
    }

    /// Like [`matching_rules`](Self::matching_rules), also returning elapsed
    /// microseconds
    pub fn matching_rules_timed(
        &self,
        fields: &[FieldConfig],
        data: &SubmissionData,
    ) -> (Vec<EmailRule>, u64) {
        let start = Timestamp::now();
        let matched = self.matching_rules(fields, data);
        (matched, start.elapsed_micros())
    }

    /// Rules from `rules` that fire for the resolver's submission
    pub fn select<'r>(&self, rules: &'r [EmailRule], resolver: &FieldResolver<'_>) -> Vec<&'r EmailRule> {
        let evaluator = ConditionEvaluator::new(resolver);
        let selected: Vec<&EmailRule> = rules
            .iter()
            .filter(|rule| rule.enabled)
            .filter(|rule| {
                self.evaluations.inc();
                let hit = evaluator.evaluate(&rule.conditions);
                debug!(rule_id = %rule.id, matched = hit, "rule evaluated");
                hit
            })
            .collect();

        self.matches.add(selected.len() as u64);
        self.invalid_conditions.add(evaluator.invalid_count());
        selected
    }

    /// Rendered `(subject, body)`
    pub fn render(&self, template: &EmailTemplate, resolver: &FieldResolver<'_>) -> (String, String) {
        (
            self.interpolator.render(&template.subject, resolver),
            self.interpolator.render(&template.body, resolver),
        )
    }

    /// Get engine statistics
    pub fn stats(&self) -> EngineStats {
        let evaluations = self.evaluations.get();
        let matches = self.matches.get();

        EngineStats {
            evaluations,
            matches,
            invalid_conditions: self.invalid_conditions.get(),
            match_rate: if evaluations > 0 { matches as f64 / evaluations as f64 } else { 0.0 },
            rules_loaded: self.store.len(),
            version: self.store.version(),
        }
    }

    /// Get rule store reference
    pub fn store(&self) -> &Arc<RuleStore> {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

/// Engine statistics
#[derive(Debug, Clone, serde::Serialize)]
pub struct EngineStats {
    pub evaluations: u64,
    pub matches: u64,
    pub invalid_conditions: u64,
    pub match_rate: f64,
    pub rules_loaded: usize,
    pub version: u64,
}
