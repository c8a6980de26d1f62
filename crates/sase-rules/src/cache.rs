//! Compiled template cache

use crate::config::TemplateCacheConfig;
use crate::template::CompiledTemplate;
use moka::sync::Cache;
use std::sync::Arc;
use std::time::Duration;

/// Bounded cache of compiled templates keyed by template text.
///
/// Rule templates are rendered once per matching submission but change
/// rarely, so placeholder extraction is done once per distinct text.
pub struct TemplateCache {
    cache: Cache<String, Arc<CompiledTemplate>>,
}

impl TemplateCache {
    /// Create cache with capacity and TTL
    pub fn new(config: &TemplateCacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.capacity)
            .time_to_live(Duration::from_secs(config.ttl_secs))
            .build();

        Self { cache }
    }

    /// Compiled form of `text`, compiling on first use
    pub fn get_or_compile(&self, text: &str) -> Arc<CompiledTemplate> {
        if let Some(hit) = self.cache.get(text) {
            return hit;
        }
        self.cache
            .get_with(text.to_string(), || Arc::new(CompiledTemplate::compile(text)))
    }

    /// Clear cache
    pub fn clear(&self) {
        self.cache.invalidate_all();
    }

    /// Get current size (eventually consistent)
    pub fn len(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.cache.entry_count() == 0
    }
}

impl Default for TemplateCache {
    fn default() -> Self {
        Self::new(&TemplateCacheConfig::default())
    }
}
