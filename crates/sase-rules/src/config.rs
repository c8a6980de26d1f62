//! Engine configuration

use sase_common::{SaseError, SaseResult};
use serde::{Deserialize, Serialize};

/// Top-level engine configuration.
///
/// Every section has defaults, so an empty TOML document is a valid config.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Field resolution tuning
    pub resolver: ResolverConfig,
    /// Compiled template cache
    pub template_cache: TemplateCacheConfig,
}

impl EngineConfig {
    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> SaseResult<()> {
        let threshold = self.resolver.similarity_threshold;
        if !(0.0..1.0).contains(&threshold) {
            return Err(SaseError::ConfigError(format!(
                "resolver.similarity_threshold must be in [0, 1), got {threshold}"
            )));
        }
        if self.template_cache.capacity == 0 {
            return Err(SaseError::ConfigError(
                "template_cache.capacity must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Field resolution tuning
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// A similarity match is accepted only when its score is strictly above this.
    pub similarity_threshold: f64,
    /// Run the email/phone/name heuristics tier.
    pub semantic_heuristics: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.5,
            semantic_heuristics: true,
        }
    }
}

/// Compiled template cache
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateCacheConfig {
    /// Maximum number of compiled templates kept
    pub capacity: u64,
    /// Time-to-live of a compiled template in seconds
    pub ttl_secs: u64,
}

impl Default for TemplateCacheConfig {
    fn default() -> Self {
        Self {
            capacity: 1024,
            ttl_secs: 300,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.resolver.similarity_threshold, 0.5);
        assert!(config.resolver.semantic_heuristics);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"resolver": {"similarity_threshold": 0.7}}"#).unwrap();
        assert_eq!(config.resolver.similarity_threshold, 0.7);
        assert!(config.resolver.semantic_heuristics);
        assert_eq!(config.template_cache.capacity, 1024);
    }

    #[test]
    fn test_invalid_threshold() {
        let mut config = EngineConfig::default();
        config.resolver.similarity_threshold = 1.0;
        assert!(matches!(config.validate(), Err(SaseError::ConfigError(_))));

        config.resolver.similarity_threshold = 0.5;
        config.template_cache.capacity = 0;
        assert!(config.validate().is_err());
    }
}
