//! `{{placeholder}}` interpolation for email subjects and bodies

use crate::cache::TemplateCache;
use crate::config::TemplateCacheConfig;
use crate::resolver::FieldResolver;
use regex::Regex;
use sase_forms::{display_value, FieldConfig, SubmissionData};
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::trace;

static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();

fn placeholder_re() -> &'static Regex {
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\{\{([^{}]*?)\}\}").expect("placeholder pattern is a valid regex")
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

/// Template text split into literals and placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledTemplate {
    source: String,
    segments: Vec<Segment>,
    /// Distinct identifiers in first-seen order
    placeholders: Vec<String>,
}

impl CompiledTemplate {
    pub fn compile(text: &str) -> Self {
        let mut segments = Vec::new();
        let mut placeholders: Vec<String> = Vec::new();
        let mut last = 0;

        for caps in placeholder_re().captures_iter(text) {
            let (Some(whole), Some(ident)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if whole.start() > last {
                segments.push(Segment::Literal(text[last..whole.start()].to_string()));
            }
            let ident = ident.as_str().trim().to_string();
            if !placeholders.contains(&ident) {
                placeholders.push(ident.clone());
            }
            segments.push(Segment::Placeholder(ident));
            last = whole.end();
        }
        if last < text.len() {
            segments.push(Segment::Literal(text[last..].to_string()));
        }

        Self {
            source: text.to_string(),
            segments,
            placeholders,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn placeholders(&self) -> &[String] {
        &self.placeholders
    }

    /// Substitute every placeholder; unresolved ones render empty.
    pub fn render(&self, resolver: &FieldResolver<'_>) -> String {
        if self.placeholders.is_empty() {
            return self.source.clone();
        }

        let values: HashMap<&str, String> = self
            .placeholders
            .iter()
            .map(|ident| {
                let text = resolver.resolve(ident).map(|v| display_value(&v));
                if text.is_none() {
                    trace!(placeholder = %ident, "placeholder unresolved");
                }
                (ident.as_str(), text.unwrap_or_default())
            })
            .collect();

        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(ident) => {
                    out.push_str(values.get(ident.as_str()).map_or("", String::as_str))
                }
            }
        }
        out
    }
}

/// Renders templates through a shared compiled-template cache.
pub struct TemplateInterpolator {
    cache: TemplateCache,
}

impl TemplateInterpolator {
    pub fn new(config: &TemplateCacheConfig) -> Self {
        Self {
            cache: TemplateCache::new(config),
        }
    }

    pub fn render(&self, template: &str, resolver: &FieldResolver<'_>) -> String {
        self.cache.get_or_compile(template).render(resolver)
    }

    pub fn cache(&self) -> &TemplateCache {
        &self.cache
    }
}

impl Default for TemplateInterpolator {
    fn default() -> Self {
        Self::new(&TemplateCacheConfig::default())
    }
}

/// Interpolate one template against one submission.
pub fn interpolate(template: &str, fields: &[FieldConfig], data: &SubmissionData) -> String {
    let resolver = FieldResolver::new(fields, data);
    CompiledTemplate::compile(template).render(&resolver)
}
