//! Form Rule Engine
//!
//! Decides which email automation rules fire for a form submission and
//! renders their templates, even though the form's field ids change every
//! time the form is rebuilt.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                     Submission Dispatch                          │
//! │                                                                  │
//! │  ┌────────────┐   ┌──────────────┐   ┌────────────┐   ┌────────┐ │
//! │  │ Stable key │──►│ Rule engine  │──►│ Recipients │──►│Template│ │
//! │  │  backfill  │   │ (conditions) │   │            │   │ render │ │
//! │  └────────────┘   └──────┬───────┘   └─────┬──────┘   └───┬────┘ │
//! │                          │                 │              │      │
//! │                          ▼                 ▼              ▼      │
//! │                 ┌──────────────────────────────────────────┐     │
//! │                 │  FieldResolver (8 tiers, memoized)       │     │
//! │                 └──────────────────────────────────────────┘     │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything below the dispatcher is synchronous and pure over in-memory
//! inputs. Malformed conditions and unresolvable fields never fail a
//! submission; they evaluate to false or render empty.

#![warn(clippy::all)]

pub mod cache;
pub mod condition;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod evaluator;
pub mod repository;
pub mod resolver;
pub mod rule;
pub mod store;
pub mod template;
pub mod visibility;

pub use condition::{Condition, ConditionGroup, InvalidCondition};
pub use config::{EngineConfig, ResolverConfig, TemplateCacheConfig};
pub use dispatch::{DispatchReport, OutgoingEmail, SkipReason, SkippedRule, SubmissionDispatcher};
pub use engine::{EngineStats, RuleEngine};
pub use evaluator::{evaluate_condition, evaluate_group, ConditionEvaluator};
pub use repository::{
    InMemoryRuleRepository, InMemoryTemplateRepository, RuleRepository, TemplateRepository,
};
pub use resolver::{resolve, FieldResolver, Resolution, Tier};
pub use rule::{EmailRule, EmailTemplate, RecipientType};
pub use store::RuleStore;
pub use template::{interpolate, CompiledTemplate, TemplateInterpolator};
pub use visibility::{evaluate_visibility, is_visible, visible_fields};
