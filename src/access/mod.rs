//! Action authorization core — policy model, ordered rule chain, decision
//! engine, enforcement wrapper, and post-decision hooks.
//! Keep each concern in a small sub-module to avoid large files and match arms.

pub mod engine;
pub mod enforce;
pub mod hooks;
pub mod model;
pub mod policy;
pub mod rules;

// Re-exports for a thin public surface
pub use enforce::Enforcement;
pub use engine::AccessEngine;
pub use hooks::{register_file_logger, register_post_decision, DecisionEvent, PostDecisionHook};
pub use model::{ActionRef, Decision, RuleOutcome, Verdict};
pub use policy::{AccessPolicy, AccessSpec};
pub use rules::{RuleFn, RuleRegistry};
