//! Configuration-time error model.
//! Everything here is raised while an action and its policy are being
//! registered or wired; nothing on the per-request path produces these.
//! A request that should not proceed gets a deny verdict, not an error.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConfigError {
    /// Policy declares no rules, no required roles, and no allowed roles.
    #[error("policy declares no rules, required roles, or allowed roles")]
    MissingConstraint,
    /// Policy has no denial target to detach to.
    #[error("policy has no denial target")]
    MissingDenialTarget,
    /// A policy names a rule that was never registered.
    #[error("unknown rule '{name}'")]
    UnknownRule { name: String },
    /// An action name (or denial target) does not resolve in the registry.
    #[error("unknown action '{name}'")]
    UnknownAction { name: String },
    /// An action name was registered twice.
    #[error("action '{name}' is already registered")]
    DuplicateAction { name: String },
}

impl ConfigError {
    /// Stable snake_case code for logs and audit sinks.
    pub fn code_str(&self) -> &'static str {
        match self {
            ConfigError::MissingConstraint => "missing_constraint",
            ConfigError::MissingDenialTarget => "missing_denial_target",
            ConfigError::UnknownRule { .. } => "unknown_rule",
            ConfigError::UnknownAction { .. } => "unknown_action",
            ConfigError::DuplicateAction { .. } => "duplicate_action",
        }
    }
}

pub type AccessResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_mapping() {
        assert_eq!(ConfigError::MissingConstraint.code_str(), "missing_constraint");
        assert_eq!(ConfigError::MissingDenialTarget.code_str(), "missing_denial_target");
        assert_eq!(ConfigError::UnknownRule { name: "r".into() }.code_str(), "unknown_rule");
        assert_eq!(ConfigError::UnknownAction { name: "a".into() }.code_str(), "unknown_action");
        assert_eq!(ConfigError::DuplicateAction { name: "a".into() }.code_str(), "duplicate_action");
    }

    #[test]
    fn display_names_the_offender() {
        let e = ConfigError::UnknownRule { name: "assertCanEdit".into() };
        assert_eq!(e.to_string(), "unknown rule 'assertCanEdit'");
        let e = ConfigError::UnknownAction { name: "denied".into() };
        assert!(e.to_string().contains("denied"));
    }

    #[test]
    fn serde_tagging_round_trip() {
        let e = ConfigError::UnknownRule { name: "r1".into() };
        let j = serde_json::to_value(&e).unwrap();
        assert_eq!(j.get("type").and_then(|v| v.as_str()), Some("unknown_rule"));
        let back: ConfigError = serde_json::from_value(j).unwrap();
        assert_eq!(back, e);
    }
}
