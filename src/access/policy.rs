//! Declarative per-action access policy and its construction-time validator.
//! A policy is validated eagerly when the action is registered and is
//! immutable afterwards; concurrent readers share it without locking.

use serde::{Deserialize, Serialize};

use crate::error::{AccessResult, ConfigError};

use super::model::ActionRef;

/// Raw attribute data as supplied by the declarative policy source.
/// Field-for-field what an action declares about itself; nothing here is
/// checked until it is assembled into an [`AccessPolicy`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessSpec {
    /// Rule names, evaluated in declared order before any role check.
    #[serde(default)]
    pub rules: Vec<String>,
    /// Roles the caller must ALL hold (AND-gate).
    #[serde(default)]
    pub required_roles: Vec<String>,
    /// Roles of which the caller must hold at least one (OR-gate),
    /// checked only after the required roles pass.
    #[serde(default)]
    pub allowed_roles: Vec<String>,
    /// Action to detach to on denial.
    #[serde(default)]
    pub denial_target: String,
}

/// Validated, immutable policy attached to one action.
///
/// Only constructible through [`AccessPolicy::new`] / [`AccessPolicy::from_spec`],
/// which run the validator; deliberately not deserializable so an unvalidated
/// policy cannot enter the system through serde.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AccessPolicy {
    rules: Vec<String>,
    required_roles: Vec<String>,
    allowed_roles: Vec<String>,
    denial_target: ActionRef,
}

impl AccessPolicy {
    /// Assemble and validate a policy from raw attribute data.
    pub fn from_spec(spec: AccessSpec) -> AccessResult<Self> {
        Self::new(spec.rules, spec.required_roles, spec.allowed_roles, spec.denial_target)
    }

    /// Validate and build. Rule order is caller-declared and preserved
    /// verbatim: no sorting, no deduplication.
    pub fn new(
        rules: Vec<String>,
        required_roles: Vec<String>,
        allowed_roles: Vec<String>,
        denial_target: impl Into<String>,
    ) -> AccessResult<Self> {
        let denial_target = denial_target.into();
        if rules.is_empty() && required_roles.is_empty() && allowed_roles.is_empty() {
            return Err(ConfigError::MissingConstraint);
        }
        if denial_target.trim().is_empty() {
            return Err(ConfigError::MissingDenialTarget);
        }
        Ok(Self { rules, required_roles, allowed_roles, denial_target: ActionRef(denial_target) })
    }

    pub fn rules(&self) -> &[String] {
        &self.rules
    }

    pub fn required_roles(&self) -> &[String] {
        &self.required_roles
    }

    pub fn allowed_roles(&self) -> &[String] {
        &self.allowed_roles
    }

    pub fn denial_target(&self) -> &ActionRef {
        &self.denial_target
    }
}
