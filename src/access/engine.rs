//! The decision engine: ordered rule chain first, static role gates second.
//! Each decision is stateless and request-scoped; policies are shared
//! read-only and the registry handle is cheap to clone.

use anyhow::Result;
use tracing::debug;

use crate::identity::Identity;

use super::model::{ActionRef, Decision, RuleOutcome};
use super::policy::AccessPolicy;
use super::rules::RuleRegistry;

#[derive(Clone, Default)]
pub struct AccessEngine {
    rules: RuleRegistry,
}

impl AccessEngine {
    pub fn new(rules: RuleRegistry) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RuleRegistry {
        &self.rules
    }

    /// Decide whether `who` may run `action` under `policy`.
    ///
    /// Rules always take priority over role checks: a rule that allows or
    /// denies short-circuits the chain and the role gates never run. A rule
    /// invocation failure propagates unmodified; it is never folded into a
    /// verdict.
    ///
    /// Note the deliberate open default: if every rule continues and the
    /// policy declares no role constraints, the verdict is allow. The
    /// `"open_access"` reason makes that case visible in audit output.
    pub fn decide(
        &self,
        policy: &AccessPolicy,
        action: &ActionRef,
        who: Option<&dyn Identity>,
    ) -> Result<Decision> {
        let Some(who) = who else {
            return Ok(Decision::deny("no_principal"));
        };
        if !who.is_authenticated() {
            return Ok(Decision::deny("no_principal"));
        }
        // Resolved once per decision; read-only from here on.
        let roles = who.roles();

        for name in policy.rules() {
            match self.rules.invoke(name, action, &roles)? {
                RuleOutcome::Allow => {
                    debug!(target: "actionguard", action = %action, rule = %name, "rule allowed");
                    return Ok(Decision::allow(format!("rule_allow:{name}")));
                }
                RuleOutcome::Deny => {
                    debug!(target: "actionguard", action = %action, rule = %name, "rule denied");
                    return Ok(Decision::deny(format!("rule_deny:{name}")));
                }
                RuleOutcome::Continue => {}
            }
        }

        let decision = role_gates(policy, &roles);
        debug!(
            target: "actionguard",
            action = %action,
            verdict = ?decision.verdict,
            reason = decision.reason.as_deref().unwrap_or(""),
            "role gates decided"
        );
        Ok(decision)
    }

    /// Side-effect-free probe: would `decide` allow? No hooks fire, nothing
    /// is recorded; calling it twice with the same inputs yields the same
    /// answer.
    pub fn can_visit(
        &self,
        policy: &AccessPolicy,
        action: &ActionRef,
        who: Option<&dyn Identity>,
    ) -> Result<bool> {
        Ok(self.decide(policy, action, who)?.is_allow())
    }
}

/// Static role checks, reached only when no rule decided.
/// Required roles are an AND-gate; allowed roles an OR-gate applied after
/// the required gate passes.
fn role_gates(policy: &AccessPolicy, roles: &[String]) -> Decision {
    let required = policy.required_roles();
    let allowed = policy.allowed_roles();

    if required.is_empty() && allowed.is_empty() {
        return Decision::allow("open_access");
    }
    for need in required {
        if !roles.iter().any(|r| r == need) {
            return Decision::deny("missing_required_role");
        }
    }
    if !allowed.is_empty() {
        if roles.iter().any(|r| allowed.contains(r)) {
            Decision::allow("role_allowed")
        } else {
            Decision::deny("no_allowed_role")
        }
    } else {
        Decision::allow("required_roles_met")
    }
}

#[cfg(test)]
mod engine_tests;
