//! Enforcement wrapper: run the protected action, or detach to the policy's
//! denial target. The detach is an explicit result the dispatcher acts on,
//! not a non-local jump out of this crate.

use anyhow::Result;
use tracing::debug;

use crate::identity::RequestContext;

use super::engine::AccessEngine;
use super::hooks::{self, DecisionEvent};
use super::model::ActionRef;
use super::policy::AccessPolicy;

/// What enforcement did with the protected action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Enforcement<T> {
    /// The action body ran; its output passes through unchanged.
    Ran(T),
    /// Denied. The caller must abort current handling and run the named
    /// fallback action instead; the original action never resumes.
    Detached(ActionRef),
}

impl<T> Enforcement<T> {
    pub fn ran(self) -> Option<T> {
        match self {
            Enforcement::Ran(v) => Some(v),
            Enforcement::Detached(_) => None,
        }
    }

    pub fn is_detached(&self) -> bool {
        matches!(self, Enforcement::Detached(_))
    }
}

impl AccessEngine {
    /// Gate `run` behind `policy` for the caller in `ctx`.
    ///
    /// On allow, invokes `run` and passes its output through with no added
    /// side effects. On deny, `run` is never invoked and the policy's denial
    /// target comes back as [`Enforcement::Detached`]. Rule failures and
    /// `run` failures both propagate unmodified.
    ///
    /// This is the effectful path: every verdict is emitted to the
    /// post-decision hooks, tagged with the context's request id.
    pub fn enforce<T>(
        &self,
        policy: &AccessPolicy,
        action: &ActionRef,
        ctx: &RequestContext,
        run: impl FnOnce() -> Result<T>,
    ) -> Result<Enforcement<T>> {
        let decision = self.decide(policy, action, ctx.identity())?;
        hooks::emit_post_decision(&DecisionEvent {
            subject: ctx.identity().and_then(|i| i.subject()),
            roles: ctx.identity().map(|i| i.roles()).unwrap_or_default(),
            action: action.clone(),
            verdict: decision.verdict,
            reason: decision.reason.clone(),
            request_id: ctx.request_id.clone(),
        });
        if decision.is_allow() {
            Ok(Enforcement::Ran(run()?))
        } else {
            debug!(
                target: "actionguard",
                action = %action,
                target = %policy.denial_target(),
                reason = decision.reason.as_deref().unwrap_or(""),
                "denied, detaching"
            );
            Ok(Enforcement::Detached(policy.denial_target().clone()))
        }
    }
}
