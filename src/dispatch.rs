//! Host dispatcher boundary: action registry, guarded registration, wiring
//! validation, and the detach-on-deny dispatch loop.
//!
//! Registration is the configuration phase — policies are validated, rule
//! names resolved, and denial targets checked here, so per-request dispatch
//! only ever sees well-formed wiring. On a denial the current action is
//! aborted and the policy's denial target runs instead; the original action
//! never resumes.

use anyhow::Result;
use parking_lot::Mutex;
use serde_json::Value;
use std::{collections::HashMap, sync::Arc};
use tracing::{debug, info};

use crate::access::{AccessEngine, AccessPolicy, AccessSpec, ActionRef, Enforcement};
use crate::error::{AccessResult, ConfigError};
use crate::identity::RequestContext;

/// An action handler. Handlers return a JSON value so frontends can shape
/// responses however they like; the dispatcher adds nothing to the payload.
pub type ActionFn = Arc<dyn Fn(&RequestContext) -> Result<Value> + Send + Sync>;

#[derive(Clone, Default)]
pub struct ActionRegistry {
    inner: Arc<Mutex<HashMap<String, ActionFn>>>, // name -> handler
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&self, name: impl Into<String>, f: F) -> AccessResult<()>
    where
        F: Fn(&RequestContext) -> Result<Value> + Send + Sync + 'static,
    {
        let name = name.into();
        let mut m = self.inner.lock();
        if m.contains_key(&name) {
            return Err(ConfigError::DuplicateAction { name });
        }
        m.insert(name, Arc::new(f));
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.lock().contains_key(name)
    }

    /// Resolve a handler by name; the lock is not held once the handle is out.
    pub fn resolve(&self, name: &str) -> AccessResult<ActionFn> {
        self.inner
            .lock()
            .get(name)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownAction { name: name.to_string() })
    }

    /// Registered action names, sorted for stable listings.
    pub fn names(&self) -> Vec<String> {
        let mut out: Vec<String> = self.inner.lock().keys().cloned().collect();
        out.sort();
        out
    }
}

pub struct Dispatcher {
    engine: AccessEngine,
    actions: ActionRegistry,
    policies: Arc<Mutex<HashMap<String, Arc<AccessPolicy>>>>, // action name -> policy
}

impl Dispatcher {
    pub fn new(engine: AccessEngine) -> Self {
        Self { engine, actions: ActionRegistry::new(), policies: Arc::new(Mutex::new(HashMap::new())) }
    }

    pub fn engine(&self) -> &AccessEngine {
        &self.engine
    }

    pub fn actions(&self) -> &ActionRegistry {
        &self.actions
    }

    /// Register an unguarded action: no policy, always runs.
    pub fn register_action<F>(&self, name: impl Into<String>, f: F) -> AccessResult<()>
    where
        F: Fn(&RequestContext) -> Result<Value> + Send + Sync + 'static,
    {
        self.actions.register(name, f)
    }

    /// Register an action together with its declarative policy.
    ///
    /// The spec is validated into a policy and every rule name it declares
    /// is resolved against the rule registry — an unknown rule fails the
    /// registration, not a later request.
    pub fn register_guarded<F>(&self, name: impl Into<String>, spec: AccessSpec, f: F) -> AccessResult<()>
    where
        F: Fn(&RequestContext) -> Result<Value> + Send + Sync + 'static,
    {
        let name = name.into();
        let policy = AccessPolicy::from_spec(spec)?;
        for rule in policy.rules() {
            // Resolve for the fail-fast check only; the handle is discarded.
            self.engine.rules().resolve(rule)?;
        }
        self.actions.register(name.clone(), f)?;
        self.policies.lock().insert(name, Arc::new(policy));
        Ok(())
    }

    /// Startup check, run after all registration: every denial target must
    /// resolve to a registered action so the detach always has somewhere to
    /// land. Call before traffic flows.
    pub fn validate_wiring(&self) -> AccessResult<()> {
        let policies = self.policies.lock();
        for policy in policies.values() {
            let target = policy.denial_target();
            if !self.actions.contains(target.as_str()) {
                return Err(ConfigError::UnknownAction { name: target.as_str().to_string() });
            }
        }
        info!(
            target: "actionguard",
            actions = self.actions.names().len(),
            guarded = policies.len(),
            "wiring validated"
        );
        Ok(())
    }

    /// Dispatch one request. Guarded actions are enforced first; on denial
    /// the denial target handler runs in place of the protected one. Rule
    /// and handler failures surface as errors, untranslated.
    pub fn dispatch(&self, name: &str, ctx: &RequestContext) -> Result<Value> {
        let handler = self.actions.resolve(name)?;
        let policy = self.policies.lock().get(name).cloned();
        let Some(policy) = policy else {
            return handler(ctx);
        };
        let action = ActionRef::new(name);
        match self.engine.enforce(&policy, &action, ctx, || handler(ctx))? {
            Enforcement::Ran(v) => Ok(v),
            Enforcement::Detached(target) => {
                debug!(target: "actionguard", action = %action, fallback = %target, "detached");
                let fallback = self.actions.resolve(target.as_str())?;
                fallback(ctx)
            }
        }
    }
}
