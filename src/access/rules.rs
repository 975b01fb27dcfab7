//! Named rule callbacks and their registry.
//!
//! Rules are registered once at startup under stable names; policies refer
//! to them by name and are checked against the registry when they are bound,
//! so an unknown rule name is a registration error rather than a request-time
//! surprise. Invocation clones the callback handle out of the lock first —
//! no lock is held while a rule runs, however long it blocks.

use anyhow::Result;
use parking_lot::Mutex;
use std::{collections::HashMap, sync::Arc};

use crate::error::{AccessResult, ConfigError};

use super::model::{ActionRef, RuleOutcome};

/// A rule callback: inspects the action and the caller's roles, produces an
/// outcome, or fails. Failures propagate to the dispatcher untranslated —
/// a broken rule must not silently degrade to allow or deny.
pub type RuleFn = Arc<dyn Fn(&ActionRef, &[String]) -> Result<RuleOutcome> + Send + Sync>;

#[derive(Clone, Default)]
pub struct RuleRegistry {
    inner: Arc<Mutex<HashMap<String, RuleFn>>>, // name -> callback
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a typed rule callback under a name. Re-registering a name
    /// replaces the previous callback (last write wins, as with any
    /// startup-time table).
    pub fn register<F>(&self, name: impl Into<String>, f: F)
    where
        F: Fn(&ActionRef, &[String]) -> Result<RuleOutcome> + Send + Sync + 'static,
    {
        self.inner.lock().insert(name.into(), Arc::new(f));
    }

    /// Adapt a loosely-typed callback that yields a raw outcome string.
    /// `"ALLOW"`/`"DENY"` decide; anything else continues.
    pub fn register_raw<F>(&self, name: impl Into<String>, f: F)
    where
        F: Fn(&ActionRef, &[String]) -> Result<String> + Send + Sync + 'static,
    {
        self.register(name, move |action, roles| {
            Ok(RuleOutcome::from_raw(&f(action, roles)?))
        });
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.lock().contains_key(name)
    }

    /// Resolve a rule by name, failing fast on unknown names. Used when a
    /// policy is bound so misconfiguration is caught before traffic flows.
    pub fn resolve(&self, name: &str) -> AccessResult<RuleFn> {
        self.inner
            .lock()
            .get(name)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownRule { name: name.to_string() })
    }

    /// Invoke a named rule. The registry lock is released before the
    /// callback runs.
    pub fn invoke(&self, name: &str, action: &ActionRef, roles: &[String]) -> Result<RuleOutcome> {
        let f = self.resolve(name)?;
        f(action, roles)
    }

    /// Registered rule names, sorted for stable listings.
    pub fn names(&self) -> Vec<String> {
        let mut out: Vec<String> = self.inner.lock().keys().cloned().collect();
        out.sort();
        out
    }
}
