use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attrs {
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub device_id: Option<String>,
}

/// An authenticated caller as supplied by the identity subsystem.
/// The role list is resolved once at login/session time and is read-only
/// for the duration of any decision.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Principal {
    pub user_id: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub attrs: Attrs,
}

impl Principal {
    pub fn new(user_id: impl Into<String>, roles: Vec<String>) -> Self {
        Self { user_id: user_id.into(), roles, attrs: Attrs::default() }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// Inbound identity contract consumed by the decision engine.
///
/// Role support is optional: a caller type that does not declare roles
/// inherits the default empty set, which is treated as "no roles held",
/// never as an error.
pub trait Identity {
    fn is_authenticated(&self) -> bool {
        true
    }

    /// Stable subject identifier for audit sinks, when one exists.
    fn subject(&self) -> Option<String> {
        None
    }

    /// Role names held by the caller.
    fn roles(&self) -> Vec<String> {
        Vec::new()
    }
}

impl Identity for Principal {
    fn subject(&self) -> Option<String> {
        Some(self.user_id.clone())
    }

    fn roles(&self) -> Vec<String> {
        self.roles.clone()
    }
}

/// A present but unauthenticated caller. Always denied by the engine,
/// exactly like an absent principal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Guest;

impl Identity for Guest {
    fn is_authenticated(&self) -> bool {
        false
    }
}
