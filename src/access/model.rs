use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of a dispatchable action. Denial targets are actions too.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ActionRef(pub String);

impl ActionRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ActionRef {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Outcome of a single rule in the chain. `Continue` never escapes the
/// engine; it only means "next rule, or fall through to role checks".
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RuleOutcome {
    Allow,
    Deny,
    Continue,
}

impl RuleOutcome {
    /// Forgiving mapping from a loosely-typed rule return. Exactly
    /// `"ALLOW"` and `"DENY"` decide; any other value — an explicit
    /// continue sentinel, an empty string, garbage — means continue.
    pub fn from_raw(raw: &str) -> Self {
        match raw {
            "ALLOW" => RuleOutcome::Allow,
            "DENY" => RuleOutcome::Deny,
            _ => RuleOutcome::Continue,
        }
    }
}

/// The engine's final word on one request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Allow,
    Deny,
}

/// Verdict plus a snake_case reason for logs and audit sinks.
/// Reasons are labels, never parsed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Decision {
    pub verdict: Verdict,
    pub reason: Option<String>,
}

impl Decision {
    pub fn allow(reason: impl Into<String>) -> Self {
        Self { verdict: Verdict::Allow, reason: Some(reason.into()) }
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        Self { verdict: Verdict::Deny, reason: Some(reason.into()) }
    }

    pub fn is_allow(&self) -> bool {
        self.verdict == Verdict::Allow
    }
}
