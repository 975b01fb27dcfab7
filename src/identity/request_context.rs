use uuid::Uuid;

use super::{Identity, Principal};

/// Per-call, read-only request context handed to the dispatcher.
/// `principal: None` means the caller is absent (never logged in);
/// the engine denies such requests before touching rules or roles.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub principal: Option<Principal>,
    pub request_id: Option<String>,
}

impl RequestContext {
    /// Context for an absent caller, tagged with a fresh request id.
    pub fn anonymous() -> Self {
        Self { principal: None, request_id: Some(fresh_request_id()) }
    }

    /// Context for an authenticated principal, tagged with a fresh request id.
    pub fn for_principal(principal: Principal) -> Self {
        Self { principal: Some(principal), request_id: Some(fresh_request_id()) }
    }

    /// Propagate an upstream request id instead of minting one.
    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    /// The caller as the engine's identity boundary sees it.
    pub fn identity(&self) -> Option<&dyn Identity> {
        self.principal.as_ref().map(|p| p as &dyn Identity)
    }
}

/// Random v4 request id. Upstream ids are accepted as-is via
/// [`RequestContext::with_request_id`]; this is only the fallback mint.
pub fn fresh_request_id() -> String {
    Uuid::new_v4().to_string()
}
