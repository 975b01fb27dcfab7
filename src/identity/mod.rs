//! Principal model and the identity-subsystem boundary.
//! Keep the public surface thin and split implementation across sub-modules.

mod principal;
mod request_context;

pub use principal::{Attrs, Guest, Identity, Principal};
pub use request_context::RequestContext;
