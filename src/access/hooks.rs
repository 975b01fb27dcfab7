//! Post-decision hook registry and audit sinks.
//! Hooks observe verdicts after the fact; they cannot veto — vetoing is
//! what rules are for. Emission is best-effort and must not panic.

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde::Serialize;
use std::io::Write;

use super::model::{ActionRef, Verdict};

#[derive(Debug, Clone, Serialize)]
pub struct DecisionEvent {
    pub subject: Option<String>,
    pub roles: Vec<String>,
    pub action: ActionRef,
    pub verdict: Verdict,
    pub reason: Option<String>,
    pub request_id: Option<String>,
}

pub trait PostDecisionHook: Send + Sync {
    fn on_decision(&self, _ev: &DecisionEvent) {}
}

#[derive(Default)]
struct HookRegistry {
    post_decision: Vec<Box<dyn PostDecisionHook>>,
}

// Global registry (process-local); populated at startup, read per decision.
static REG: Lazy<RwLock<HookRegistry>> = Lazy::new(|| RwLock::new(HookRegistry::default()));

pub fn register_post_decision(h: Box<dyn PostDecisionHook>) {
    REG.write().post_decision.push(h);
}

pub fn emit_post_decision(ev: &DecisionEvent) {
    for h in REG.read().post_decision.iter() {
        // Best-effort; hook implementors handle their own errors internally
        h.on_decision(ev);
    }
}

// --- Simple file logger sink for audit events ---

struct FileLogger {
    path: String,
}

impl PostDecisionHook for FileLogger {
    fn on_decision(&self, ev: &DecisionEvent) {
        // Write a compact JSON line; ignore errors
        let ts = chrono::Utc::now().timestamp_millis();
        let obj = serde_json::json!({
            "ts": ts,
            "subject": ev.subject,
            "roles": ev.roles,
            "action": ev.action.as_str(),
            "verdict": ev.verdict,
            "reason": ev.reason,
            "request_id": ev.request_id,
        });
        if let Ok(mut f) = std::fs::OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(&mut f, "{}", obj);
        }
    }
}

/// Convenience: register a file logger sink to capture decision audit lines.
pub fn register_file_logger(path: &str) {
    register_post_decision(Box::new(FileLogger { path: path.to_string() }));
}
