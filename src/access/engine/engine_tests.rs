use super::*;
use crate::access::model::Verdict;
use crate::identity::{Guest, Principal};
use anyhow::anyhow;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn engine() -> AccessEngine {
    AccessEngine::new(RuleRegistry::new())
}

fn policy_roles(required: &[&str], allowed: &[&str]) -> AccessPolicy {
    AccessPolicy::new(
        vec![],
        required.iter().map(|s| s.to_string()).collect(),
        allowed.iter().map(|s| s.to_string()).collect(),
        "denied",
    )
    .unwrap()
}

fn user(roles: &[&str]) -> Principal {
    Principal::new("u1", roles.iter().map(|s| s.to_string()).collect())
}

const ACTION: &str = "post/edit";

#[test]
fn absent_principal_is_denied_before_anything_runs() {
    let eng = engine();
    // A deciding rule that would allow is never consulted for an absent caller.
    eng.rules().register("boom", |_a, _r| panic!("rule must not run"));
    let p = AccessPolicy::new(vec!["boom".into()], vec![], vec![], "denied").unwrap();
    let d = eng.decide(&p, &ACTION.into(), None).unwrap();
    assert_eq!(d.verdict, Verdict::Deny);
    assert_eq!(d.reason.as_deref(), Some("no_principal"));
}

#[test]
fn unauthenticated_identity_is_denied_like_absent() {
    let eng = engine();
    let p = policy_roles(&[], &["editor"]);
    let d = eng.decide(&p, &ACTION.into(), Some(&Guest)).unwrap();
    assert_eq!(d.verdict, Verdict::Deny);
    assert_eq!(d.reason.as_deref(), Some("no_principal"));
}

#[test]
fn rule_allow_short_circuits_and_skips_roles() {
    let eng = engine();
    let calls = Arc::new(AtomicUsize::new(0));
    let c1 = calls.clone();
    eng.rules().register("first", move |_a, _r| {
        c1.fetch_add(1, Ordering::SeqCst);
        Ok(RuleOutcome::Allow)
    });
    let c2 = calls.clone();
    eng.rules().register("second", move |_a, _r| {
        c2.fetch_add(1, Ordering::SeqCst);
        Ok(RuleOutcome::Deny)
    });
    // Role gates would deny (user holds none of these), but the rule wins.
    let p = AccessPolicy::new(
        vec!["first".into(), "second".into()],
        vec!["admin".into()],
        vec![],
        "denied",
    )
    .unwrap();
    let who = user(&[]);
    let d = eng.decide(&p, &ACTION.into(), Some(&who)).unwrap();
    assert_eq!(d.verdict, Verdict::Allow);
    assert_eq!(d.reason.as_deref(), Some("rule_allow:first"));
    // Invocation stopped at the deciding rule.
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn rule_deny_short_circuits() {
    let eng = engine();
    let calls = Arc::new(AtomicUsize::new(0));
    let c = calls.clone();
    eng.rules().register("veto", move |_a, _r| {
        c.fetch_add(1, Ordering::SeqCst);
        Ok(RuleOutcome::Deny)
    });
    eng.rules().register("never", |_a, _r| panic!("must not be reached"));
    // User holds the required role; the deny rule still wins.
    let p = AccessPolicy::new(
        vec!["veto".into(), "never".into()],
        vec!["admin".into()],
        vec![],
        "denied",
    )
    .unwrap();
    let who = user(&["admin"]);
    let d = eng.decide(&p, &ACTION.into(), Some(&who)).unwrap();
    assert_eq!(d.verdict, Verdict::Deny);
    assert_eq!(d.reason.as_deref(), Some("rule_deny:veto"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn all_continue_with_no_role_constraints_is_open_access() {
    let eng = engine();
    eng.rules().register("shrug_a", |_a, _r| Ok(RuleOutcome::Continue));
    eng.rules().register("shrug_b", |_a, _r| Ok(RuleOutcome::Continue));
    let p = AccessPolicy::new(vec!["shrug_a".into(), "shrug_b".into()], vec![], vec![], "denied")
        .unwrap();
    let who = user(&[]);
    let d = eng.decide(&p, &ACTION.into(), Some(&who)).unwrap();
    assert_eq!(d.verdict, Verdict::Allow);
    assert_eq!(d.reason.as_deref(), Some("open_access"));
}

#[test]
fn rules_see_the_action_and_the_callers_roles() {
    let eng = engine();
    eng.rules().register("owner_check", |action, roles| {
        assert_eq!(action.as_str(), ACTION);
        Ok(if roles.iter().any(|r| r == "owner") { RuleOutcome::Allow } else { RuleOutcome::Continue })
    });
    let p = AccessPolicy::new(vec!["owner_check".into()], vec![], vec!["editor".into()], "denied")
        .unwrap();

    let owner = user(&["owner"]);
    let d = eng.decide(&p, &ACTION.into(), Some(&owner)).unwrap();
    assert_eq!(d.reason.as_deref(), Some("rule_allow:owner_check"));

    // Not the owner: rule continues, allowed-roles gate decides.
    let stranger = user(&["viewer"]);
    let d = eng.decide(&p, &ACTION.into(), Some(&stranger)).unwrap();
    assert_eq!(d.verdict, Verdict::Deny);
    assert_eq!(d.reason.as_deref(), Some("no_allowed_role"));
}

#[test]
fn required_only_is_an_and_gate() {
    let eng = engine();
    let p = policy_roles(&["admin"], &[]);

    let d = eng.decide(&p, &ACTION.into(), Some(&user(&["admin", "editor"]))).unwrap();
    assert_eq!(d.verdict, Verdict::Allow);
    assert_eq!(d.reason.as_deref(), Some("required_roles_met"));

    let d = eng.decide(&p, &ACTION.into(), Some(&user(&["editor"]))).unwrap();
    assert_eq!(d.verdict, Verdict::Deny);
    assert_eq!(d.reason.as_deref(), Some("missing_required_role"));
}

#[test]
fn allowed_only_is_an_or_gate() {
    let eng = engine();
    let p = policy_roles(&[], &["editor", "writer"]);

    let d = eng.decide(&p, &ACTION.into(), Some(&user(&["writer"]))).unwrap();
    assert_eq!(d.verdict, Verdict::Allow);
    assert_eq!(d.reason.as_deref(), Some("role_allowed"));

    let d = eng.decide(&p, &ACTION.into(), Some(&user(&[]))).unwrap();
    assert_eq!(d.verdict, Verdict::Deny);
    assert_eq!(d.reason.as_deref(), Some("no_allowed_role"));
}

#[test]
fn combined_required_and_allowed() {
    let eng = engine();
    let p = policy_roles(&["admin"], &["editor", "writer"]);

    // Required satisfied and an allowed role held.
    let d = eng.decide(&p, &ACTION.into(), Some(&user(&["admin", "editor"]))).unwrap();
    assert_eq!(d.verdict, Verdict::Allow);

    // Required satisfied but no allowed role present.
    let d = eng.decide(&p, &ACTION.into(), Some(&user(&["admin"]))).unwrap();
    assert_eq!(d.verdict, Verdict::Deny);
    assert_eq!(d.reason.as_deref(), Some("no_allowed_role"));

    // Required missing short-circuits before the allowed check.
    let d = eng.decide(&p, &ACTION.into(), Some(&user(&["editor"]))).unwrap();
    assert_eq!(d.verdict, Verdict::Deny);
    assert_eq!(d.reason.as_deref(), Some("missing_required_role"));
}

#[test]
fn multiple_required_roles_all_must_hold() {
    let eng = engine();
    let p = policy_roles(&["admin", "auditor"], &[]);
    assert!(eng.can_visit(&p, &ACTION.into(), Some(&user(&["admin", "auditor"]))).unwrap());
    assert!(!eng.can_visit(&p, &ACTION.into(), Some(&user(&["admin"]))).unwrap());
}

#[test]
fn rule_failure_propagates_instead_of_deciding() {
    let eng = engine();
    eng.rules().register("flaky", |_a, _r| Err(anyhow!("backend unavailable")));
    let p = AccessPolicy::new(vec!["flaky".into()], vec![], vec![], "denied").unwrap();
    let who = user(&["admin"]);
    let err = eng.decide(&p, &ACTION.into(), Some(&who)).unwrap_err();
    assert!(err.to_string().contains("backend unavailable"));
}

#[test]
fn can_visit_is_idempotent() {
    let eng = engine();
    let count = Arc::new(AtomicUsize::new(0));
    let c = count.clone();
    eng.rules().register("counted", move |_a, roles| {
        c.fetch_add(1, Ordering::SeqCst);
        Ok(if roles.iter().any(|r| r == "admin") { RuleOutcome::Allow } else { RuleOutcome::Continue })
    });
    let p = AccessPolicy::new(vec!["counted".into()], vec![], vec![], "denied").unwrap();
    let who = user(&["admin"]);
    let first = eng.can_visit(&p, &ACTION.into(), Some(&who)).unwrap();
    let second = eng.can_visit(&p, &ACTION.into(), Some(&who)).unwrap();
    assert!(first && second, "identical inputs, identical answers");
    // Two probes, two fresh evaluations: nothing is cached between calls.
    assert_eq!(count.load(Ordering::SeqCst), 2);
}

#[test]
fn single_rule_invoked_exactly_once_for_allow() {
    // Scenario from the drawing board: one rule, returns ALLOW for an admin.
    let eng = engine();
    let count = Arc::new(AtomicUsize::new(0));
    let c = count.clone();
    eng.rules().register_raw("assertCanEdit", move |_a, roles| {
        c.fetch_add(1, Ordering::SeqCst);
        Ok(if roles.iter().any(|r| r == "admin") { "ALLOW".into() } else { "DENY".into() })
    });
    let p = AccessPolicy::new(vec!["assertCanEdit".into()], vec![], vec![], "denied").unwrap();
    let who = user(&["admin"]);
    let d = eng.decide(&p, &ACTION.into(), Some(&who)).unwrap();
    assert_eq!(d.verdict, Verdict::Allow);
    assert_eq!(count.load(Ordering::SeqCst), 1);
}
