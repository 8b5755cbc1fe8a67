#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use toolguard_core::{GuardNote, PlanStep, ToolPlan};
use toolguard_pipeline::config::{self, EmptyAllowlist};
use toolguard_pipeline::policy::{requires_write_permission, PermissionGate};

fn gate(patterns: &[&str]) -> PermissionGate {
    let raw: Vec<String> = patterns.iter().map(|s| s.to_string()).collect();
    PermissionGate::from_patterns(&raw, EmptyAllowlist::Open).unwrap()
}

fn plan_of(ids: &[&str]) -> ToolPlan {
    ToolPlan::new(ids.iter().map(|id| PlanStep::bare(*id)).collect())
}

#[test]
fn empty_allowlist_fails_open() {
    let g = gate(&[]);
    for id in ["shell", "gmail.send", "anything.at.all"] {
        assert!(g.is_allowed("user:1", id));
    }
    let out = g.filter(plan_of(&["shell", "fs.write"]), "user:1");
    assert_eq!(out.len(), 2);
    assert!(out.notes().is_empty());
}

#[test]
fn empty_allowlist_closed_blocks_everything() {
    let g = PermissionGate::from_patterns(&[], EmptyAllowlist::Closed).unwrap();
    let out = g.filter(plan_of(&["shell", "fs.read"]), "user:1");
    assert!(out.is_empty());
    assert!(out.selected_tool_ids().is_empty());
}

#[test]
fn wildcard_namespace() {
    let g = gate(&["gmail.*"]);
    assert!(g.is_allowed("u", "gmail.send"));
    assert!(g.is_allowed("u", "gmail.list"));
    assert!(!g.is_allowed("u", "shell"));
    assert!(!g.is_allowed("u", "calendar.create"));
}

#[test]
fn pattern_order_does_not_matter() {
    let a = gate(&["fs.read", "gmail.*", "calendar.create"]);
    let b = gate(&["calendar.create", "gmail.*", "fs.read"]);
    for id in ["fs.read", "fs.write", "gmail.send", "calendar.create", "calendar.list", "shell"] {
        assert_eq!(a.is_allowed("u", id), b.is_allowed("u", id), "tool={id}");
    }
}

#[test]
fn blocked_tools_are_noted_not_raised() {
    let g = gate(&["fs.read"]);
    let out = g.filter(plan_of(&["fs.read", "shell", "fs.read", "gmail.send"]), "u");
    assert_eq!(out.len(), 2);
    assert_eq!(out.selected_tool_ids().iter().collect::<Vec<_>>(), ["fs.read"]);
    assert_eq!(
        out.notes(),
        [
            GuardNote::Blocked { tool_id: "shell".into() },
            GuardNote::Blocked { tool_id: "gmail.send".into() },
        ]
    );
}

#[test]
fn principal_overrides_default_allowlist() {
    let cfg = config::load_from_str(
        r#"
version: 1
allowed_tools: ["fs.read"]
permissions:
  principals:
    - id: "user:ops"
      allowed_tools: ["shell", "fs.*"]
"#,
    )
    .unwrap();
    let g = PermissionGate::new(&cfg).unwrap();

    assert!(g.is_allowed("user:ops", "shell"));
    assert!(g.is_allowed("user:ops", "fs.write"));
    assert!(!g.is_allowed("user:other", "shell"));
    assert!(g.is_allowed("user:other", "fs.read"));
}

#[test]
fn invalid_pattern_is_a_config_error() {
    let err = PermissionGate::from_patterns(&["gm*il".to_string()], EmptyAllowlist::Open)
        .expect_err("must fail");
    assert_eq!(err.code().as_str(), "INVALID_PATTERN");
}

#[test]
fn write_permission_classifier() {
    assert!(requires_write_permission("shell"));
    assert!(requires_write_permission("shell.exec"));
    assert!(requires_write_permission("fs.write"));
    assert!(requires_write_permission("gmail.send"));
    assert!(!requires_write_permission("fs.read"));
    assert!(!requires_write_permission("gmail.list"));
    assert!(!requires_write_permission("shellfish"));
}

#[test]
fn write_classifier_ignores_allowlist() {
    let g = gate(&["shell"]);
    assert!(g.is_allowed("u", "shell"));
    assert!(requires_write_permission("shell"));
}
