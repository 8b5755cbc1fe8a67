#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use toolguard_pipeline::config::{self, EmptyAllowlist, OnStoreError};

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
rate_limits:
  per_minute: 60
  per_mintue: 10 # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "BAD_CONFIG");
}

#[test]
fn ok_minimal_config_uses_defaults() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.max_steps_per_turn, 10);
    assert!(cfg.allowed_tools.is_empty());
    assert_eq!(cfg.permissions.empty_allowlist, EmptyAllowlist::Open);
    assert_eq!(cfg.rate_limits.per_minute, 60);
    assert_eq!(cfg.rate_limits.per_hour, 300);
    assert_eq!(cfg.rate_limits.per_tool_per_minute, 10);
    assert_eq!(cfg.rate_limits.on_store_error, OnStoreError::Deny);
    assert_eq!(cfg.retry.max_retries, 3);
}

#[test]
fn full_config() {
    let ok = r#"
version: 1
max_steps_per_turn: 5
allowed_tools: ["fs.read", "gmail.*"]
permissions:
  empty_allowlist: closed
  principals:
    - id: "user:ops"
      allowed_tools: ["shell"]
rate_limits:
  per_minute: 30
  per_hour: 100
  per_tool_per_minute: 5
  on_store_error: allow
retry:
  max_retries: 2
redaction:
  extra_patterns: ["internal-[0-9]+"]
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.max_steps_per_turn, 5);
    assert_eq!(cfg.allowed_tools, ["fs.read", "gmail.*"]);
    assert_eq!(cfg.permissions.empty_allowlist, EmptyAllowlist::Closed);
    assert_eq!(cfg.permissions.principals[0].id, "user:ops");
    assert_eq!(cfg.rate_limits.on_store_error, OnStoreError::Allow);
    assert_eq!(cfg.retry.max_retries, 2);
    assert_eq!(cfg.redaction.extra_patterns.len(), 1);
}

#[test]
fn rejects_wrong_version() {
    let err = config::load_from_str("version: 2\n").expect_err("must fail");
    assert_eq!(err.code().as_str(), "UNSUPPORTED_VERSION");
}

#[test]
fn rejects_out_of_range_values() {
    for bad in [
        "version: 1\nmax_steps_per_turn: 0\n",
        "version: 1\nrate_limits: { per_minute: 0 }\n",
        "version: 1\nrate_limits: { per_minute: 100, per_hour: 50 }\n",
        "version: 1\nretry: { max_retries: 11 }\n",
        "version: 1\npermissions: { principals: [ { id: \"a\", allowed_tools: [] }, { id: \"a\", allowed_tools: [] } ] }\n",
    ] {
        let err = config::load_from_str(bad).expect_err(bad);
        assert_eq!(err.code().as_str(), "BAD_CONFIG", "config={bad}");
    }
}

#[test]
fn principal_override_must_list_its_tools() {
    let err =
        config::load_from_str("version: 1\npermissions: { principals: [ { id: \"user:ops\" } ] }\n")
            .expect_err("allowed_tools is required");
    assert_eq!(err.code().as_str(), "BAD_CONFIG");
    assert!(err.to_string().contains("allowed_tools"), "{err}");

    let cfg = config::load_from_str(
        "version: 1\npermissions: { principals: [ { id: \"user:ops\", allowed_tools: [\"shell\"] } ] }\n",
    )
    .unwrap();
    assert_eq!(cfg.permissions.principals[0].allowed_tools, vec!["shell".to_string()]);
}
