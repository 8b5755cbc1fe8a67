use std::collections::HashMap;

use toolguard_core::error::Result;
use toolguard_core::{GuardNote, ToolPlan};

use crate::config::{EmptyAllowlist, GuardConfig};

use super::allowlist::{compile_patterns, is_tool_allowed, ToolPattern};

/// Tool ids (and namespaces) that mutate external state.
const WRITE_RISK_TOOLS: &[&str] = &[
    "shell",
    "fs.write",
    "fs.delete",
    "fs.move",
    "gmail.send",
    "gmail.delete",
    "email.send",
    "calendar.create",
    "calendar.update",
    "calendar.delete",
    "http.post",
    "http.put",
    "http.delete",
];

/// Exact match or namespace match (`shell` covers `shell.exec`).
///
/// Fixed classification; independent of any allow-list.
pub fn requires_write_permission(tool_id: &str) -> bool {
    WRITE_RISK_TOOLS.iter().any(|w| {
        tool_id == *w
            || tool_id
                .strip_prefix(w)
                .is_some_and(|rest| rest.starts_with('.'))
    })
}

/// Allow-list filter over plan steps.
/// Construct once from config, then share via Arc.
#[derive(Debug)]
pub struct PermissionGate {
    default_rules: Vec<ToolPattern>,
    principal_rules: HashMap<String, Vec<ToolPattern>>,
    empty_allowlist: EmptyAllowlist,
}

impl PermissionGate {
    pub fn new(cfg: &GuardConfig) -> Result<Self> {
        let default_rules = compile_patterns(&cfg.allowed_tools)?;

        let mut principal_rules = HashMap::new();
        for p in &cfg.permissions.principals {
            principal_rules.insert(p.id.clone(), compile_patterns(&p.allowed_tools)?);
        }

        Ok(Self {
            default_rules,
            principal_rules,
            empty_allowlist: cfg.permissions.empty_allowlist,
        })
    }

    /// Gate with a single allow-list for everyone.
    pub fn from_patterns(raw: &[String], empty_allowlist: EmptyAllowlist) -> Result<Self> {
        Ok(Self {
            default_rules: compile_patterns(raw)?,
            principal_rules: HashMap::new(),
            empty_allowlist,
        })
    }

    fn rules_for(&self, principal: &str) -> &[ToolPattern] {
        self.principal_rules
            .get(principal)
            .map(Vec::as_slice)
            .unwrap_or(&self.default_rules)
    }

    /// Pure predicate for a single tool id.
    pub fn is_allowed(&self, principal: &str, tool_id: &str) -> bool {
        let rules = self.rules_for(principal);
        if rules.is_empty() {
            return self.empty_allowlist == EmptyAllowlist::Open;
        }
        is_tool_allowed(rules, tool_id)
    }

    /// Remove steps whose tool is not permitted for `principal`.
    ///
    /// Blocked ids land in the plan's notes; nothing is raised.
    pub fn filter(&self, mut plan: ToolPlan, principal: &str) -> ToolPlan {
        plan.drop_malformed();

        let rules = self.rules_for(principal);
        if rules.is_empty() && self.empty_allowlist == EmptyAllowlist::Open {
            tracing::debug!(%principal, "allow-list empty, gate open");
            return plan;
        }

        let removed = plan.retain_steps(|s| self.is_allowed(principal, &s.tool_id));
        for step in removed {
            tracing::info!(%principal, tool_id = %step.tool_id, "tool blocked by allow-list");
            plan.record(GuardNote::Blocked {
                tool_id: step.tool_id,
            });
        }
        plan
    }
}
