//! Allow-list compilation and matching utilities.
//!
//! Supports exact tool ids (`shell`) and namespace wildcards (`gmail.*`).

use toolguard_core::error::{GuardError, Result};

/// Compiled allow-list rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolPattern {
    Exact(String),
    /// Stored with its trailing dot: `gmail.*` => `gmail.`.
    Prefix(String),
}

impl ToolPattern {
    pub fn matches(&self, tool_id: &str) -> bool {
        match self {
            ToolPattern::Exact(id) => id == tool_id,
            ToolPattern::Prefix(p) => tool_id.starts_with(p.as_str()),
        }
    }
}

pub fn compile_pattern(raw: &str) -> Result<ToolPattern> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(GuardError::InvalidPattern("empty allow-list entry".into()));
    }

    // format: "tool.id" or "prefix.*"
    match s.strip_suffix(".*") {
        Some(prefix) => {
            if prefix.is_empty() || prefix.contains('*') {
                return Err(GuardError::InvalidPattern(format!(
                    "invalid allow-list entry: {raw} (expected prefix.*)"
                )));
            }
            Ok(ToolPattern::Prefix(format!("{prefix}.")))
        }
        None if s.contains('*') => Err(GuardError::InvalidPattern(format!(
            "invalid allow-list entry: {raw} (wildcard only allowed as trailing .*)"
        ))),
        None => Ok(ToolPattern::Exact(s.to_string())),
    }
}

pub fn compile_patterns(raw: &[String]) -> Result<Vec<ToolPattern>> {
    raw.iter().map(|s| compile_pattern(s)).collect()
}

/// Union test over all rules; order never changes the outcome.
pub fn is_tool_allowed(rules: &[ToolPattern], tool_id: &str) -> bool {
    rules.iter().any(|r| r.matches(tool_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_requires_dotted_prefix() {
        let p = compile_pattern("gmail.*").unwrap();
        assert!(p.matches("gmail.send"));
        assert!(p.matches("gmail.list"));
        assert!(!p.matches("gmail"));
        assert!(!p.matches("gmailx.send"));
    }

    #[test]
    fn rejects_bad_entries() {
        for bad in ["", "  ", ".*", "*", "gm*il.send", "a.*.*"] {
            assert!(compile_pattern(bad).is_err(), "entry={bad:?}");
        }
    }
}
