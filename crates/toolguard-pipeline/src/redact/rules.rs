//! Built-in redaction catalogue.
//!
//! Order matters: each rule runs over text already rewritten by the rules
//! before it, so provider-specific shapes come first and broad shapes
//! (digit runs, long tokens) last. No rule may match `SENTINEL`.

use regex::Regex;

use toolguard_core::error::{GuardError, Result};

/// Replacement for every redacted span.
pub const SENTINEL: &str = "[REDACTED]";

const CATALOGUE: &[(&str, &str)] = &[
    (
        "private_key",
        r"-----BEGIN [A-Z ]*PRIVATE KEY-----[\s\S]*?-----END [A-Z ]*PRIVATE KEY-----",
    ),
    ("authorization_header", r"(?i)\bauthorization\s*:\s*[^\r\n]+"),
    ("bearer_token", r"(?i)\bbearer\s+[A-Za-z0-9\-._~+/]+=*"),
    ("anthropic_api_key", r"\bsk-ant-[A-Za-z0-9_\-]{8,}"),
    ("openai_api_key", r"\bsk-[A-Za-z0-9_\-]{16,}"),
    ("github_token", r"\bgh[pousr]_[A-Za-z0-9]{36,}"),
    ("slack_token", r"\bxox[abprs]-[A-Za-z0-9\-]{10,}"),
    ("aws_access_key", r"\b(?:AKIA|ASIA)[A-Z0-9]{16}\b"),
    (
        "key_value_secret",
        r#"(?i)\b[A-Za-z0-9_\-]*(?:password|passwd|pwd|api[_\-]?key|secret|token)[A-Za-z0-9_\-]*["']?\s*[=:]\s*["']?[^\s"',;&]+"#,
    ),
    ("email", r"\b[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}\b"),
    ("credit_card", r"\b(?:\d[ \-]?){12,18}\d\b"),
    ("ssn", r"\b\d{3}-\d{2}-\d{4}\b"),
    (
        "phone",
        r"(?:\+\d{1,3}[\s.\-]?)?(?:\(\d{3}\)|\b\d{3})[\s.\-]?\d{3}[\s.\-]?\d{4}\b",
    ),
    ("long_token", r"\b[A-Za-z0-9][A-Za-z0-9_\-]{31,}\b"),
];

/// A named, compiled redaction pattern.
#[derive(Debug, Clone)]
pub struct Rule {
    pub name: String,
    pub regex: Regex,
}

impl Rule {
    /// Compile a rule; rejects patterns that would match the sentinel.
    pub fn new(name: impl Into<String>, pattern: &str) -> Result<Self> {
        let name = name.into();
        let regex = Regex::new(pattern)
            .map_err(|e| GuardError::InvalidPattern(format!("redaction rule {name}: {e}")))?;
        if regex.is_match(SENTINEL) {
            return Err(GuardError::InvalidPattern(format!(
                "redaction rule {name} matches the sentinel"
            )));
        }
        Ok(Self { name, regex })
    }
}

pub fn builtin_rules() -> Result<Vec<Rule>> {
    CATALOGUE
        .iter()
        .map(|(name, pattern)| Rule::new(*name, pattern))
        .collect()
}

/// Key-name fragments whose values are always redacted whole.
pub const SENSITIVE_KEY_FRAGMENTS: &[&str] = &[
    "password",
    "passwd",
    "secret",
    "token",
    "api_key",
    "apikey",
    "api-key",
    "authorization",
    "credential",
    "private_key",
    "cookie",
];
