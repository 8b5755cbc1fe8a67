//! Redaction of plan and tool-result payloads before they reach logs,
//! telemetry, or UI surfaces.
//!
//! Redaction is one-way and idempotent: the rule pass is repeated until the
//! text stops changing, so `redact(redact(s)) == redact(s)`.

pub mod rules;

use std::borrow::Cow;

use serde_json::{Map, Value};

use toolguard_core::error::Result;

pub use rules::{Rule, SENSITIVE_KEY_FRAGMENTS, SENTINEL};

/// Upper bound on rule passes; each pass shrinks the unredacted text.
const MAX_PASSES: usize = 8;

/// Ordered regex redactor.
/// Construct once at startup, then share via Arc.
#[derive(Debug, Clone)]
pub struct Redactor {
    rules: Vec<Rule>,
}

impl Redactor {
    /// Built-in catalogue only.
    pub fn builtin() -> Result<Self> {
        Ok(Self {
            rules: rules::builtin_rules()?,
        })
    }

    /// Built-in catalogue followed by `extra` patterns.
    pub fn with_extra_patterns(extra: &[String]) -> Result<Self> {
        let mut rules = rules::builtin_rules()?;
        for (i, p) in extra.iter().enumerate() {
            rules.push(Rule::new(format!("extra_{i}"), p)?);
        }
        Ok(Self { rules })
    }

    pub fn rule_names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.name.as_str())
    }

    fn pass<'a>(&self, input: &'a str) -> Cow<'a, str> {
        let mut out = Cow::Borrowed(input);
        for rule in &self.rules {
            if rule.regex.is_match(&out) {
                out = Cow::Owned(rule.regex.replace_all(&out, SENTINEL).into_owned());
            }
        }
        out
    }

    /// Replace every sensitive span in `text` with the sentinel.
    pub fn redact<'a>(&self, text: &'a str) -> Cow<'a, str> {
        let mut out = self.pass(text);
        if let Cow::Borrowed(_) = out {
            return out;
        }
        for _ in 1..MAX_PASSES {
            let next = self.pass(&out).into_owned();
            if next == *out {
                break;
            }
            out = Cow::Owned(next);
        }
        out
    }

    /// Whether a key name marks its value as sensitive (case-insensitive).
    pub fn is_sensitive_key(key: &str) -> bool {
        let k = key.to_ascii_lowercase();
        SENSITIVE_KEY_FRAGMENTS.iter().any(|f| k.contains(f))
    }

    /// Replace whole values under sensitive key names, recursing through
    /// nested objects and arrays. A replaced value is not descended into.
    pub fn redact_keys(&self, value: Value) -> Value {
        match value {
            Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| {
                        let v = if Self::is_sensitive_key(&k) {
                            Value::String(SENTINEL.to_string())
                        } else {
                            self.redact_keys(v)
                        };
                        (k, v)
                    })
                    .collect::<Map<_, _>>(),
            ),
            Value::Array(items) => {
                Value::Array(items.into_iter().map(|v| self.redact_keys(v)).collect())
            }
            other => other,
        }
    }

    /// Content-redact every string leaf of a nested structure. Non-string
    /// leaves pass through unchanged.
    pub fn redact_value(&self, value: Value) -> Value {
        match value {
            Value::String(s) => {
                let redacted = match self.redact(&s) {
                    Cow::Owned(r) => Some(r),
                    Cow::Borrowed(_) => None,
                };
                Value::String(redacted.unwrap_or(s))
            }
            Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, self.redact_value(v)))
                    .collect::<Map<_, _>>(),
            ),
            Value::Array(items) => {
                Value::Array(items.into_iter().map(|v| self.redact_value(v)).collect())
            }
            other => other,
        }
    }

    /// Key-name redaction, then content redaction.
    pub fn redact_all(&self, value: Value) -> Value {
        self.redact_value(self.redact_keys(value))
    }
}
