use serde::Deserialize;
use toolguard_core::error::{GuardError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GuardConfig {
    pub version: u32,

    #[serde(default = "default_max_steps_per_turn")]
    pub max_steps_per_turn: usize,

    /// Default allow-list (exact ids or `prefix.*`).
    #[serde(default)]
    pub allowed_tools: Vec<String>,

    #[serde(default)]
    pub permissions: PermissionsConfig,

    #[serde(default)]
    pub rate_limits: RateLimitConfig,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub redaction: RedactionConfig,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            version: 1,
            max_steps_per_turn: default_max_steps_per_turn(),
            allowed_tools: Vec::new(),
            permissions: PermissionsConfig::default(),
            rate_limits: RateLimitConfig::default(),
            retry: RetryConfig::default(),
            redaction: RedactionConfig::default(),
        }
    }
}

impl GuardConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(GuardError::UnsupportedVersion);
        }
        if !(1..=1000).contains(&self.max_steps_per_turn) {
            return Err(GuardError::BadConfig(
                "max_steps_per_turn must be between 1 and 1000".into(),
            ));
        }

        self.permissions.validate()?;
        self.rate_limits.validate()?;
        self.retry.validate()?;

        Ok(())
    }
}

fn default_max_steps_per_turn() -> usize {
    10
}

/// What the permission gate does when a principal's allow-list is empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyAllowlist {
    /// Every tool passes (MVP posture).
    #[default]
    Open,
    /// Every tool is blocked.
    Closed,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PermissionsConfig {
    #[serde(default)]
    pub empty_allowlist: EmptyAllowlist,

    /// Per-principal allow-list overrides.
    #[serde(default)]
    pub principals: Vec<PrincipalConfig>,
}

impl PermissionsConfig {
    pub fn validate(&self) -> Result<()> {
        for (i, p) in self.principals.iter().enumerate() {
            if p.id.trim().is_empty() {
                return Err(GuardError::BadConfig(format!(
                    "permissions.principals[{i}].id must not be empty"
                )));
            }
            if self.principals[..i].iter().any(|q| q.id == p.id) {
                return Err(GuardError::BadConfig(format!(
                    "permissions.principals: duplicate id {}",
                    p.id
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrincipalConfig {
    pub id: String,
    /// Required. An override without a list would otherwise read as empty,
    /// and under `empty_allowlist: open` grant every tool.
    pub allowed_tools: Vec<String>,
}

/// Rate limiter behavior when the counter store cannot be reached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnStoreError {
    /// Fail closed.
    #[default]
    Deny,
    /// Fail open.
    Allow,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RateLimitConfig {
    #[serde(default = "default_per_minute")]
    pub per_minute: u64,

    #[serde(default = "default_per_hour")]
    pub per_hour: u64,

    #[serde(default = "default_per_tool_per_minute")]
    pub per_tool_per_minute: u64,

    #[serde(default)]
    pub on_store_error: OnStoreError,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            per_minute: default_per_minute(),
            per_hour: default_per_hour(),
            per_tool_per_minute: default_per_tool_per_minute(),
            on_store_error: OnStoreError::default(),
        }
    }
}

impl RateLimitConfig {
    pub fn validate(&self) -> Result<()> {
        if self.per_minute == 0 || self.per_tool_per_minute == 0 {
            return Err(GuardError::BadConfig(
                "rate_limits.per_minute and per_tool_per_minute must be >= 1".into(),
            ));
        }
        if self.per_hour < self.per_minute {
            return Err(GuardError::BadConfig(
                "rate_limits.per_hour must be >= per_minute".into(),
            ));
        }
        Ok(())
    }
}

fn default_per_minute() -> u64 {
    60
}
fn default_per_hour() -> u64 {
    300
}
fn default_per_tool_per_minute() -> u64 {
    10
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetryConfig {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
        }
    }
}

impl RetryConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_retries > 10 {
            return Err(GuardError::BadConfig(
                "retry.max_retries must be between 0 and 10".into(),
            ));
        }
        Ok(())
    }
}

fn default_max_retries() -> u32 {
    3
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RedactionConfig {
    /// Extra regexes applied after the built-in catalogue.
    #[serde(default)]
    pub extra_patterns: Vec<String>,
}
