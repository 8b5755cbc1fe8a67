use std::sync::Arc;
use std::time::Duration;

use toolguard_core::error::Result;

use crate::config::{OnStoreError, RateLimitConfig};

use super::store::CounterStore;

const MINUTE: Duration = Duration::from_secs(60);
const HOUR: Duration = Duration::from_secs(3600);

/// Which counter a key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    GlobalMinute,
    GlobalHour,
    ToolMinute,
}

impl Window {
    pub fn ttl(self) -> Duration {
        match self {
            Window::GlobalMinute | Window::ToolMinute => MINUTE,
            Window::GlobalHour => HOUR,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Window::GlobalMinute => "minute",
            Window::GlobalHour => "hour",
            Window::ToolMinute => "tool_minute",
        }
    }
}

/// Store key for one counter.
///
/// Identifier and tool id are length-prefixed, so colon-bearing ids
/// (`user:ops`, `ip:10.0.0.1`) can never alias another identifier's key.
pub fn counter_key(identifier: &str, tool_id: Option<&str>, window: Window) -> String {
    match tool_id {
        Some(tool) => format!(
            "rl:{}:{identifier}:{}:{tool}:{}",
            identifier.len(),
            tool.len(),
            window.as_str()
        ),
        None => format!("rl:{}:{identifier}:{}", identifier.len(), window.as_str()),
    }
}

/// Outcome of a read-only limiter check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admit,
    Limited(Window),
    /// Counter store unreachable; `admit` follows `on_store_error`.
    StoreDown { admit: bool },
}

impl Admission {
    pub fn admitted(self) -> bool {
        match self {
            Admission::Admit => true,
            Admission::Limited(_) => false,
            Admission::StoreDown { admit } => admit,
        }
    }
}

/// Per-identifier invocation limiter over an injected counter store.
///
/// Concurrency note: `allow` and `hit` are separate store round-trips, not
/// one atomic step. Concurrent dispatchers sharing an identifier can both
/// pass `allow` before either calls `hit`, so a window may admit a few calls
/// over its threshold. Closing that gap needs an increment-and-compare
/// primitive in the store.
///
/// `hit` is not transactional either: every window is attempted even when
/// one increment fails, and the first error is returned. A failed window
/// then under-counts by one while the others have recorded the call.
pub struct RateLimiter {
    store: Arc<dyn CounterStore>,
    cfg: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn CounterStore>, cfg: RateLimitConfig) -> Self {
        Self { store, cfg }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.cfg
    }

    fn windows(&self, identifier: &str, tool_id: &str) -> [(Window, String, u64); 3] {
        [
            (
                Window::GlobalMinute,
                counter_key(identifier, None, Window::GlobalMinute),
                self.cfg.per_minute,
            ),
            (
                Window::GlobalHour,
                counter_key(identifier, None, Window::GlobalHour),
                self.cfg.per_hour,
            ),
            (
                Window::ToolMinute,
                counter_key(identifier, Some(tool_id), Window::ToolMinute),
                self.cfg.per_tool_per_minute,
            ),
        ]
    }

    /// First window at or over its threshold, if any.
    pub async fn exceeded(&self, identifier: &str, tool_id: &str) -> Result<Option<Window>> {
        for (window, key, limit) in self.windows(identifier, tool_id) {
            let count = self.store.get(&key).await?;
            if count >= limit {
                return Ok(Some(window));
            }
        }
        Ok(None)
    }

    /// Read-only admission decision with the reason behind it.
    pub async fn check(&self, identifier: &str, tool_id: &str) -> Admission {
        match self.exceeded(identifier, tool_id).await {
            Ok(None) => Admission::Admit,
            Ok(Some(window)) => {
                tracing::debug!(%identifier, %tool_id, window = window.as_str(), "rate limited");
                Admission::Limited(window)
            }
            Err(e) => {
                tracing::warn!(%identifier, %tool_id, error = %e, "counter store read failed");
                Admission::StoreDown {
                    admit: self.cfg.on_store_error == OnStoreError::Allow,
                }
            }
        }
    }

    /// Read-only admission check. Never raises: a store failure resolves per
    /// `on_store_error` (deny by default).
    pub async fn allow(&self, identifier: &str, tool_id: &str) -> bool {
        self.check(identifier, tool_id).await.admitted()
    }

    /// Record one invocation in all three windows. Returns the first store
    /// error after attempting every window.
    pub async fn hit(&self, identifier: &str, tool_id: &str) -> Result<()> {
        let mut first_err = None;
        for (window, key, _) in self.windows(identifier, tool_id) {
            if let Err(e) = self.store.increment(&key, window.ttl()).await {
                tracing::debug!(
                    %identifier,
                    %tool_id,
                    window = window.as_str(),
                    error = %e,
                    "counter increment failed"
                );
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Seconds a caller should wait before a denied call could pass.
    pub fn retry_after_secs(window: Window) -> u64 {
        window.ttl().as_secs()
    }
}
