//! Guard pipeline: the fixed composition of guards around plan dispatch.
//!
//! Order is StepLimiter, then PermissionGate, at plan time; RateLimiter per
//! step at dispatch time. Redaction applies wherever plan or result data
//! leaves the pipeline.

use std::sync::Arc;

use serde_json::Value;

use toolguard_core::error::Result;
use toolguard_core::{GuardNote, ToolPlan};

use crate::config::{EmptyAllowlist, GuardConfig};
use crate::dispatch::{DispatchReport, Dispatcher, ToolExecutor};
use crate::obs::GuardMetrics;
use crate::policy::{requires_write_permission, PermissionGate, StepLimiter};
use crate::ratelimit::{CounterStore, RateLimiter, RetryPolicy};
use crate::redact::Redactor;

/// Prepared plan plus what happened when it ran.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub plan: ToolPlan,
    pub dispatch: DispatchReport,
}

/// Built once from config, then shared via Arc.
pub struct GuardPipeline {
    cfg: GuardConfig,
    steps: StepLimiter,
    gate: Arc<PermissionGate>,
    limiter: Arc<RateLimiter>,
    redactor: Arc<Redactor>,
    dispatcher: Dispatcher,
    metrics: Arc<GuardMetrics>,
}

impl GuardPipeline {
    /// Compile every guard from config. Returns Result so startup errors
    /// (bad patterns) surface to the caller instead of panicking.
    pub fn new(cfg: GuardConfig, store: Arc<dyn CounterStore>) -> Result<Self> {
        cfg.validate()?;

        let gate = Arc::new(PermissionGate::new(&cfg)?);
        let redactor = Arc::new(Redactor::with_extra_patterns(&cfg.redaction.extra_patterns)?);
        let limiter = Arc::new(RateLimiter::new(store, cfg.rate_limits.clone()));
        let metrics = Arc::new(GuardMetrics::default());
        let dispatcher = Dispatcher::new(
            Arc::clone(&limiter),
            Arc::clone(&redactor),
            RetryPolicy::new(cfg.retry.max_retries),
            Arc::clone(&metrics),
        );

        // allow-list <-> write-risk sanity check
        let warn_write_risk = |principal: &str, rules: &[String]| {
            for rule in rules {
                let id = rule.strip_suffix(".*").unwrap_or(rule);
                if requires_write_permission(id) {
                    tracing::warn!(%principal, %rule, "allow-list grants a write-risk tool");
                }
            }
        };
        warn_write_risk("*", &cfg.allowed_tools);
        for p in &cfg.permissions.principals {
            warn_write_risk(&p.id, &p.allowed_tools);
            let open = cfg.permissions.empty_allowlist == EmptyAllowlist::Open;
            if open && p.allowed_tools.is_empty() {
                tracing::warn!(principal = %p.id, "empty principal allow-list admits every tool");
            }
        }

        Ok(Self {
            steps: StepLimiter::new(cfg.max_steps_per_turn),
            cfg,
            gate,
            limiter,
            redactor,
            dispatcher,
            metrics,
        })
    }

    pub fn config(&self) -> &GuardConfig {
        &self.cfg
    }

    pub fn step_limiter(&self) -> &StepLimiter {
        &self.steps
    }

    pub fn gate(&self) -> Arc<PermissionGate> {
        Arc::clone(&self.gate)
    }

    pub fn limiter(&self) -> Arc<RateLimiter> {
        Arc::clone(&self.limiter)
    }

    pub fn redactor(&self) -> Arc<Redactor> {
        Arc::clone(&self.redactor)
    }

    pub fn metrics(&self) -> Arc<GuardMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Bound the plan's size, then drop steps `principal` may not run.
    pub fn prepare(&self, plan: ToolPlan, principal: &str) -> ToolPlan {
        let seen = plan.notes().len();

        let plan = self.steps.limit(plan);
        let plan = self.gate.filter(plan, principal);

        for note in &plan.notes()[seen..] {
            match note {
                GuardNote::Truncated { dropped, .. } => {
                    self.metrics.steps_truncated.add(&[], *dropped as u64);
                }
                GuardNote::Blocked { tool_id } => {
                    self.metrics.tools_blocked.inc(&[("tool", tool_id.as_str())]);
                }
                GuardNote::Malformed { dropped } => {
                    self.metrics.malformed_steps.add(&[], *dropped as u64);
                }
            }
        }

        tracing::debug!(
            %principal,
            steps = plan.len(),
            plan = %self.redact_plan(&plan),
            "plan prepared"
        );
        plan
    }

    /// Execute an already prepared plan, step by step.
    pub async fn dispatch(
        &self,
        plan: &ToolPlan,
        identifier: &str,
        executor: &dyn ToolExecutor,
    ) -> DispatchReport {
        self.dispatcher.dispatch(plan, identifier, executor).await
    }

    /// `prepare` then `dispatch`, rate-limiting under the principal's id.
    pub async fn run(
        &self,
        plan: ToolPlan,
        principal: &str,
        executor: &dyn ToolExecutor,
    ) -> RunReport {
        let plan = self.prepare(plan, principal);
        let dispatch = self.dispatch(&plan, principal, executor).await;
        RunReport { plan, dispatch }
    }

    /// Plan as JSON, safe for logs and UI.
    pub fn redact_plan(&self, plan: &ToolPlan) -> Value {
        match serde_json::to_value(plan) {
            Ok(v) => self.redactor.redact_all(v),
            Err(_) => Value::Null,
        }
    }
}
