use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use toolguard_core::error::Result;
use toolguard_core::{PlanStep, ToolPlan};

use crate::obs::GuardMetrics;
use crate::policy::requires_write_permission;
use crate::ratelimit::{Admission, RateLimiter, RetryPolicy};
use crate::redact::Redactor;

/// Performs the actual tool call (shell, filesystem, email, ...).
///
/// Failures that carry an upstream status should use `GuardError::Tool` so
/// transient statuses can be retried.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    async fn execute(&self, step: &PlanStep) -> Result<Value>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepStatus {
    /// Tool ran; `output` is already redacted.
    Executed { output: Value, attempts: u32 },
    /// Not admitted by the rate limiter. Caller may defer by `retry_after_secs`.
    RateLimited {
        window: &'static str,
        retry_after_secs: u64,
    },
    /// Limiter could not reach its store and failed closed.
    StoreUnavailable,
    /// Tool failed (after any retries); `message` is redacted.
    Failed {
        code: &'static str,
        message: String,
        attempts: u32,
    },
}

impl StepStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepStatus::Executed { .. } => "executed",
            StepStatus::RateLimited { .. } => "rate_limited",
            StepStatus::StoreUnavailable => "store_unavailable",
            StepStatus::Failed { .. } => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepOutcome {
    /// Position in the dispatched plan.
    pub index: usize,
    pub tool_id: String,
    #[serde(flatten)]
    pub status: StepStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DispatchReport {
    pub outcomes: Vec<StepOutcome>,
}

impl DispatchReport {
    pub fn count(&self, status: &str) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status.as_str() == status)
            .count()
    }

    pub fn executed(&self) -> usize {
        self.count("executed")
    }

    pub fn rate_limited(&self) -> usize {
        self.count("rate_limited")
    }
}

/// Per-step execution gate: rate-limit check, hit recording, execution with
/// transient-failure retry.
pub struct Dispatcher {
    limiter: Arc<RateLimiter>,
    redactor: Arc<Redactor>,
    retry: RetryPolicy,
    metrics: Arc<GuardMetrics>,
}

impl Dispatcher {
    pub fn new(
        limiter: Arc<RateLimiter>,
        redactor: Arc<Redactor>,
        retry: RetryPolicy,
        metrics: Arc<GuardMetrics>,
    ) -> Self {
        Self {
            limiter,
            redactor,
            retry,
            metrics,
        }
    }

    /// Run each step in order. Steps are consulted one at a time because the
    /// limiter's answer can change between plan construction and execution.
    pub async fn dispatch(
        &self,
        plan: &ToolPlan,
        identifier: &str,
        executor: &dyn ToolExecutor,
    ) -> DispatchReport {
        let mut report = DispatchReport::default();

        for (index, step) in plan.steps().iter().enumerate() {
            if step.is_malformed() {
                continue;
            }
            let started = Instant::now();
            let status = self.dispatch_step(step, identifier, executor).await;

            self.metrics.step_outcomes.inc(&[("status", status.as_str())]);
            self.metrics
                .dispatch_duration
                .observe(&[("status", status.as_str())], started.elapsed());

            report.outcomes.push(StepOutcome {
                index,
                tool_id: step.tool_id.clone(),
                status,
            });
        }

        report
    }

    async fn dispatch_step(
        &self,
        step: &PlanStep,
        identifier: &str,
        executor: &dyn ToolExecutor,
    ) -> StepStatus {
        let tool_id = step.tool_id.as_str();

        match self.limiter.check(identifier, tool_id).await {
            Admission::Admit => {
                self.metrics.rate_limit_decisions.inc(&[("decision", "admit")]);
            }
            Admission::Limited(window) => {
                self.metrics.rate_limit_decisions.inc(&[("decision", "deny")]);
                return StepStatus::RateLimited {
                    window: window.as_str(),
                    retry_after_secs: RateLimiter::retry_after_secs(window),
                };
            }
            Admission::StoreDown { admit } => {
                self.metrics.store_errors.inc(&[("op", "get")]);
                if !admit {
                    return StepStatus::StoreUnavailable;
                }
            }
        }

        if let Err(e) = self.limiter.hit(identifier, tool_id).await {
            tracing::warn!(%identifier, %tool_id, error = %e, "counter store increment failed");
            self.metrics.store_errors.inc(&[("op", "increment")]);
        }

        let args = self
            .redactor
            .redact_all(Value::Object(step.arguments.clone()));
        tracing::debug!(
            %identifier,
            %tool_id,
            write = requires_write_permission(tool_id),
            %args,
            "dispatching step"
        );

        let mut attempt = 0u32;
        loop {
            match executor.execute(step).await {
                Ok(output) => {
                    return StepStatus::Executed {
                        output: self.redactor.redact_all(output),
                        attempts: attempt + 1,
                    };
                }
                Err(e) => match e.status() {
                    Some(status) if self.retry.should_retry(status, attempt) => {
                        let wait = self.retry.backoff(attempt);
                        tracing::info!(%tool_id, status, attempt, wait_secs = wait.as_secs(), "retrying tool call");
                        self.metrics.tool_retries.inc(&[("tool", tool_id)]);
                        tokio::time::sleep(wait).await;
                        attempt += 1;
                    }
                    _ => {
                        let message = self.redactor.redact(&e.to_string()).into_owned();
                        tracing::warn!(%tool_id, code = e.code().as_str(), %message, "tool call failed");
                        return StepStatus::Failed {
                            code: e.code().as_str(),
                            message,
                            attempts: attempt + 1,
                        };
                    }
                },
            }
        }
    }
}
