//! Tool plan (JSON): the ordered tool invocations an agent proposes.
//!
//! `ToolPlan` keeps its steps private so `selected_tool_ids` can never drift
//! from the steps it summarizes: every mutating method recomputes it.

use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One proposed tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanStep {
    /// Tool identifier (e.g., "gmail.send"). Missing or null decodes as empty.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tool_id: String,
    /// Tool arguments, passed through untouched.
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl PlanStep {
    pub fn new(tool_id: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self {
            tool_id: tool_id.into(),
            arguments,
        }
    }

    /// Step with no arguments.
    pub fn bare(tool_id: impl Into<String>) -> Self {
        Self::new(tool_id, Map::new())
    }

    /// A step without a usable tool id.
    pub fn is_malformed(&self) -> bool {
        self.tool_id.trim().is_empty()
    }
}

fn null_as_empty<'de, D>(d: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(d).map(Option::unwrap_or_default)
}

/// Observability side-channel: what guards did to a plan.
///
/// Not part of any guard's return contract; callers that want to log
/// truncation or blocking read it from `ToolPlan::notes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardNote {
    /// Steps beyond the per-turn limit were cut.
    Truncated { dropped: usize, limit: usize },
    /// A step was removed because its tool is not permitted.
    Blocked { tool_id: String },
    /// Steps with an empty tool id were removed.
    Malformed { dropped: usize },
}

/// Ordered tool plan plus its derived set of distinct tool ids.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawToolPlan")]
pub struct ToolPlan {
    plan_steps: Vec<PlanStep>,
    selected_tool_ids: BTreeSet<String>,
    #[serde(skip)]
    notes: Vec<GuardNote>,
}

/// Wire shape; any incoming `selected_tool_ids` is ignored and recomputed.
#[derive(Deserialize)]
struct RawToolPlan {
    #[serde(default)]
    plan_steps: Vec<PlanStep>,
}

impl From<RawToolPlan> for ToolPlan {
    fn from(raw: RawToolPlan) -> Self {
        Self::new(raw.plan_steps)
    }
}

impl ToolPlan {
    pub fn new(plan_steps: Vec<PlanStep>) -> Self {
        let mut plan = Self {
            plan_steps,
            selected_tool_ids: BTreeSet::new(),
            notes: Vec::new(),
        };
        plan.recompute();
        plan
    }

    pub fn steps(&self) -> &[PlanStep] {
        &self.plan_steps
    }

    pub fn len(&self) -> usize {
        self.plan_steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plan_steps.is_empty()
    }

    pub fn selected_tool_ids(&self) -> &BTreeSet<String> {
        &self.selected_tool_ids
    }

    pub fn notes(&self) -> &[GuardNote] {
        &self.notes
    }

    pub fn into_steps(self) -> Vec<PlanStep> {
        self.plan_steps
    }

    /// Append a step.
    pub fn push(&mut self, step: PlanStep) {
        self.plan_steps.push(step);
        self.recompute();
    }

    /// Record a side-channel note.
    pub fn record(&mut self, note: GuardNote) {
        self.notes.push(note);
    }

    /// Remove steps with an empty tool id. Returns how many were dropped.
    pub fn drop_malformed(&mut self) -> usize {
        let before = self.plan_steps.len();
        self.plan_steps.retain(|s| !s.is_malformed());
        let dropped = before - self.plan_steps.len();
        if dropped > 0 {
            tracing::trace!(dropped, "malformed plan steps dropped");
            self.notes.push(GuardNote::Malformed { dropped });
            self.recompute();
        }
        dropped
    }

    /// Keep only the first `max` steps. Returns how many were dropped.
    pub fn truncate(&mut self, max: usize) -> usize {
        let dropped = self.plan_steps.len().saturating_sub(max);
        if dropped > 0 {
            self.plan_steps.truncate(max);
            self.recompute();
        }
        dropped
    }

    /// Keep steps matching `keep`, preserving order. Returns removed steps.
    pub fn retain_steps<F>(&mut self, mut keep: F) -> Vec<PlanStep>
    where
        F: FnMut(&PlanStep) -> bool,
    {
        let (kept, removed): (Vec<_>, Vec<_>) = std::mem::take(&mut self.plan_steps)
            .into_iter()
            .partition(|s| keep(s));
        self.plan_steps = kept;
        self.recompute();
        removed
    }

    fn recompute(&mut self) {
        self.selected_tool_ids = self
            .plan_steps
            .iter()
            .filter(|s| !s.is_malformed())
            .map(|s| s.tool_id.clone())
            .collect();
    }
}
