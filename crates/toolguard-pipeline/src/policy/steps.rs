use toolguard_core::{GuardNote, ToolPlan};

/// Bounds how many steps a single turn may execute.
#[derive(Debug, Clone, Copy)]
pub struct StepLimiter {
    max_steps_per_turn: usize,
}

impl Default for StepLimiter {
    fn default() -> Self {
        Self::new(10)
    }
}

impl StepLimiter {
    pub fn new(max_steps_per_turn: usize) -> Self {
        Self { max_steps_per_turn }
    }

    pub fn max_steps_per_turn(&self) -> usize {
        self.max_steps_per_turn
    }

    /// Keep the earliest `max_steps_per_turn` well-formed steps.
    pub fn limit(&self, mut plan: ToolPlan) -> ToolPlan {
        plan.drop_malformed();

        let dropped = plan.truncate(self.max_steps_per_turn);
        if dropped > 0 {
            tracing::info!(dropped, limit = self.max_steps_per_turn, "plan truncated");
            plan.record(GuardNote::Truncated {
                dropped,
                limit: self.max_steps_per_turn,
            });
        }
        plan
    }

    pub fn is_within_limit(&self, plan: &ToolPlan) -> bool {
        plan.len() <= self.max_steps_per_turn
    }
}
