//! Dispatch module exports.
//!
//! Re-exports the dispatcher and executor trait so downstream consumers can
//! depend on this module directly.

pub mod dispatcher;

pub use dispatcher::{DispatchReport, Dispatcher, StepOutcome, StepStatus, ToolExecutor};
