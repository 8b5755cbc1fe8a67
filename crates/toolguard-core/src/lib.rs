//! toolguard core: the tool-plan data model and the shared error surface.
//!
//! This crate defines the contracts passed between the upstream planner, the
//! guard pipeline, and downstream tool executors. It carries no runtime or
//! store dependencies so the plan types can be reused by planners and
//! executors alike.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Malformed plan input is dropped or surfaced as `GuardError`, never a crash.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod plan;

/// Shared result type.
pub use error::{GuardError, Result};
pub use plan::{GuardNote, PlanStep, ToolPlan};
