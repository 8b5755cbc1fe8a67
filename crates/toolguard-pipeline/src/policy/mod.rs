//! Policy layer (allow-lists, step limits).
//!
//! Compiles permission configuration into fast lookup structures and bounds
//! plan size. Every guard here is a pure function of its input plan and
//! immutable config: outcomes are surfaced as plan notes, never errors.

pub mod allowlist;
pub mod gate;
pub mod steps;

pub use allowlist::ToolPattern;
pub use gate::{requires_write_permission, PermissionGate};
pub use steps::StepLimiter;
