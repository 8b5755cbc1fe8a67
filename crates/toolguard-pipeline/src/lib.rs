//! toolguard pipeline library entry.
//!
//! This crate wires the step limiter, permission gate, rate limiter, and
//! redactor into a guard pipeline that sits between an agent's planner and
//! its tool executors. It is intended to be consumed by the dry-run binary
//! (`main.rs`) and by embedding agents.

pub mod config;
pub mod dispatch;
pub mod obs;
pub mod pipeline;
pub mod policy;
pub mod ratelimit;
pub mod redact;

pub use pipeline::{GuardPipeline, RunReport};
