//! Lightweight in-process metrics.
//!
//! Guards themselves stay pure; the pipeline reads the notes they leave on a
//! plan and the dispatcher's outcomes, and records them here. Rendered as
//! Prometheus text for whatever sink the host process exposes.

pub mod metrics;

pub use metrics::GuardMetrics;
