//! Top-level facade crate for toolguard.
//!
//! Re-exports the plan/error types and the guard pipeline so users can depend on a single crate.

pub mod core {
    pub use toolguard_core::*;
}

pub mod pipeline {
    pub use toolguard_pipeline::*;
}
