//! toolguard-check: dry-run a tool plan against a guard config.
//!
//! Usage: `toolguard-check <plan.json> [principal]`
//! - Config path from `TOOLGUARD_CONFIG` (default `toolguard.yaml`)
//! - Prints the prepared plan (redacted), guard notes, and the limiter's
//!   current admission decision per step. No tool is executed.

use std::sync::Arc;

use tracing_subscriber::{fmt, EnvFilter};

use toolguard_core::error::{GuardError, Result};
use toolguard_core::ToolPlan;
use toolguard_pipeline::ratelimit::InMemoryCounterStore;
use toolguard_pipeline::{config, GuardPipeline};

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let mut args = std::env::args().skip(1);
    let plan_path = args
        .next()
        .ok_or_else(|| GuardError::BadConfig("usage: toolguard-check <plan.json> [principal]".into()))?;
    let principal = args.next().unwrap_or_else(|| "anonymous".to_string());

    let cfg_path = std::env::var("TOOLGUARD_CONFIG").unwrap_or_else(|_| "toolguard.yaml".into());
    let cfg = config::load_from_file(&cfg_path)?;

    let raw = std::fs::read_to_string(&plan_path)
        .map_err(|e| GuardError::BadConfig(format!("read plan failed: {e}")))?;
    let plan: ToolPlan = serde_json::from_str(&raw)
        .map_err(|e| GuardError::BadConfig(format!("invalid plan json: {e}")))?;

    let pipeline = GuardPipeline::new(cfg, Arc::new(InMemoryCounterStore::new()))?;
    tracing::info!(%plan_path, %principal, steps = plan.len(), "toolguard-check starting");

    let prepared = pipeline.prepare(plan, &principal);
    let limiter = pipeline.limiter();

    println!("{}", pipeline.redact_plan(&prepared));
    for note in prepared.notes() {
        println!("note: {note:?}");
    }
    for (i, step) in prepared.steps().iter().enumerate() {
        let admission = limiter.check(&principal, &step.tool_id).await;
        println!("step {i} {}: {admission:?}", step.tool_id);
    }
    Ok(())
}
