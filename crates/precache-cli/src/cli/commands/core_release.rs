//! `wp-precache core` – cache one core release.

use anyhow::{Context, Result};
use precache_core::pipeline::{CoreRequest, Pipeline, StepPolicy};

pub async fn run_core(pipeline: Pipeline, request: CoreRequest) -> Result<()> {
    let report = tokio::task::spawn_blocking(move || {
        pipeline.precache_core(&request, StepPolicy::FAIL_FAST)
    })
    .await
    .context("core task join")??;
    println!("Success: {}", report.success_message());
    Ok(())
}
