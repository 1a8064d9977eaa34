//! `wp-precache theme|plugin` – cache a batch of slugs.

use anyhow::{Context, Result};
use precache_core::package::ItemKind;
use precache_core::pipeline::{precache_items_parallel, BatchReport, Pipeline, StepPolicy};

/// Unknown slugs and versions are reported and skipped; a failed transfer
/// stops the batch. With `jobs > 1` slugs are processed concurrently.
pub async fn run_items(
    pipeline: Pipeline,
    kind: ItemKind,
    slugs: Vec<String>,
    version: Option<String>,
    jobs: usize,
) -> Result<()> {
    let report = if jobs > 1 {
        precache_items_parallel(pipeline, kind, slugs, version, StepPolicy::BATCH, jobs).await?
    } else {
        tokio::task::spawn_blocking(move || {
            pipeline.precache_items(kind, &slugs, version.as_deref(), StepPolicy::BATCH)
        })
        .await
        .context("batch task join")??
    };
    print_report(&report);
    Ok(())
}

fn print_report(report: &BatchReport) {
    for skipped in &report.skipped {
        println!("Warning: {}: {}", skipped.slug, skipped.error);
    }
    println!("Success: {}", report.success_message());
}
