//! Run a theme/plugin batch with several slugs in flight at once.
//!
//! Keeps up to `max_concurrent` items running; when one finishes the next
//! slug is started. Repeated slugs are processed once, so every in-flight item
//! owns a distinct temp file and cache key. An aborting error stops new work;
//! in-flight items finish before it is returned.

use anyhow::Result;
use std::collections::{BTreeMap, HashSet};

use super::{BatchReport, Outcome, Pipeline, StepPolicy};
use crate::package::ItemKind;

pub async fn precache_items_parallel(
    pipeline: Pipeline,
    kind: ItemKind,
    slugs: Vec<String>,
    version: Option<String>,
    policy: StepPolicy,
    max_concurrent: usize,
) -> Result<BatchReport> {
    let max_concurrent = max_concurrent.max(1);
    let mut pending = unique_slugs(slugs).into_iter().enumerate();
    let mut outcomes: BTreeMap<usize, Outcome> = BTreeMap::new();
    let mut first_error: Option<anyhow::Error> = None;
    let mut join_set = tokio::task::JoinSet::new();

    loop {
        while first_error.is_none() && join_set.len() < max_concurrent {
            let Some((index, slug)) = pending.next() else {
                break;
            };
            let pipeline = pipeline.clone();
            let version = version.clone();
            join_set.spawn_blocking(move || {
                (
                    index,
                    pipeline.process_item(kind, &slug, version.as_deref(), policy),
                )
            });
        }

        let Some(res) = join_set.join_next().await else {
            break;
        };
        let failure = match res {
            Ok((index, Ok(outcome))) => {
                outcomes.insert(index, outcome);
                continue;
            }
            Ok((_, Err(e))) => anyhow::Error::from(e),
            Err(e) => anyhow::anyhow!("item task join: {}", e),
        };
        if first_error.is_none() {
            tracing::debug!("aborting batch after fatal error; draining in-flight items");
            first_error = Some(failure);
        }
    }

    if let Some(e) = first_error {
        return Err(e);
    }

    let mut report = BatchReport::new(kind.into());
    for outcome in outcomes.into_values() {
        report.record(outcome);
    }
    Ok(report)
}

/// Drops repeated slugs, keeping first-occurrence order.
fn unique_slugs(slugs: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    slugs
        .into_iter()
        .filter(|slug| {
            let fresh = seen.insert(slug.clone());
            if !fresh {
                tracing::debug!(slug = %slug, "ignoring repeated slug");
            }
            fresh
        })
        .collect()
}
