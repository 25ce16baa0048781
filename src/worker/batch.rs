use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{debug, error, info};

use crate::app::App;
use crate::core::models::{Item, WorkflowOutcome};
use crate::errors::LaughGenError;
use crate::utils::deadline::bounded;

/// Tally of one scheduled or queued run.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub processed: usize,
    pub replied: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BatchSummary {
    fn record(&mut self, result: &Result<WorkflowOutcome, LaughGenError>) {
        self.processed += 1;
        match result {
            Ok(WorkflowOutcome::Replied(_)) => self.replied += 1,
            Ok(WorkflowOutcome::Skipped { .. }) => self.skipped += 1,
            Err(_) => self.failed += 1,
        }
    }
}

/// Run the workflow for every item, at most `app.max_concurrency` at a time.
/// A failing item is counted and logged; it never stops the others.
pub async fn run_items(app: &App, items: Vec<Item>) -> BatchSummary {
    let mut summary = BatchSummary::default();
    let mut results = stream::iter(items)
        .map(|item| async move {
            let result = app.workflow.run(&item).await;
            (item.id, result)
        })
        .buffer_unordered(app.max_concurrency);

    while let Some((item_id, result)) = results.next().await {
        match &result {
            Ok(outcome) => debug!(item_id = outcome.item_id(), ?outcome, "Item finished"),
            Err(e) => error!(item_id = %item_id, "Item failed: {}", e),
        }
        summary.record(&result);
    }
    summary
}

/// Fetch each named post, then run the workflow over the ones that resolved.
pub async fn run_post_ids(app: &App, post_ids: Vec<String>) -> BatchSummary {
    let fetched: Vec<(String, Result<Item, LaughGenError>)> = stream::iter(post_ids)
        .map(|post_id| async move {
            let result = bounded("post fetch", app.call_timeout, app.posts.fetch_post(&post_id)).await;
            (post_id, result)
        })
        .buffer_unordered(app.max_concurrency)
        .collect()
        .await;

    let mut items = Vec::with_capacity(fetched.len());
    let mut fetch_failures = 0;
    for (post_id, result) in fetched {
        match result {
            Ok(item) => items.push(item),
            Err(e) => {
                error!(post_id = %post_id, "Failed to fetch post: {}", e);
                fetch_failures += 1;
            }
        }
    }

    let mut summary = run_items(app, items).await;
    summary.processed += fetch_failures;
    summary.failed += fetch_failures;
    info!(?summary, "Queued batch finished");
    summary
}

/// List recent posts from the source collection and process them.
///
/// # Errors
///
/// Returns an error only if the listing itself cannot be fetched.
pub async fn run_scheduled(app: &App) -> Result<BatchSummary, LaughGenError> {
    let items = bounded("post listing", app.call_timeout, app.posts.recent_posts()).await?;
    let summary = run_items(app, items).await;
    info!(?summary, "Scheduled batch finished");
    Ok(summary)
}
