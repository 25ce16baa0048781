use lambda_runtime::{Error, LambdaEvent};
use serde_json::Value;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::batch::{self, BatchSummary};
use crate::api::parsing::requested_post_id;
use crate::app::{App, ReplyMode};
use crate::core::config::AppConfig;
use crate::utils::links::{extract_post_id, post_id_from_object_key};

/// Post ids carried by an SQS event, plus how many records named none.
/// A record body may be a post id or link, a JSON request document, or the
/// key of a staged image (`reddit/funny/posts/<id>.jpg`).
/// `None` when the event is not an SQS batch.
#[must_use]
pub fn queued_post_ids(payload: &Value) -> Option<(Vec<String>, usize)> {
    let records = payload.get("Records")?.as_array()?;
    let mut ids = Vec::with_capacity(records.len());
    let mut invalid = 0;

    for record in records {
        let body = record.get("body").and_then(Value::as_str).unwrap_or_default();
        let parsed = extract_post_id(body)
            .or_else(|| {
                let doc = serde_json::json!({ "body": body });
                requested_post_id(&doc).ok()
            })
            .or_else(|| post_id_from_object_key(body));
        match parsed {
            Some(id) => ids.push(id),
            None => {
                warn!(body, "SQS record does not name a post");
                invalid += 1;
            }
        }
    }
    Some((ids, invalid))
}

/// Route a worker event: SQS batches name their posts, anything else
/// (the schedule rule) processes the recent listing.
pub async fn handle_event(app: &App, payload: &Value) -> Result<BatchSummary, Error> {
    if let Some((post_ids, invalid)) = queued_post_ids(payload) {
        info!(records = post_ids.len() + invalid, "Processing queued posts");
        let mut summary = batch::run_post_ids(app, post_ids).await;
        summary.processed += invalid;
        summary.failed += invalid;
        return Ok(summary);
    }

    batch::run_scheduled(app).await.map_err(|e| {
        error!("Failed to list recent posts: {}", e);
        Error::from(e.to_string())
    })
}

/// Lambda handler for the Worker entrypoint.
#[tracing::instrument(level = "info", skip(event), fields(correlation_id = %Uuid::new_v4()))]
pub async fn function_handler(event: LambdaEvent<Value>) -> Result<BatchSummary, Error> {
    let config = AppConfig::from_env().map_err(|e| {
        error!("Config error: {}", e);
        Error::from(e.to_string())
    })?;
    info!("Worker Lambda received event: {:?}", event.payload);

    let app = App::from_config(&config, ReplyMode::Post)
        .await
        .map_err(|e| Error::from(format!("Failed to initialize worker: {e}")))?;

    handle_event(&app, &event.payload).await
}

pub use self::function_handler as handler;
