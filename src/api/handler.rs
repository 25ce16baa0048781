//! API Lambda handler: generate a reply for one explicitly named post.

use lambda_runtime::{Error, LambdaEvent};
use serde_json::{Value, json};
use tracing::{error, info};
use uuid::Uuid;

use super::{helpers, parsing};
use crate::app::{App, ReplyMode};
use crate::core::config::AppConfig;
use crate::core::models::WorkflowOutcome;
use crate::utils::deadline::bounded;

pub use self::function_handler as handler;

/// Lambda handler for the API entrypoint.
///
/// # Errors
///
/// Never returns `Err`; failures are reported as 400/500 response payloads.
#[tracing::instrument(level = "info", skip(event), fields(correlation_id = %Uuid::new_v4()))]
pub async fn function_handler(event: LambdaEvent<Value>) -> Result<Value, Error> {
    info!("API Lambda received request: {:?}", event.payload);

    // Reject malformed requests before paying for AWS and Reddit setup.
    if let Err(e) = parsing::requested_post_id(&event.payload) {
        error!("Invalid request: {}", e);
        return Ok(helpers::err_response(e.status_code(), &e.to_string()));
    }

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Config error: {}", e);
            return Ok(helpers::err_response(500, &e.to_string()));
        }
    };

    let app = match App::from_config(&config, ReplyMode::ReturnOnly).await {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to initialize: {}", e);
            return Ok(helpers::err_response(500, &e.to_string()));
        }
    };

    Ok(handle_request(&app, &event.payload).await)
}

/// Resolve the requested post, run the workflow and shape the response.
pub async fn handle_request(app: &App, payload: &Value) -> Value {
    let post_id = match parsing::requested_post_id(payload) {
        Ok(id) => id,
        Err(e) => return helpers::err_response(e.status_code(), &e.to_string()),
    };

    let item = match bounded("post fetch", app.call_timeout, app.posts.fetch_post(&post_id)).await {
        Ok(item) => item,
        Err(e) => {
            error!(post_id = %post_id, "Failed to fetch post: {}", e);
            return helpers::err_response(e.status_code(), &e.to_string());
        }
    };

    match app.workflow.run(&item).await {
        Ok(WorkflowOutcome::Replied(outcome)) => helpers::ok_json(&json!({
            "id": outcome.item_id,
            "reply": outcome.reply,
        })),
        Ok(WorkflowOutcome::Skipped { item_id }) => helpers::ok_json(&json!({
            "id": item_id,
            "skipped": true,
        })),
        Err(e) => helpers::err_response(e.status_code(), &e.to_string()),
    }
}
