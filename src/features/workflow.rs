//! Per-item reply workflow.
//!
//! `FETCHED -> DEDUP_CHECK -> {SKIPPED | MARKED}`, then an optional
//! `ENRICHING` step for image posts, `PROMPT_READY`, and `GENERATING`
//! ending in `REPLIED` or an error (`FAILED`). The steps never reorder.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use super::enrich::Enricher;
use super::generate::ResponseGenerator;
use crate::core::models::{EnrichmentBundle, GenerationParameters, Item, ReplyOutcome, WorkflowOutcome};
use crate::core::ports::{DedupStore, ReplySink};
use crate::errors::LaughGenError;
use crate::prompt;
use crate::utils::deadline::bounded;
use crate::utils::mime::MediaPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Fetched,
    DedupCheck,
    Skipped,
    Marked,
    Enriching,
    PromptReady,
    Generating,
    Replied,
    Failed,
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkflowState::Fetched => "FETCHED",
            WorkflowState::DedupCheck => "DEDUP_CHECK",
            WorkflowState::Skipped => "SKIPPED",
            WorkflowState::Marked => "MARKED",
            WorkflowState::Enriching => "ENRICHING",
            WorkflowState::PromptReady => "PROMPT_READY",
            WorkflowState::Generating => "GENERATING",
            WorkflowState::Replied => "REPLIED",
            WorkflowState::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

fn transition(item_id: &str, state: WorkflowState) {
    debug!(item_id, state = %state, "Workflow transition");
}

pub struct ReplyWorkflow {
    dedup: Arc<dyn DedupStore>,
    enricher: Arc<dyn Enricher>,
    generator: ResponseGenerator,
    reply_sink: Option<Arc<dyn ReplySink>>,
    media_policy: MediaPolicy,
    parameters: GenerationParameters,
    timeout: Duration,
}

impl ReplyWorkflow {
    pub fn new(
        dedup: Arc<dyn DedupStore>,
        enricher: Arc<dyn Enricher>,
        generator: ResponseGenerator,
        timeout: Duration,
    ) -> Self {
        Self {
            dedup,
            enricher,
            generator,
            reply_sink: None,
            media_policy: MediaPolicy::default(),
            parameters: GenerationParameters::default(),
            timeout,
        }
    }

    /// Post generated replies through `sink` instead of only returning them.
    #[must_use]
    pub fn with_reply_sink(mut self, sink: Arc<dyn ReplySink>) -> Self {
        self.reply_sink = Some(sink);
        self
    }

    #[must_use]
    pub fn with_media_policy(mut self, policy: MediaPolicy) -> Self {
        self.media_policy = policy;
        self
    }

    #[must_use]
    pub fn with_parameters(mut self, parameters: GenerationParameters) -> Self {
        self.parameters = parameters;
        self
    }

    /// The image link of `item`, if it has one the media policy recognizes.
    #[must_use]
    pub fn image_url<'a>(&self, item: &'a Item) -> Option<&'a str> {
        item.media_url
            .as_deref()
            .filter(|url| self.media_policy.is_image(url))
    }

    /// Run the workflow for one item.
    ///
    /// # Errors
    ///
    /// Returns an error if the dedup ledger is unreachable or generation
    /// fails. The item stays marked in either case.
    #[tracing::instrument(level = "info", skip_all, fields(item_id = %item.id))]
    pub async fn run(&self, item: &Item) -> Result<WorkflowOutcome, LaughGenError> {
        let result = self.advance(item).await;
        if let Err(e) = &result {
            transition(&item.id, WorkflowState::Failed);
            error!(error = %e, "Workflow failed");
        }
        result
    }

    async fn advance(&self, item: &Item) -> Result<WorkflowOutcome, LaughGenError> {
        transition(&item.id, WorkflowState::Fetched);

        transition(&item.id, WorkflowState::DedupCheck);
        let first_seen =
            bounded("dedup check", self.timeout, self.dedup.check_and_mark(&item.id)).await?;
        if !first_seen {
            transition(&item.id, WorkflowState::Skipped);
            info!("Skipping already processed item");
            return Ok(WorkflowOutcome::Skipped {
                item_id: item.id.clone(),
            });
        }
        transition(&item.id, WorkflowState::Marked);

        let (bundle, enriched) = match self.image_url(item) {
            Some(url) => {
                transition(&item.id, WorkflowState::Enriching);
                (self.enricher.collect(url).await, true)
            }
            None => (EnrichmentBundle::default(), false),
        };

        let prompt = prompt::assemble(item, &bundle);
        transition(&item.id, WorkflowState::PromptReady);

        transition(&item.id, WorkflowState::Generating);
        let reply = self.generator.generate(&prompt, &self.parameters).await?;

        let posted = match &self.reply_sink {
            Some(sink) => match bounded("reply post", self.timeout, sink.post_reply(&item.id, &reply)).await {
                Ok(()) => true,
                Err(e) => {
                    warn!(error = %e, "Failed to post reply");
                    false
                }
            },
            None => false,
        };

        transition(&item.id, WorkflowState::Replied);
        info!(enriched, posted, "Reply generated");

        Ok(WorkflowOutcome::Replied(ReplyOutcome {
            item_id: item.id.clone(),
            prompt,
            reply,
            enriched,
            posted,
        }))
    }
}
