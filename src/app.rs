//! Collaborator wiring for the Lambda entrypoints.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client as HttpClient;
use tracing::info;

use crate::clients::{
    DynamoDedupStore, HttpImageFetcher, ListingConfig, RedditClient, RekognitionClient,
    S3ObjectStore, SageMakerCaptioner, SageMakerTextGenerator, SsmSecretProvider,
};
use crate::core::config::AppConfig;
use crate::core::ports::{PostSource, SecretProvider};
use crate::errors::LaughGenError;
use crate::features::{EnrichmentCollector, ReplyWorkflow, ResponseGenerator, StagingArea};
use crate::utils::deadline::bounded;

/// Whether generated replies are posted back to the post source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyMode {
    Post,
    ReturnOnly,
}

/// Everything one invocation needs: the post source and a wired workflow.
pub struct App {
    pub posts: Arc<dyn PostSource>,
    pub workflow: ReplyWorkflow,
    pub max_concurrency: usize,
    pub call_timeout: Duration,
}

impl App {
    /// Assemble an app from already-built parts.
    pub fn new(
        posts: Arc<dyn PostSource>,
        workflow: ReplyWorkflow,
        max_concurrency: usize,
        call_timeout: Duration,
    ) -> Self {
        Self {
            posts,
            workflow,
            max_concurrency: max_concurrency.max(1),
            call_timeout,
        }
    }

    /// Build the AWS- and Reddit-backed app described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the Reddit credentials cannot be loaded or refused.
    pub async fn from_config(config: &AppConfig, mode: ReplyMode) -> Result<Self, LaughGenError> {
        let shared = aws_config::from_env().load().await;
        let http = HttpClient::builder()
            .timeout(config.call_timeout)
            .build()
            .map_err(|e| LaughGenError::ConfigError(format!("http client: {e}")))?;

        let secrets = SsmSecretProvider::new(
            aws_sdk_ssm::Client::new(&shared),
            config.reddit_credentials_param.clone(),
        );
        let credentials = bounded(
            "credential lookup",
            config.call_timeout,
            secrets.reddit_credentials(),
        )
        .await?;
        let reddit = Arc::new(
            RedditClient::connect(
                http.clone(),
                &credentials,
                ListingConfig {
                    subreddit: config.subreddit.clone(),
                    window: config.listing_window.clone(),
                    limit: config.listing_limit,
                },
            )
            .await?,
        );

        let sagemaker = aws_sdk_sagemakerruntime::Client::new(&shared);
        let rekognition = Arc::new(RekognitionClient::new(aws_sdk_rekognition::Client::new(
            &shared,
        )));

        let enricher = EnrichmentCollector::new(
            Arc::new(HttpImageFetcher::new(http)),
            Arc::new(S3ObjectStore::new(aws_sdk_s3::Client::new(&shared))),
            Arc::new(SageMakerCaptioner::new(
                sagemaker.clone(),
                config.caption_endpoint.clone(),
            )),
            rekognition.clone(),
            rekognition,
            StagingArea {
                bucket: config.image_bucket.clone(),
                key_prefix: config.image_key_prefix.clone(),
            },
            Some(config.caption_prompt.clone()),
            config.call_timeout,
        );

        let generator = ResponseGenerator::new(
            Arc::new(SageMakerTextGenerator::new(
                sagemaker,
                config.llm_endpoint.clone(),
            )),
            config.call_timeout,
        )
        .with_retry_temperature(config.retry_temperature);

        let dedup = DynamoDedupStore::new(
            aws_sdk_dynamodb::Client::new(&shared),
            config.processed_table.clone(),
        );

        let mut workflow = ReplyWorkflow::new(
            Arc::new(dedup),
            Arc::new(enricher),
            generator,
            config.call_timeout,
        )
        .with_media_policy(config.media_policy.clone())
        .with_parameters(config.generation.clone());

        let posting = mode == ReplyMode::Post && !config.dry_run;
        if posting {
            workflow = workflow.with_reply_sink(reddit.clone());
        }
        info!(?mode, dry_run = config.dry_run, posting, "Workflow ready");

        Ok(Self::new(
            reddit,
            workflow,
            config.max_concurrency,
            config.call_timeout,
        ))
    }
}
