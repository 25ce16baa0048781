//! LaughGen - replies to Reddit posts with a hosted language model.
//!
//! This crate implements a two-Lambda deployment:
//! 1. An API Lambda that takes one post URL and returns a generated reply
//! 2. A Worker Lambda that runs on a schedule (or from SQS), walks recent
//!    posts of a subreddit, and posts a reply to each one not seen before
//!
//! # Architecture
//!
//! Each post goes through the same workflow: an atomic dedup check against
//! DynamoDB, optional image enrichment (SageMaker captioning plus Rekognition
//! celebrity and text detection), prompt assembly, and generation on a
//! SageMaker text-generation endpoint. Every external system sits behind a
//! trait in [`core::ports`] and is injected into [`features::ReplyWorkflow`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use laughgen::core::dedup::InMemoryDedupStore;
//! use laughgen::core::models::{EnrichmentBundle, Item};
//! use laughgen::prompt::assemble;
//!
//! let item = Item::new("abc123", "Funny cat").with_media_url("https://i.redd.it/cat.jpg");
//! let bundle = EnrichmentBundle {
//!     caption: "a cat sitting on a chair".to_string(),
//!     entities: vec![],
//!     detected_text: vec!["MEOW".to_string()],
//! };
//! println!("{}", assemble(&item, &bundle));
//!
//! let _ledger = Arc::new(InMemoryDedupStore::new());
//! let _timeout = Duration::from_secs(30);
//! ```
pub mod api;
pub mod app;
pub mod clients;
pub mod core;
pub mod errors;
pub mod features;
pub mod prompt;
pub mod utils;
pub mod worker;

pub use errors::LaughGenError;

/// Configure structured logging with JSON format for AWS Lambda environments.
///
/// This function sets up tracing-subscriber with a JSON formatter suitable for
/// `CloudWatch` Logs integration, filtered by `RUST_LOG` (default `info`).
/// Calling it more than once is harmless.
///
/// # Example
///
/// ```
/// laughgen::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
