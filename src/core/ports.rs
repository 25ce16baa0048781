//! Collaborator interfaces consumed by the reply workflow.
//!
//! Every external system (post source, object storage, inference endpoints,
//! the processed-items ledger) sits behind one of these traits so the
//! workflow receives its dependencies explicitly and can be driven by stubs.

use async_trait::async_trait;
use serde::Deserialize;

use crate::core::models::{GenerationCandidate, GenerationRequest, Item, ObjectRef};
use crate::errors::LaughGenError;

/// Ledger of item ids that have already been handled.
///
/// `check_and_mark` must be backed by an atomic insert-if-absent primitive.
/// A `has_been_processed` followed by `mark_processed` is not an acceptable
/// implementation: two concurrent runs could both observe "not processed".
#[async_trait]
pub trait DedupStore: Send + Sync {
    async fn has_been_processed(&self, item_id: &str) -> Result<bool, LaughGenError>;

    /// Records the id. Marking an id twice is not an error.
    async fn mark_processed(&self, item_id: &str) -> Result<(), LaughGenError>;

    /// Returns `true` and marks the id if it has never been seen, `false` otherwise.
    async fn check_and_mark(&self, item_id: &str) -> Result<bool, LaughGenError>;
}

#[async_trait]
pub trait PostSource: Send + Sync {
    async fn fetch_post(&self, post_id: &str) -> Result<Item, LaughGenError>;

    /// Recently created posts of the configured source collection.
    async fn recent_posts(&self) -> Result<Vec<Item>, LaughGenError>;
}

#[async_trait]
pub trait ReplySink: Send + Sync {
    async fn post_reply(&self, item_id: &str, text: &str) -> Result<(), LaughGenError>;
}

#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, LaughGenError>;
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stores `bytes` and returns the key it was written under.
    async fn put(&self, bucket: &str, key: &str, bytes: Vec<u8>) -> Result<String, LaughGenError>;

    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, LaughGenError>;
}

#[async_trait]
pub trait CaptionModel: Send + Sync {
    async fn caption(&self, image_url: &str, prompt: Option<&str>)
    -> Result<String, LaughGenError>;
}

#[async_trait]
pub trait CelebrityRecognizer: Send + Sync {
    /// Recognized names in the order the capability returned them.
    async fn recognize(&self, image: &ObjectRef) -> Result<Vec<String>, LaughGenError>;
}

#[async_trait]
pub trait TextDetector: Send + Sync {
    /// Detected text fragments in the order the capability returned them.
    async fn detect_text(&self, image: &ObjectRef) -> Result<Vec<String>, LaughGenError>;
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<Vec<GenerationCandidate>, LaughGenError>;
}

/// Credentials for the post source's password grant.
#[derive(Debug, Clone, Deserialize)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub user_password: String,
    #[serde(default)]
    pub user_agent: Option<String>,
}

#[async_trait]
pub trait SecretProvider: Send + Sync {
    async fn reddit_credentials(&self) -> Result<RedditCredentials, LaughGenError>;
}
