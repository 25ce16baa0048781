//! Image enrichment: caption, recognized celebrities and detected text.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::core::models::{EnrichmentBundle, ObjectRef};
use crate::core::ports::{CaptionModel, CelebrityRecognizer, ImageFetcher, ObjectStore, TextDetector};
use crate::errors::LaughGenError;
use crate::utils::deadline::bounded;
use crate::utils::mime::object_key_for;

#[async_trait]
pub trait Enricher: Send + Sync {
    /// Gather every signal available for the image at `media_url`. Never
    /// fails: a signal that cannot be computed is left empty.
    async fn collect(&self, media_url: &str) -> EnrichmentBundle;
}

/// Where fetched images are staged for the recognition capabilities.
#[derive(Debug, Clone)]
pub struct StagingArea {
    pub bucket: String,
    pub key_prefix: String,
}

pub struct EnrichmentCollector {
    fetcher: Arc<dyn ImageFetcher>,
    store: Arc<dyn ObjectStore>,
    captioner: Arc<dyn CaptionModel>,
    recognizer: Arc<dyn CelebrityRecognizer>,
    detector: Arc<dyn TextDetector>,
    staging: StagingArea,
    caption_prompt: Option<String>,
    timeout: Duration,
}

impl EnrichmentCollector {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        fetcher: Arc<dyn ImageFetcher>,
        store: Arc<dyn ObjectStore>,
        captioner: Arc<dyn CaptionModel>,
        recognizer: Arc<dyn CelebrityRecognizer>,
        detector: Arc<dyn TextDetector>,
        staging: StagingArea,
        caption_prompt: Option<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            fetcher,
            store,
            captioner,
            recognizer,
            detector,
            staging,
            caption_prompt: caption_prompt.filter(|p| !p.is_empty()),
            timeout,
        }
    }

    async fn stage(&self, media_url: &str, bytes: Vec<u8>) -> Option<ObjectRef> {
        let Some(key) = object_key_for(&self.staging.key_prefix, media_url) else {
            warn!(media_url, "No file name in media url, skipping recognition");
            return None;
        };
        let bucket = self.staging.bucket.as_str();
        match bounded("image upload", self.timeout, self.store.put(bucket, &key, bytes)).await {
            Ok(key) => Some(ObjectRef {
                bucket: bucket.to_string(),
                key,
            }),
            Err(e) => {
                warn!(error = %e, media_url, "Image upload failed, skipping recognition");
                None
            }
        }
    }

    async fn caption(&self, media_url: &str) -> String {
        let fut = self
            .captioner
            .caption(media_url, self.caption_prompt.as_deref());
        degrade("caption", bounded("image caption", self.timeout, fut).await)
    }

    async fn celebrities(&self, staged: Option<&ObjectRef>) -> Vec<String> {
        let Some(image) = staged else {
            return Vec::new();
        };
        let fut = self.recognizer.recognize(image);
        degrade("celebrities", bounded("celebrity recognition", self.timeout, fut).await)
    }

    async fn detected_text(&self, staged: Option<&ObjectRef>) -> Vec<String> {
        let Some(image) = staged else {
            return Vec::new();
        };
        let fut = self.detector.detect_text(image);
        degrade("detected_text", bounded("text detection", self.timeout, fut).await)
    }
}

/// A failed sub-call leaves its field empty; the others are unaffected.
fn degrade<T: Default>(signal: &str, result: Result<T, LaughGenError>) -> T {
    result.unwrap_or_else(|e| {
        let partial = LaughGenError::EnrichmentError(format!("{signal}: {e}"));
        warn!(error = %partial, "Enrichment signal unavailable");
        T::default()
    })
}

#[async_trait]
impl Enricher for EnrichmentCollector {
    async fn collect(&self, media_url: &str) -> EnrichmentBundle {
        let bytes = match bounded("image fetch", self.timeout, self.fetcher.fetch(media_url)).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, media_url, "Image unavailable, continuing without enrichment");
                return EnrichmentBundle::default();
            }
        };

        let staged = self.stage(media_url, bytes).await;

        // Issued together; each result lands in its own field.
        let (caption, entities, detected_text) = futures::join!(
            self.caption(media_url),
            self.celebrities(staged.as_ref()),
            self.detected_text(staged.as_ref()),
        );

        let bundle = EnrichmentBundle {
            caption,
            entities,
            detected_text,
        };
        if bundle.is_empty() {
            warn!(media_url, "No enrichment signal available for image");
        } else {
            info!(
                media_url,
                caption_len = bundle.caption.len(),
                entities = bundle.entities.len(),
                text_fragments = bundle.detected_text.len(),
                "Collected image enrichment"
            );
        }
        bundle
    }
}
