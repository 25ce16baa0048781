//! Stub collaborators shared by the integration tests.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use laughgen::core::dedup::InMemoryDedupStore;
use laughgen::core::models::{
    EnrichmentBundle, GenerationCandidate, GenerationRequest, Item, ObjectRef,
};
use laughgen::core::ports::{
    CaptionModel, CelebrityRecognizer, DedupStore, ImageFetcher, ObjectStore, PostSource,
    ReplySink, TextDetector, TextGenerator,
};
use laughgen::features::{Enricher, ReplyWorkflow, ResponseGenerator};
use laughgen::LaughGenError;

pub const TIMEOUT: Duration = Duration::from_secs(5);

/// Enricher that returns a fixed bundle and counts calls.
pub struct FixedEnricher {
    pub bundle: EnrichmentBundle,
    pub calls: AtomicUsize,
    pub urls: Mutex<Vec<String>>,
}

impl FixedEnricher {
    pub fn new(bundle: EnrichmentBundle) -> Arc<Self> {
        Arc::new(Self {
            bundle,
            calls: AtomicUsize::new(0),
            urls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Enricher for FixedEnricher {
    async fn collect(&self, media_url: &str) -> EnrichmentBundle {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().unwrap().push(media_url.to_string());
        self.bundle.clone()
    }
}

/// Text generator that replays scripted responses and records every request.
pub struct ScriptedGenerator {
    responses: Mutex<VecDeque<Result<Vec<GenerationCandidate>, LaughGenError>>>,
    pub requests: Mutex<Vec<GenerationRequest>>,
    pub delay: Option<Duration>,
}

impl ScriptedGenerator {
    pub fn texts(texts: &[&str]) -> Arc<Self> {
        let responses = texts
            .iter()
            .map(|t| {
                Ok(vec![GenerationCandidate {
                    generated_text: (*t).to_string(),
                }])
            })
            .collect();
        Arc::new(Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
            delay: None,
        })
    }

    pub fn responses(responses: Vec<Result<Vec<GenerationCandidate>, LaughGenError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
            delay: None,
        })
    }

    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            delay: Some(delay),
        })
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn temperatures(&self) -> Vec<f32> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.parameters.temperature)
            .collect()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<Vec<GenerationCandidate>, LaughGenError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LaughGenError::GenerationError("script exhausted".to_string())))
    }
}

/// Reply sink that records posted replies.
#[derive(Default)]
pub struct RecordingSink {
    pub replies: Mutex<Vec<(String, String)>>,
    pub fail: bool,
}

#[async_trait]
impl ReplySink for RecordingSink {
    async fn post_reply(&self, item_id: &str, text: &str) -> Result<(), LaughGenError> {
        if self.fail {
            return Err(LaughGenError::HttpError("comment rejected".to_string()));
        }
        self.replies
            .lock()
            .unwrap()
            .push((item_id.to_string(), text.to_string()));
        Ok(())
    }
}

/// Post source backed by a map of items.
#[derive(Default)]
pub struct StaticPosts {
    pub items: HashMap<String, Item>,
    pub listing: Vec<Item>,
}

impl StaticPosts {
    pub fn with(items: Vec<Item>) -> Arc<Self> {
        Arc::new(Self {
            items: items.iter().map(|i| (i.id.clone(), i.clone())).collect(),
            listing: items,
        })
    }
}

#[async_trait]
impl PostSource for StaticPosts {
    async fn fetch_post(&self, post_id: &str) -> Result<Item, LaughGenError> {
        self.items
            .get(post_id)
            .cloned()
            .ok_or_else(|| LaughGenError::FetchError(format!("post {post_id} not found")))
    }

    async fn recent_posts(&self) -> Result<Vec<Item>, LaughGenError> {
        Ok(self.listing.clone())
    }
}

/// Image fetcher returning fixed bytes, or failing.
pub struct StubFetcher {
    pub bytes: Option<Vec<u8>>,
    pub calls: AtomicUsize,
}

impl StubFetcher {
    pub fn ok() -> Arc<Self> {
        Arc::new(Self {
            bytes: Some(b"\x89PNG fake".to_vec()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            bytes: None,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl ImageFetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, LaughGenError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.bytes
            .clone()
            .ok_or_else(|| LaughGenError::FetchError(format!("GET {url}: status 404")))
    }
}

/// Object store keeping objects in memory.
#[derive(Default)]
pub struct MemoryObjectStore {
    pub objects: Mutex<HashMap<(String, String), Vec<u8>>>,
    pub fail: bool,
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, bucket: &str, key: &str, bytes: Vec<u8>) -> Result<String, LaughGenError> {
        if self.fail {
            return Err(LaughGenError::AwsError("s3 put_object: access denied".to_string()));
        }
        self.objects
            .lock()
            .unwrap()
            .insert((bucket.to_string(), key.to_string()), bytes);
        Ok(key.to_string())
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, LaughGenError> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| LaughGenError::FetchError(format!("{bucket}/{key} missing")))
    }
}

pub struct StubCaptioner {
    pub result: Result<String, String>,
    pub prompts: Mutex<Vec<Option<String>>>,
    pub delay: Option<Duration>,
}

impl StubCaptioner {
    pub fn ok(caption: &str) -> Arc<Self> {
        Arc::new(Self {
            result: Ok(caption.to_string()),
            prompts: Mutex::new(Vec::new()),
            delay: None,
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            result: Err("endpoint unavailable".to_string()),
            prompts: Mutex::new(Vec::new()),
            delay: None,
        })
    }

    pub fn slow(caption: &str, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            result: Ok(caption.to_string()),
            prompts: Mutex::new(Vec::new()),
            delay: Some(delay),
        })
    }
}

#[async_trait]
impl CaptionModel for StubCaptioner {
    async fn caption(&self, _image_url: &str, prompt: Option<&str>) -> Result<String, LaughGenError> {
        self.prompts.lock().unwrap().push(prompt.map(ToString::to_string));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.result.clone().map_err(LaughGenError::AwsError)
    }
}

/// Recognition stub serving both celebrity and text detection.
pub struct StubRecognition {
    pub celebrities: Result<Vec<String>, String>,
    pub text: Result<Vec<String>, String>,
    pub seen: Mutex<Vec<ObjectRef>>,
}

impl StubRecognition {
    pub fn new(celebrities: Result<Vec<&str>, &str>, text: Result<Vec<&str>, &str>) -> Arc<Self> {
        Arc::new(Self {
            celebrities: owned(celebrities),
            text: owned(text),
            seen: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl CelebrityRecognizer for StubRecognition {
    async fn recognize(&self, image: &ObjectRef) -> Result<Vec<String>, LaughGenError> {
        self.seen.lock().unwrap().push(image.clone());
        self.celebrities.clone().map_err(LaughGenError::AwsError)
    }
}

#[async_trait]
impl TextDetector for StubRecognition {
    async fn detect_text(&self, image: &ObjectRef) -> Result<Vec<String>, LaughGenError> {
        self.seen.lock().unwrap().push(image.clone());
        self.text.clone().map_err(LaughGenError::AwsError)
    }
}

fn owned(r: Result<Vec<&str>, &str>) -> Result<Vec<String>, String> {
    r.map(|v| v.into_iter().map(ToString::to_string).collect())
        .map_err(ToString::to_string)
}

pub fn funny_cat() -> Item {
    Item::new("abc123", "Funny cat").with_media_url("https://x/cat.jpg")
}

pub fn cat_bundle() -> EnrichmentBundle {
    EnrichmentBundle {
        caption: "a cat sitting on a chair".to_string(),
        entities: vec![],
        detected_text: vec!["MEOW".to_string()],
    }
}

/// Workflow over an in-memory ledger with the given enricher and generator.
pub fn workflow(
    dedup: Arc<dyn DedupStore>,
    enricher: Arc<dyn Enricher>,
    generator: Arc<ScriptedGenerator>,
) -> ReplyWorkflow {
    ReplyWorkflow::new(
        dedup,
        enricher,
        ResponseGenerator::new(generator, TIMEOUT),
        TIMEOUT,
    )
}

pub fn memory_ledger() -> Arc<InMemoryDedupStore> {
    Arc::new(InMemoryDedupStore::new())
}
