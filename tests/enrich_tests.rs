mod common;

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use laughgen::core::models::{EnrichmentBundle, ObjectRef};
use laughgen::core::ports::ObjectStore;
use laughgen::features::{Enricher, EnrichmentCollector, StagingArea};

use common::{MemoryObjectStore, StubCaptioner, StubFetcher, StubRecognition, TIMEOUT};

fn staging() -> StagingArea {
    StagingArea {
        bucket: "laughgen-images".to_string(),
        key_prefix: "reddit/funny/inference/posts".to_string(),
    }
}

fn collector(
    fetcher: Arc<StubFetcher>,
    store: Arc<MemoryObjectStore>,
    captioner: Arc<StubCaptioner>,
    recognition: Arc<StubRecognition>,
    timeout: Duration,
) -> EnrichmentCollector {
    EnrichmentCollector::new(
        fetcher,
        store,
        captioner,
        recognition.clone(),
        recognition,
        staging(),
        Some("An image of ".to_string()),
        timeout,
    )
}

#[tokio::test]
async fn test_collects_all_signals_in_order() {
    let store = Arc::new(MemoryObjectStore::default());
    let captioner = StubCaptioner::ok("an image of a cat wearing sunglasses");
    let recognition = StubRecognition::new(
        Ok(vec!["Keanu Reeves", "Nicolas Cage"]),
        Ok(vec!["WHEN", "YOU", "SEE", "IT"]),
    );
    let enricher = collector(
        StubFetcher::ok(),
        store.clone(),
        captioner.clone(),
        recognition.clone(),
        TIMEOUT,
    );

    let bundle = enricher.collect("https://i.redd.it/abc123.jpg").await;

    assert_eq!(bundle.caption, "an image of a cat wearing sunglasses");
    assert_eq!(bundle.entities, vec!["Keanu Reeves", "Nicolas Cage"]);
    assert_eq!(bundle.detected_text, vec!["WHEN", "YOU", "SEE", "IT"]);
    assert!(!bundle.is_empty());
    assert_eq!(
        captioner.prompts.lock().unwrap().as_slice(),
        [Some("An image of ".to_string())]
    );

    let expected = ObjectRef {
        bucket: "laughgen-images".to_string(),
        key: "reddit/funny/inference/posts/abc123.jpg".to_string(),
    };
    assert!(recognition.seen.lock().unwrap().iter().all(|r| *r == expected));
    let staged = store.get(&expected.bucket, &expected.key).await.unwrap();
    assert_eq!(staged, b"\x89PNG fake".to_vec());
}

#[tokio::test]
async fn test_unfetchable_image_yields_empty_bundle() {
    let fetcher = StubFetcher::failing();
    let captioner = StubCaptioner::ok("never");
    let recognition = StubRecognition::new(Ok(vec!["never"]), Ok(vec!["never"]));
    let enricher = collector(
        fetcher.clone(),
        Arc::new(MemoryObjectStore::default()),
        captioner.clone(),
        recognition.clone(),
        TIMEOUT,
    );

    let bundle = enricher.collect("https://i.redd.it/gone.jpg").await;

    assert_eq!(bundle, EnrichmentBundle::default());
    assert!(bundle.is_empty());
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    assert!(captioner.prompts.lock().unwrap().is_empty());
    assert!(recognition.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_caption_does_not_block_recognition() {
    let recognition = StubRecognition::new(Ok(vec![]), Ok(vec!["MEOW"]));
    let enricher = collector(
        StubFetcher::ok(),
        Arc::new(MemoryObjectStore::default()),
        StubCaptioner::failing(),
        recognition,
        TIMEOUT,
    );

    let bundle = enricher.collect("https://x/cat.jpg").await;

    assert_eq!(bundle.caption, "");
    assert!(bundle.entities.is_empty());
    assert_eq!(bundle.detected_text, vec!["MEOW"]);
}

#[tokio::test]
async fn test_failed_celebrity_call_keeps_other_fields() {
    let recognition = StubRecognition::new(Err("throttled"), Ok(vec!["MEOW"]));
    let enricher = collector(
        StubFetcher::ok(),
        Arc::new(MemoryObjectStore::default()),
        StubCaptioner::ok("a cat sitting on a chair"),
        recognition,
        TIMEOUT,
    );

    let bundle = enricher.collect("https://x/cat.jpg").await;

    assert_eq!(bundle.caption, "a cat sitting on a chair");
    assert!(bundle.entities.is_empty());
    assert_eq!(bundle.detected_text, vec!["MEOW"]);
}

#[tokio::test]
async fn test_failed_upload_still_captions() {
    let store = Arc::new(MemoryObjectStore {
        fail: true,
        ..Default::default()
    });
    let recognition = StubRecognition::new(Ok(vec!["never"]), Ok(vec!["never"]));
    let enricher = collector(
        StubFetcher::ok(),
        store,
        StubCaptioner::ok("a cat sitting on a chair"),
        recognition.clone(),
        TIMEOUT,
    );

    let bundle = enricher.collect("https://x/cat.jpg").await;

    assert_eq!(bundle.caption, "a cat sitting on a chair");
    assert!(bundle.entities.is_empty());
    assert!(bundle.detected_text.is_empty());
    assert!(recognition.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_slow_caption_times_out_alone() {
    let recognition = StubRecognition::new(Ok(vec!["Nicolas Cage"]), Ok(vec![]));
    let enricher = collector(
        StubFetcher::ok(),
        Arc::new(MemoryObjectStore::default()),
        StubCaptioner::slow("too late", Duration::from_secs(5)),
        recognition,
        Duration::from_millis(50),
    );

    let bundle = enricher.collect("https://x/cat.jpg").await;

    assert_eq!(bundle.caption, "");
    assert_eq!(bundle.entities, vec!["Nicolas Cage"]);
}
