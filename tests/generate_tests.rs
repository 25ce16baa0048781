mod common;

use std::time::Duration;

use laughgen::core::models::{GenerationCandidate, GenerationParameters};
use laughgen::features::{ResponseGenerator, REJECTION_SENTINEL};
use laughgen::LaughGenError;

use common::{ScriptedGenerator, TIMEOUT};

#[tokio::test]
async fn test_returns_first_candidate() {
    let backend = ScriptedGenerator::responses(vec![Ok(vec![
        GenerationCandidate {
            generated_text: "first".to_string(),
        },
        GenerationCandidate {
            generated_text: "second".to_string(),
        },
    ])]);
    let generator = ResponseGenerator::new(backend.clone(), TIMEOUT);

    let reply = generator
        .generate("prompt", &GenerationParameters::default())
        .await
        .unwrap();
    assert_eq!(reply, "first");
    assert_eq!(backend.call_count(), 1);
}

#[tokio::test]
async fn test_rejection_retries_once_with_lower_temperature() {
    let backend = ScriptedGenerator::texts(&[REJECTION_SENTINEL, "That cat is plotting something."]);
    let generator = ResponseGenerator::new(backend.clone(), TIMEOUT);

    let reply = generator
        .generate("prompt", &GenerationParameters::default())
        .await
        .unwrap();

    assert_eq!(reply, "That cat is plotting something.");
    assert_eq!(backend.call_count(), 2);
    assert_eq!(backend.temperatures(), vec![0.9, 0.6]);

    let requests = backend.requests.lock().unwrap();
    assert_eq!(requests[0].prompt, requests[1].prompt);
    assert_eq!(requests[0].parameters.max_new_tokens, requests[1].parameters.max_new_tokens);
}

#[tokio::test]
async fn test_second_rejection_is_surfaced() {
    let backend = ScriptedGenerator::texts(&[REJECTION_SENTINEL, REJECTION_SENTINEL, "never used"]);
    let generator = ResponseGenerator::new(backend.clone(), TIMEOUT);

    let err = generator
        .generate("prompt", &GenerationParameters::default())
        .await
        .unwrap_err();

    match err {
        LaughGenError::GenerationRejected(text) => assert_eq!(text, REJECTION_SENTINEL),
        other => panic!("Expected GenerationRejected, got: {other:?}"),
    }
    assert_eq!(backend.call_count(), 2);
}

#[tokio::test]
async fn test_retry_temperature_never_raises() {
    let backend = ScriptedGenerator::texts(&[REJECTION_SENTINEL, "ok"]);
    let generator = ResponseGenerator::new(backend.clone(), TIMEOUT).with_retry_temperature(0.6);
    let params = GenerationParameters {
        temperature: 0.3,
        ..GenerationParameters::default()
    };

    generator.generate("prompt", &params).await.unwrap();
    assert_eq!(backend.temperatures(), vec![0.3, 0.3]);
}

#[tokio::test]
async fn test_escape_sequences_are_decoded_once() {
    let backend = ScriptedGenerator::texts(&[r#"Me: \"no\"\nAlso me: yes \ud83d\ude02"#]);
    let generator = ResponseGenerator::new(backend, TIMEOUT);

    let reply = generator
        .generate("prompt", &GenerationParameters::default())
        .await
        .unwrap();
    assert_eq!(reply, "Me: \"no\"\nAlso me: yes 😂");
}

#[tokio::test]
async fn test_plain_reply_is_unchanged() {
    let text = "When the cat hears the can opener from three rooms away";
    let backend = ScriptedGenerator::texts(&[text]);
    let generator = ResponseGenerator::new(backend, TIMEOUT);

    let reply = generator
        .generate("prompt", &GenerationParameters::default())
        .await
        .unwrap();
    assert_eq!(reply, text);
}

#[tokio::test]
async fn test_empty_candidate_list_is_an_error() {
    let backend = ScriptedGenerator::responses(vec![Ok(vec![])]);
    let generator = ResponseGenerator::new(backend, TIMEOUT);

    let err = generator
        .generate("prompt", &GenerationParameters::default())
        .await
        .unwrap_err();
    assert!(matches!(err, LaughGenError::GenerationError(_)));
}

#[tokio::test]
async fn test_backend_timeout_is_reported() {
    let backend = ScriptedGenerator::slow(Duration::from_secs(5));
    let generator = ResponseGenerator::new(backend, Duration::from_millis(20));

    let err = generator
        .generate("prompt", &GenerationParameters::default())
        .await
        .unwrap_err();
    assert!(matches!(err, LaughGenError::TimeoutError { .. }));
}
