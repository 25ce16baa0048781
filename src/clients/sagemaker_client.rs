//! SageMaker inference endpoints: image captioning and text generation.

use async_trait::async_trait;
use aws_sdk_sagemakerruntime::Client as SageMakerClient;
use aws_sdk_sagemakerruntime::primitives::Blob;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::info;

use crate::core::models::{GenerationCandidate, GenerationRequest};
use crate::core::ports::{CaptionModel, TextGenerator};
use crate::errors::LaughGenError;

async fn invoke_json<T: Serialize + ?Sized>(
    client: &SageMakerClient,
    endpoint: &str,
    payload: &T,
) -> Result<Vec<u8>, LaughGenError> {
    let body = serde_json::to_vec(payload)?;
    let output = client
        .invoke_endpoint()
        .endpoint_name(endpoint)
        .content_type("application/json")
        .accept("application/json")
        .body(Blob::new(body))
        .send()
        .await
        .map_err(|e| LaughGenError::AwsError(format!("sagemaker invoke_endpoint {endpoint}: {e}")))?;

    Ok(output
        .body()
        .map(|blob| blob.as_ref().to_vec())
        .unwrap_or_default())
}

/// Caption endpoint hosting a conditional image-captioning model.
pub struct SageMakerCaptioner {
    client: SageMakerClient,
    endpoint: String,
}

impl SageMakerCaptioner {
    pub fn new(client: SageMakerClient, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl CaptionModel for SageMakerCaptioner {
    async fn caption(
        &self,
        image_url: &str,
        prompt: Option<&str>,
    ) -> Result<String, LaughGenError> {
        let mut inputs = json!({ "img_url": image_url });
        if let Some(text) = prompt {
            inputs["text"] = Value::String(text.to_string());
        }
        let raw = invoke_json(&self.client, &self.endpoint, &json!({ "inputs": inputs })).await?;
        let caption = parse_caption(&raw)?;
        info!(endpoint = %self.endpoint, caption = %caption, "Captioned image");
        Ok(caption)
    }
}

/// Text-generation-inference endpoint.
pub struct SageMakerTextGenerator {
    client: SageMakerClient,
    endpoint: String,
}

impl SageMakerTextGenerator {
    pub fn new(client: SageMakerClient, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl TextGenerator for SageMakerTextGenerator {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<Vec<GenerationCandidate>, LaughGenError> {
        #[cfg(feature = "debug-logs")]
        info!("Using generation prompt:\n{}", request.prompt);

        let raw = invoke_json(&self.client, &self.endpoint, request).await?;
        parse_candidates(&raw)
    }
}

fn caption_field(value: &Value) -> Option<String> {
    ["generated_text", "generated text"]
        .iter()
        .find_map(|key| value.get(key).and_then(Value::as_str))
        .map(|s| s.trim().to_string())
}

/// The caption model answers `{"generated_text": ...}`; some containers
/// spell the key with a space or wrap the object in a list. Non-JSON bodies
/// are taken as the caption itself.
pub fn parse_caption(raw: &[u8]) -> Result<String, LaughGenError> {
    let text = String::from_utf8_lossy(raw);
    let Ok(value) = serde_json::from_str::<Value>(&text) else {
        return Ok(text.trim().to_string());
    };

    let found = match &value {
        Value::Array(items) => items.first().and_then(caption_field),
        Value::String(s) => Some(s.trim().to_string()),
        other => caption_field(other),
    };
    found.ok_or_else(|| LaughGenError::ParseError(format!("no caption in response: {value}")))
}

pub fn parse_candidates(raw: &[u8]) -> Result<Vec<GenerationCandidate>, LaughGenError> {
    let candidates: Vec<GenerationCandidate> = serde_json::from_slice(raw)?;
    Ok(candidates)
}
