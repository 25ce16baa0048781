use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::core::models::{GenerationParameters, GenerationRequest};
use crate::core::ports::TextGenerator;
use crate::errors::LaughGenError;
use crate::utils::deadline::bounded;
use crate::utils::escapes::decode_escapes;

/// What the text-generation endpoint returns when its safety filter refuses the prompt.
pub const REJECTION_SENTINEL: &str = "[removed]";

pub const DEFAULT_RETRY_TEMPERATURE: f32 = 0.6;

pub struct ResponseGenerator {
    backend: Arc<dyn TextGenerator>,
    timeout: Duration,
    retry_temperature: f32,
}

impl ResponseGenerator {
    pub fn new(backend: Arc<dyn TextGenerator>, timeout: Duration) -> Self {
        Self {
            backend,
            timeout,
            retry_temperature: DEFAULT_RETRY_TEMPERATURE,
        }
    }

    #[must_use]
    pub fn with_retry_temperature(mut self, temperature: f32) -> Self {
        self.retry_temperature = temperature;
        self
    }

    /// Generate a reply for `prompt`.
    ///
    /// A rejection sentinel triggers exactly one retry at the lower retry
    /// temperature. A second rejection is returned as `GenerationRejected`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails, times out, returns no
    /// candidates, or rejects the prompt twice.
    pub async fn generate(
        &self,
        prompt: &str,
        parameters: &GenerationParameters,
    ) -> Result<String, LaughGenError> {
        let mut request = GenerationRequest {
            prompt: prompt.to_string(),
            parameters: parameters.clone(),
        };

        let mut text = self.request_once(&request).await?;
        if text == REJECTION_SENTINEL {
            let lowered = self.retry_temperature.min(parameters.temperature);
            warn!(
                from = parameters.temperature,
                to = lowered,
                "Generation rejected, retrying once with lower temperature"
            );
            request.parameters.temperature = lowered;
            text = self.request_once(&request).await?;
            if text == REJECTION_SENTINEL {
                return Err(LaughGenError::GenerationRejected(text));
            }
        }

        let reply = decode_escapes(&text);
        info!(reply_len = reply.len(), "Generated reply");
        Ok(reply)
    }

    async fn request_once(&self, request: &GenerationRequest) -> Result<String, LaughGenError> {
        let candidates = bounded("text generation", self.timeout, self.backend.generate(request)).await?;
        candidates
            .into_iter()
            .next()
            .map(|candidate| candidate.generated_text)
            .ok_or_else(|| LaughGenError::GenerationError("no candidates returned".to_string()))
    }
}
