use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LaughGenError {
    #[error("Invalid request: {0}")]
    InputError(String),

    #[error("Failed to fetch resource: {0}")]
    FetchError(String),

    #[error("Image enrichment failed: {0}")]
    EnrichmentError(String),

    #[error("Generation rejected by upstream filter: {0}")]
    GenerationRejected(String),

    #[error("Failed to generate reply: {0}")]
    GenerationError(String),

    #[error("{operation} timed out after {}s", .after.as_secs_f32())]
    TimeoutError {
        operation: String,
        after: Duration,
    },

    #[error("Failed to interact with AWS services: {0}")]
    AwsError(String),

    #[error("Failed to send HTTP request: {0}")]
    HttpError(String),

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

impl LaughGenError {
    /// HTTP-equivalent status for the trigger response.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            LaughGenError::InputError(_) => 400,
            _ => 500,
        }
    }
}

impl From<reqwest::Error> for LaughGenError {
    fn from(error: reqwest::Error) -> Self {
        LaughGenError::HttpError(error.to_string())
    }
}

impl From<serde_json::Error> for LaughGenError {
    fn from(error: serde_json::Error) -> Self {
        LaughGenError::ParseError(error.to_string())
    }
}

impl From<anyhow::Error> for LaughGenError {
    fn from(error: anyhow::Error) -> Self {
        LaughGenError::ConfigError(format!("{error:#}"))
    }
}
