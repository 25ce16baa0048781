use anyhow::Context;
use async_trait::async_trait;
use aws_sdk_ssm::Client as SsmClient;

use crate::core::ports::{RedditCredentials, SecretProvider};
use crate::errors::LaughGenError;

/// Reads Reddit script-app credentials from a SecureString parameter holding JSON.
pub struct SsmSecretProvider {
    client: SsmClient,
    parameter: String,
}

impl SsmSecretProvider {
    pub fn new(client: SsmClient, parameter: impl Into<String>) -> Self {
        Self {
            client,
            parameter: parameter.into(),
        }
    }
}

/// # Errors
///
/// Returns an error if the JSON is malformed or a required field is missing.
pub fn parse_credentials(raw: &str) -> Result<RedditCredentials, LaughGenError> {
    let credentials: RedditCredentials =
        serde_json::from_str(raw).context("reddit credentials parameter")?;
    Ok(credentials)
}

#[async_trait]
impl SecretProvider for SsmSecretProvider {
    async fn reddit_credentials(&self) -> Result<RedditCredentials, LaughGenError> {
        let resp = self
            .client
            .get_parameter()
            .name(&self.parameter)
            .with_decryption(true)
            .send()
            .await
            .map_err(|e| LaughGenError::AwsError(format!("ssm get_parameter {}: {e}", self.parameter)))?;

        let Some(value) = resp.parameter().and_then(|p| p.value()) else {
            return Err(LaughGenError::ConfigError(format!(
                "parameter {} has no value",
                self.parameter
            )));
        };
        parse_credentials(value)
    }
}
