use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::core::models::GenerationParameters;
use crate::errors::LaughGenError;
use crate::utils::mime::MediaPolicy;

pub const DEFAULT_PROCESSED_TABLE: &str = "processed-reddit-submissions";
pub const DEFAULT_IMAGE_KEY_PREFIX: &str = "reddit/funny/inference/posts";
pub const DEFAULT_CREDENTIALS_PARAM: &str = "/laughgen/reddit";
pub const DEFAULT_CAPTION_PROMPT: &str = "An image of ";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub processed_table: String,
    pub image_bucket: String,
    pub image_key_prefix: String,
    pub caption_endpoint: String,
    pub llm_endpoint: String,
    pub reddit_credentials_param: String,
    pub subreddit: String,
    pub listing_window: String,
    pub listing_limit: u32,
    pub media_policy: MediaPolicy,
    pub caption_prompt: String,
    pub call_timeout: Duration,
    pub generation: GenerationParameters,
    pub retry_temperature: f32,
    pub max_concurrency: usize,
    pub dry_run: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, LaughGenError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup so tests need not touch the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, LaughGenError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| LaughGenError::ConfigError(format!("{key} is not set")))
        };
        let or_default = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let defaults = GenerationParameters::default();
        let extensions = or_default("IMAGE_EXTENSIONS", "jpg,jpeg,png");
        let case_sensitive = parse_or(&lookup, "IMAGE_EXTENSIONS_CASE_SENSITIVE", false)?;
        let stop = or_default("STOP_SEQUENCES", "</s>");

        Ok(Self {
            processed_table: or_default("PROCESSED_TABLE", DEFAULT_PROCESSED_TABLE),
            image_bucket: required("IMAGE_BUCKET")?,
            image_key_prefix: or_default("IMAGE_KEY_PREFIX", DEFAULT_IMAGE_KEY_PREFIX),
            caption_endpoint: required("CAPTION_ENDPOINT_NAME")?,
            llm_endpoint: required("LLM_ENDPOINT_NAME")?,
            reddit_credentials_param: or_default(
                "REDDIT_CREDENTIALS_PARAM",
                DEFAULT_CREDENTIALS_PARAM,
            ),
            subreddit: or_default("SUBREDDIT", "funny"),
            listing_window: or_default("LISTING_WINDOW", "hour"),
            listing_limit: parse_or(&lookup, "LISTING_LIMIT", 25)?,
            media_policy: MediaPolicy::new(split_list(&extensions, ','), case_sensitive),
            // The caption prompt is used verbatim, trailing space included.
            caption_prompt: lookup("CAPTION_PROMPT")
                .unwrap_or_else(|| DEFAULT_CAPTION_PROMPT.to_string()),
            call_timeout: Duration::from_secs(parse_or(&lookup, "CALL_TIMEOUT_SECS", 30)?),
            generation: GenerationParameters {
                max_new_tokens: parse_or(&lookup, "MAX_NEW_TOKENS", defaults.max_new_tokens)?,
                top_p: parse_or(&lookup, "TOP_P", defaults.top_p)?,
                temperature: parse_or(&lookup, "TEMPERATURE", defaults.temperature)?,
                stop_sequences: split_list(&stop, '|'),
            },
            retry_temperature: parse_or(&lookup, "RETRY_TEMPERATURE", 0.6)?,
            max_concurrency: parse_or::<usize, _>(&lookup, "MAX_CONCURRENCY", 4)?.max(1),
            dry_run: parse_or(&lookup, "DRY_RUN", false)?,
        })
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T, LaughGenError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).filter(|v| !v.trim().is_empty()) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| LaughGenError::ConfigError(format!("{key}: {e}"))),
        None => Ok(default),
    }
}

fn split_list(raw: &str, separator: char) -> Vec<String> {
    raw.split(separator)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}
