use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};

use crate::core::ports::ImageFetcher;
use crate::errors::LaughGenError;

/// Upper bound on downloaded image size.
pub const MAX_IMAGE_BYTES: usize = 20 * 1024 * 1024;

pub struct HttpImageFetcher {
    http: Client,
}

impl HttpImageFetcher {
    pub fn new(http: Client) -> Self {
        Self { http }
    }
}

/// Reject a response before reading its body: bad status, a non-image
/// content type, or a declared length over [`MAX_IMAGE_BYTES`].
fn check_head(
    status: StatusCode,
    content_type: Option<&str>,
    content_length: Option<u64>,
) -> Result<(), String> {
    if !status.is_success() {
        return Err(format!("status {status}"));
    }
    if let Some(ct) = content_type
        && !ct.trim().to_ascii_lowercase().starts_with("image/")
    {
        return Err(format!("not an image ({ct})"));
    }
    if let Some(len) = content_length
        && len > MAX_IMAGE_BYTES as u64
    {
        return Err(format!("{len} bytes exceeds limit"));
    }
    Ok(())
}

/// Body collected chunk by chunk, refusing to grow past `limit`.
struct BoundedBody {
    bytes: Vec<u8>,
    limit: usize,
}

impl BoundedBody {
    fn new(limit: usize) -> Self {
        Self {
            bytes: Vec::new(),
            limit,
        }
    }

    fn push(&mut self, chunk: &[u8]) -> Result<(), String> {
        let total = self.bytes.len() + chunk.len();
        if total > self.limit {
            return Err(format!("body exceeds {} bytes", self.limit));
        }
        self.bytes.extend_from_slice(chunk);
        Ok(())
    }

    fn finish(self) -> Result<Vec<u8>, String> {
        if self.bytes.is_empty() {
            return Err("empty body".to_string());
        }
        Ok(self.bytes)
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, LaughGenError> {
        let fail = |reason: String| LaughGenError::FetchError(format!("GET {url}: {reason}"));

        let mut resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| fail(e.to_string()))?;

        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);
        check_head(resp.status(), content_type.as_deref(), resp.content_length()).map_err(fail)?;

        let mut body = BoundedBody::new(MAX_IMAGE_BYTES);
        while let Some(chunk) = resp.chunk().await.map_err(|e| fail(e.to_string()))? {
            body.push(&chunk).map_err(fail)?;
        }
        body.finish().map_err(fail)
    }
}
