//! Reddit API client module
//!
//! Script-app OAuth (password grant), post lookup, subreddit listings and
//! comment replies over plain HTTPS.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{info, warn};

use crate::core::models::Item;
use crate::core::ports::{PostSource, RedditCredentials, ReplySink};
use crate::errors::LaughGenError;
use crate::utils::links::post_fullname;

const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
const API_BASE: &str = "https://oauth.reddit.com";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<ListingChild>,
}

#[derive(Debug, Deserialize)]
struct ListingChild {
    data: PostData,
}

#[derive(Debug, Deserialize)]
struct PostData {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    selftext: String,
    #[serde(default)]
    url: Option<String>,
}

impl From<PostData> for Item {
    fn from(post: PostData) -> Self {
        Item {
            id: post.id,
            title: post.title,
            body: post.selftext,
            media_url: post.url.filter(|u| !u.is_empty()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CommentResponse {
    json: CommentJson,
}

#[derive(Debug, Deserialize)]
struct CommentJson {
    #[serde(default)]
    errors: Vec<serde_json::Value>,
}

/// Which listing the scheduled run enumerates.
#[derive(Debug, Clone)]
pub struct ListingConfig {
    pub subreddit: String,
    pub window: String,
    pub limit: u32,
}

/// Authenticated Reddit client. One instance per invocation.
pub struct RedditClient {
    http: Client,
    token: String,
    user_agent: String,
    listing: ListingConfig,
}

impl RedditClient {
    /// Exchange script-app credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token endpoint is unreachable or refuses the credentials.
    pub async fn connect(
        http: Client,
        credentials: &RedditCredentials,
        listing: ListingConfig,
    ) -> Result<Self, LaughGenError> {
        let user_agent = credentials
            .user_agent
            .clone()
            .unwrap_or_else(|| format!("laughgen:v0.1.0 (by u/{})", credentials.username));

        let strategy = ExponentialBackoff::from_millis(200).map(jitter).take(3);
        let token = RetryIf::spawn(
            strategy,
            || request_token(&http, credentials, &user_agent),
            |e: &LaughGenError| matches!(e, LaughGenError::HttpError(_)),
        )
        .await?;

        info!(subreddit = %listing.subreddit, "Authenticated with Reddit");
        Ok(Self {
            http,
            token,
            user_agent,
            listing,
        })
    }

    async fn get_listing(&self, path: &str, query: &[(&str, String)]) -> Result<Vec<Item>, LaughGenError> {
        let resp = self
            .http
            .get(format!("{API_BASE}{path}"))
            .bearer_auth(&self.token)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .query(query)
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(LaughGenError::FetchError(format!("{path} not found")));
        }
        if !status.is_success() {
            let body = resp
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read body>".to_string());
            return Err(LaughGenError::FetchError(format!(
                "GET {path} failed: status={status} body={body}"
            )));
        }

        let body = resp.text().await?;
        parse_listing(&body)
    }
}

async fn request_token(
    http: &Client,
    credentials: &RedditCredentials,
    user_agent: &str,
) -> Result<String, LaughGenError> {
    let resp = http
        .post(TOKEN_URL)
        .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
        .header(reqwest::header::USER_AGENT, user_agent)
        .form(&[
            ("grant_type", "password"),
            ("username", credentials.username.as_str()),
            ("password", credentials.user_password.as_str()),
        ])
        .send()
        .await?;

    let status = resp.status();
    if status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(LaughGenError::HttpError(format!(
            "token endpoint returned {status}"
        )));
    }

    let token: TokenResponse = resp.json().await?;
    match (token.access_token, token.error) {
        (Some(access_token), _) => Ok(access_token),
        (None, Some(error)) => Err(LaughGenError::FetchError(format!(
            "token request refused: {error}"
        ))),
        (None, None) => Err(LaughGenError::FetchError(format!(
            "token request failed with status {status}"
        ))),
    }
}

fn parse_listing(body: &str) -> Result<Vec<Item>, LaughGenError> {
    let listing: Listing = serde_json::from_str(body)?;
    Ok(listing
        .data
        .children
        .into_iter()
        .map(|child| Item::from(child.data))
        .collect())
}

fn check_comment_response(body: &str) -> Result<(), LaughGenError> {
    let parsed: CommentResponse = serde_json::from_str(body)?;
    if parsed.json.errors.is_empty() {
        Ok(())
    } else {
        Err(LaughGenError::HttpError(format!(
            "comment rejected: {}",
            serde_json::Value::Array(parsed.json.errors)
        )))
    }
}

#[async_trait]
impl PostSource for RedditClient {
    async fn fetch_post(&self, post_id: &str) -> Result<Item, LaughGenError> {
        let items = self
            .get_listing("/api/info", &[("id", post_fullname(post_id)), ("raw_json", "1".to_string())])
            .await?;
        items
            .into_iter()
            .next()
            .ok_or_else(|| LaughGenError::FetchError(format!("post {post_id} not found")))
    }

    async fn recent_posts(&self) -> Result<Vec<Item>, LaughGenError> {
        let path = format!("/r/{}/top", self.listing.subreddit);
        let items = self
            .get_listing(
                &path,
                &[
                    ("t", self.listing.window.clone()),
                    ("limit", self.listing.limit.to_string()),
                    ("raw_json", "1".to_string()),
                ],
            )
            .await?;
        info!(count = items.len(), subreddit = %self.listing.subreddit, "Listed recent posts");
        Ok(items)
    }
}

#[async_trait]
impl ReplySink for RedditClient {
    async fn post_reply(&self, item_id: &str, text: &str) -> Result<(), LaughGenError> {
        let thing_id = post_fullname(item_id);
        let resp = self
            .http
            .post(format!("{API_BASE}/api/comment"))
            .bearer_auth(&self.token)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .form(&[
                ("api_type", "json"),
                ("thing_id", thing_id.as_str()),
                ("text", text),
            ])
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            warn!(%status, item_id, "Reply request failed");
            return Err(LaughGenError::HttpError(format!(
                "POST /api/comment failed: status={status} body={body}"
            )));
        }
        check_comment_response(&body)?;
        info!(item_id, "Posted reply");
        Ok(())
    }
}
