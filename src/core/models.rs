use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One post to reply to. Immutable once fetched from the post source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub body: String,
    /// Link target of the post; only image links trigger enrichment.
    #[serde(default)]
    pub media_url: Option<String>,
}

impl Item {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            body: String::new(),
            media_url: None,
        }
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    #[must_use]
    pub fn with_media_url(mut self, url: impl Into<String>) -> Self {
        self.media_url = Some(url.into());
        self
    }
}

/// Signals derived from an item's image. Built fresh per item and consumed once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichmentBundle {
    pub caption: String,
    pub entities: Vec<String>,
    pub detected_text: Vec<String>,
}

impl EnrichmentBundle {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.caption.is_empty() && self.entities.is_empty() && self.detected_text.is_empty()
    }
}

/// Ledger entry meaning "this item has been handled". Written once, never updated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedRecord {
    pub item_id: String,
    pub processed_at: DateTime<Utc>,
}

impl ProcessedRecord {
    pub fn now(item_id: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            processed_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParameters {
    pub max_new_tokens: u32,
    pub top_p: f32,
    pub temperature: f32,
    #[serde(rename = "stop")]
    pub stop_sequences: Vec<String>,
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self {
            max_new_tokens: 128,
            top_p: 0.9,
            temperature: 0.9,
            stop_sequences: vec!["</s>".to_string()],
        }
    }
}

/// Request body for a text-generation-inference endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationRequest {
    #[serde(rename = "inputs")]
    pub prompt: String,
    pub parameters: GenerationParameters,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GenerationCandidate {
    pub generated_text: String,
}

/// Reference to an object held by the object store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRef {
    pub bucket: String,
    pub key: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReplyOutcome {
    pub item_id: String,
    pub prompt: String,
    pub reply: String,
    pub enriched: bool,
    pub posted: bool,
}

/// Terminal state of one successful workflow run. Failures surface as errors.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowOutcome {
    Skipped { item_id: String },
    Replied(ReplyOutcome),
}

impl WorkflowOutcome {
    #[must_use]
    pub fn item_id(&self) -> &str {
        match self {
            WorkflowOutcome::Skipped { item_id } => item_id,
            WorkflowOutcome::Replied(outcome) => &outcome.item_id,
        }
    }
}
