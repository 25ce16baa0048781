use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::models::ProcessedRecord;
use super::ports::DedupStore;
use crate::errors::LaughGenError;

/// Process-local ledger. The map insert under the lock is the conditional write.
#[derive(Debug, Default)]
pub struct InMemoryDedupStore {
    records: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl InMemoryDedupStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn insert_if_absent(&self, record: ProcessedRecord) -> Result<bool, LaughGenError> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| LaughGenError::AwsError("dedup ledger lock poisoned".to_string()))?;
        if records.contains_key(&record.item_id) {
            return Ok(false);
        }
        records.insert(record.item_id, record.processed_at);
        Ok(true)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DedupStore for InMemoryDedupStore {
    async fn has_been_processed(&self, item_id: &str) -> Result<bool, LaughGenError> {
        let records = self
            .records
            .lock()
            .map_err(|_| LaughGenError::AwsError("dedup ledger lock poisoned".to_string()))?;
        Ok(records.contains_key(item_id))
    }

    async fn mark_processed(&self, item_id: &str) -> Result<(), LaughGenError> {
        self.insert_if_absent(ProcessedRecord::now(item_id))?;
        Ok(())
    }

    async fn check_and_mark(&self, item_id: &str) -> Result<bool, LaughGenError> {
        self.insert_if_absent(ProcessedRecord::now(item_id))
    }
}
