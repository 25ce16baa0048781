//! DynamoDB-backed ledger of processed posts.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client as DynamoClient;
use aws_sdk_dynamodb::types::AttributeValue;
use tracing::debug;

use crate::core::models::ProcessedRecord;
use crate::core::ports::DedupStore;
use crate::errors::LaughGenError;

pub const KEY_ATTRIBUTE: &str = "submissionId";
pub const PROCESSED_AT_ATTRIBUTE: &str = "processedAt";

/// `check_and_mark` is a single conditional `PutItem`
/// (`attribute_not_exists(submissionId)`), so concurrent invocations racing
/// on the same id see exactly one winner.
pub struct DynamoDedupStore {
    client: DynamoClient,
    table: String,
}

impl DynamoDedupStore {
    pub fn new(client: DynamoClient, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }

    /// `Ok(true)` if the record was written, `Ok(false)` if the key already existed.
    async fn put_if_absent(&self, record: &ProcessedRecord) -> Result<bool, LaughGenError> {
        let result = self
            .client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(record_attributes(record)))
            .condition_expression("attribute_not_exists(#id)")
            .expression_attribute_names("#id", KEY_ATTRIBUTE)
            .send()
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(e)
                if e.as_service_error()
                    .is_some_and(|se| se.is_conditional_check_failed_exception()) =>
            {
                debug!(item_id = %record.item_id, "Conditional write lost, already processed");
                Ok(false)
            }
            Err(e) => Err(LaughGenError::AwsError(format!(
                "dynamodb put_item {}: {e}",
                self.table
            ))),
        }
    }
}

fn record_attributes(record: &ProcessedRecord) -> HashMap<String, AttributeValue> {
    HashMap::from([
        (
            KEY_ATTRIBUTE.to_string(),
            AttributeValue::S(record.item_id.clone()),
        ),
        (
            PROCESSED_AT_ATTRIBUTE.to_string(),
            AttributeValue::S(record.processed_at.to_rfc3339()),
        ),
    ])
}

#[async_trait]
impl DedupStore for DynamoDedupStore {
    async fn has_been_processed(&self, item_id: &str) -> Result<bool, LaughGenError> {
        let resp = self
            .client
            .get_item()
            .table_name(&self.table)
            .key(KEY_ATTRIBUTE, AttributeValue::S(item_id.to_string()))
            .consistent_read(true)
            .send()
            .await
            .map_err(|e| LaughGenError::AwsError(format!("dynamodb get_item {}: {e}", self.table)))?;
        Ok(resp.item().is_some())
    }

    async fn mark_processed(&self, item_id: &str) -> Result<(), LaughGenError> {
        self.put_if_absent(&ProcessedRecord::now(item_id)).await?;
        Ok(())
    }

    async fn check_and_mark(&self, item_id: &str) -> Result<bool, LaughGenError> {
        self.put_if_absent(&ProcessedRecord::now(item_id)).await
    }
}
