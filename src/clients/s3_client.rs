use async_trait::async_trait;
use aws_sdk_s3::Client as AwsS3Client;
use aws_sdk_s3::primitives::ByteStream;
use tracing::info;

use crate::core::ports::ObjectStore;
use crate::errors::LaughGenError;
use crate::utils::mime::content_type_for;

pub struct S3ObjectStore {
    client: AwsS3Client,
}

impl S3ObjectStore {
    pub fn new(client: AwsS3Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(&self, bucket: &str, key: &str, bytes: Vec<u8>) -> Result<String, LaughGenError> {
        let size = bytes.len();
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type(content_type_for(key))
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| LaughGenError::AwsError(format!("s3 put_object {bucket}/{key}: {e}")))?;

        info!(bucket, key, size, "Staged image");
        Ok(key.to_string())
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, LaughGenError> {
        let resp = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| LaughGenError::AwsError(format!("s3 get_object {bucket}/{key}: {e}")))?;

        let data = resp
            .body
            .collect()
            .await
            .map_err(|e| LaughGenError::AwsError(format!("s3 read body {bucket}/{key}: {e}")))?;
        Ok(data.into_bytes().to_vec())
    }
}
