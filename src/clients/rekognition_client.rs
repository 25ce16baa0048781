use async_trait::async_trait;
use aws_sdk_rekognition::Client as AwsRekognitionClient;
use aws_sdk_rekognition::types::{Image, S3Object};

use crate::core::models::ObjectRef;
use crate::core::ports::{CelebrityRecognizer, TextDetector};
use crate::errors::LaughGenError;

/// Celebrity recognition and text detection against staged images.
pub struct RekognitionClient {
    client: AwsRekognitionClient,
}

impl RekognitionClient {
    pub fn new(client: AwsRekognitionClient) -> Self {
        Self { client }
    }
}

fn s3_image(image: &ObjectRef) -> Image {
    Image::builder()
        .s3_object(
            S3Object::builder()
                .bucket(&image.bucket)
                .name(&image.key)
                .build(),
        )
        .build()
}

#[async_trait]
impl CelebrityRecognizer for RekognitionClient {
    async fn recognize(&self, image: &ObjectRef) -> Result<Vec<String>, LaughGenError> {
        let resp = self
            .client
            .recognize_celebrities()
            .image(s3_image(image))
            .send()
            .await
            .map_err(|e| LaughGenError::AwsError(format!("rekognition recognize_celebrities: {e}")))?;

        Ok(resp
            .celebrity_faces()
            .iter()
            .filter_map(|celebrity| celebrity.name())
            .map(ToString::to_string)
            .collect())
    }
}

#[async_trait]
impl TextDetector for RekognitionClient {
    async fn detect_text(&self, image: &ObjectRef) -> Result<Vec<String>, LaughGenError> {
        let resp = self
            .client
            .detect_text()
            .image(s3_image(image))
            .send()
            .await
            .map_err(|e| LaughGenError::AwsError(format!("rekognition detect_text: {e}")))?;

        Ok(resp
            .text_detections()
            .iter()
            .filter_map(|detection| detection.detected_text())
            .map(ToString::to_string)
            .collect())
    }
}
