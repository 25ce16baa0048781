//! Client modules for external API interactions

pub mod dynamo_client;
pub mod image_client;
pub mod reddit_client;
pub mod rekognition_client;
pub mod s3_client;
pub mod sagemaker_client;
pub mod ssm_client;

pub use dynamo_client::DynamoDedupStore;
pub use image_client::HttpImageFetcher;
pub use reddit_client::{ListingConfig, RedditClient};
pub use rekognition_client::RekognitionClient;
pub use s3_client::S3ObjectStore;
pub use sagemaker_client::{SageMakerCaptioner, SageMakerTextGenerator};
pub use ssm_client::SsmSecretProvider;
