pub mod image_client;
pub mod text_client;

use crate::{config::BedrockConfig, error::StoryError};
use aws_sdk_bedrockruntime::{
    error::{ProvideErrorMetadata, SdkError},
    Client,
};

pub use image_client::BedrockImageClient;
pub use text_client::BedrockTextClient;

/// Builds a runtime client from explicit credentials, or from the default
/// AWS chain when none are configured.
pub async fn connect(bedrock_config: &BedrockConfig) -> Client {
    let aws_config = if let (Some(access_key), Some(secret_key)) =
        (&bedrock_config.access_key, &bedrock_config.secret_key)
    {
        aws_config::from_env()
            .credentials_provider(aws_sdk_bedrockruntime::config::Credentials::new(
                access_key,
                secret_key,
                None,
                None,
                "kahanikaar",
            ))
            .region(aws_sdk_bedrockruntime::config::Region::new(
                bedrock_config
                    .region
                    .clone()
                    .unwrap_or_else(|| "us-east-1".to_string()),
            ))
            .load()
            .await
    } else {
        aws_config::load_from_env().await
    };

    Client::new(&aws_config)
}

pub(crate) fn invoke_failure<E, R>(model_id: &str, e: SdkError<E, R>) -> StoryError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    log::error!("Bedrock invocation of {} failed: {:?}", model_id, e);
    match e.as_service_error() {
        Some(service_error) => StoryError::upstream(
            None,
            format!(
                "Bedrock service error: {} - {}",
                service_error.code().unwrap_or("unknown"),
                service_error.message().unwrap_or("no message")
            ),
        ),
        None => StoryError::AwsError(format!("AWS SDK error: {}", e)),
    }
}
