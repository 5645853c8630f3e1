use crate::{
    error::Result,
    models::{ImagePayload, NarrativeRequest},
};
use async_trait::async_trait;

/// Text model that writes the story. Returns the model's raw output.
#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    async fn generate(&self, request: &NarrativeRequest) -> Result<String>;

    fn model_id(&self) -> &str;
}

/// Image model that draws one scene.
#[async_trait]
pub trait IllustrationGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<ImagePayload>;

    fn model_id(&self) -> &str;
}
