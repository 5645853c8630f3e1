use super::invoke_failure;
use crate::{
    error::{Result, StoryError},
    models::{ImagePayload, TitanImageResponse},
    story::IllustrationGenerator,
};
use async_trait::async_trait;
use aws_sdk_bedrockruntime::{primitives::Blob, Client};
use serde_json::json;

/// Scene illustration through Titan Image Generator on Bedrock.
#[derive(Clone)]
pub struct BedrockImageClient {
    client: Client,
    model_id: String,
}

impl BedrockImageClient {
    pub fn new(client: Client, model_id: impl Into<String>) -> Self {
        Self {
            client,
            model_id: model_id.into(),
        }
    }
}

fn request_payload(prompt: &str) -> serde_json::Value {
    json!({
        "taskType": "TEXT_IMAGE",
        "textToImageParams": {
            "text": prompt
        },
        "imageGenerationConfig": {
            "numberOfImages": 1,
            "width": 1024,
            "height": 1024,
            "quality": "premium",
            "cfgScale": 8.0
        }
    })
}

fn first_image(body: &[u8]) -> Result<ImagePayload> {
    let titan_response: TitanImageResponse = serde_json::from_slice(body)
        .map_err(|e| StoryError::upstream(None, format!("unreadable Titan response: {}", e)))?;

    if let Some(error) = titan_response.error {
        return Err(StoryError::upstream(None, error));
    }

    titan_response
        .images
        .into_iter()
        .next()
        .map(|data| ImagePayload::new(data, "image/png"))
        .ok_or_else(|| StoryError::upstream(None, "No images generated"))
}

#[async_trait]
impl IllustrationGenerator for BedrockImageClient {
    async fn generate(&self, prompt: &str) -> Result<ImagePayload> {
        let request_json = serde_json::to_string(&request_payload(prompt))?;

        log::info!("Generating image with model: {}", self.model_id);

        let response = self
            .client
            .invoke_model()
            .model_id(&self.model_id)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(request_json.into_bytes()))
            .send()
            .await
            .map_err(|e| invoke_failure(&self.model_id, e))?;

        first_image(response.body.as_ref())
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
