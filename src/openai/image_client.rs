use super::{endpoint, transport_failure, upstream_failure};
use crate::{
    config::OpenAiConfig,
    error::{Result, StoryError},
    models::{ImageGenerationRequest, ImageGenerationResponse, ImagePayload},
    story::IllustrationGenerator,
};
use async_trait::async_trait;

#[derive(Clone)]
pub struct OpenAiImageClient {
    http: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
    size: String,
    quality: String,
    output_format: String,
}

impl OpenAiImageClient {
    pub fn new(config: &OpenAiConfig) -> Result<Self> {
        Ok(Self {
            http: reqwest::Client::new(),
            url: endpoint(&config.base_url, "images/generations"),
            api_key: config.require_api_key()?.to_string(),
            model: config.image_model.clone(),
            size: config.image_size.clone(),
            quality: config.image_quality.clone(),
            output_format: config.image_format.clone(),
        })
    }

    fn build_request(&self, prompt: &str) -> ImageGenerationRequest {
        ImageGenerationRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            size: self.size.clone(),
            quality: self.quality.clone(),
            output_format: self.output_format.clone(),
        }
    }

    fn mime_type(&self) -> String {
        match self.output_format.as_str() {
            "jpg" | "jpeg" => "image/jpeg".to_string(),
            other => format!("image/{}", other),
        }
    }

    fn first_image(&self, response: ImageGenerationResponse) -> Result<ImagePayload> {
        response
            .data
            .into_iter()
            .next()
            .and_then(|datum| datum.b64_json)
            .map(|data| ImagePayload::new(data, self.mime_type()))
            .ok_or_else(|| StoryError::upstream(None, "no images generated"))
    }
}

#[async_trait]
impl IllustrationGenerator for OpenAiImageClient {
    async fn generate(&self, prompt: &str) -> Result<ImagePayload> {
        let body = self.build_request(prompt);
        log::info!("Generating image with model: {}", self.model);

        let response = self
            .http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_failure("image", e))?;

        if !response.status().is_success() {
            return Err(upstream_failure("image", response).await);
        }

        let status = response.status().as_u16();
        let images: ImageGenerationResponse = response.json().await.map_err(|e| {
            StoryError::upstream(Some(status), format!("unreadable image body: {}", e))
        })?;
        self.first_image(images)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}
