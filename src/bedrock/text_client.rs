use super::invoke_failure;
use crate::{
    error::{Result, StoryError},
    models::{AnthropicTextResponse, NarrativeRequest},
    story::NarrativeGenerator,
};
use async_trait::async_trait;
use aws_sdk_bedrockruntime::{primitives::Blob, Client};
use serde_json::json;

/// Narrative generation through an Anthropic model hosted on Bedrock.
#[derive(Clone)]
pub struct BedrockTextClient {
    client: Client,
    model_id: String,
}

impl BedrockTextClient {
    pub fn new(client: Client, model_id: impl Into<String>) -> Self {
        Self {
            client,
            model_id: model_id.into(),
        }
    }
}

fn request_payload(request: &NarrativeRequest) -> serde_json::Value {
    json!({
        "anthropic_version": "bedrock-2023-05-31",
        "max_tokens": request.max_tokens,
        "temperature": request.temperature,
        "system": request.system_prompt,
        "messages": [
            {
                "role": "user",
                "content": request.user_message
            }
        ]
    })
}

fn response_text(body: &[u8]) -> Result<String> {
    let response: AnthropicTextResponse = serde_json::from_slice(body)
        .map_err(|e| StoryError::upstream(None, format!("unreadable Bedrock response: {}", e)))?;

    let text: String = response
        .content
        .into_iter()
        .filter(|block| block.kind == "text")
        .filter_map(|block| block.text)
        .collect();

    if text.is_empty() {
        return Err(StoryError::upstream(None, "Bedrock response contained no text"));
    }
    Ok(text)
}

#[async_trait]
impl NarrativeGenerator for BedrockTextClient {
    async fn generate(&self, request: &NarrativeRequest) -> Result<String> {
        let request_json = serde_json::to_string(&request_payload(request))?;

        log::info!("Invoking model: {}", self.model_id);
        log::debug!("Text generation request payload: {}", request_json);

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

        response_text(response.body.as_ref())
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
