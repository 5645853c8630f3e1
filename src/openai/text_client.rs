use super::{endpoint, transport_failure, upstream_failure};
use crate::{
    config::OpenAiConfig,
    error::{Result, StoryError},
    models::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, NarrativeRequest},
    story::NarrativeGenerator,
};
use async_trait::async_trait;

#[derive(Clone)]
pub struct OpenAiTextClient {
    http: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
}

impl OpenAiTextClient {
    pub fn new(config: &OpenAiConfig) -> Result<Self> {
        Ok(Self {
            http: reqwest::Client::new(),
            url: endpoint(&config.base_url, "chat/completions"),
            api_key: config.require_api_key()?.to_string(),
            model: config.text_model.clone(),
        })
    }

    fn build_request(&self, request: &NarrativeRequest) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(request.system_prompt.clone()),
                ChatMessage::user(request.user_message.clone()),
            ],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }
}

fn first_choice(response: ChatCompletionResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or_else(|| StoryError::upstream(None, "completion contained no choices"))
}

#[async_trait]
impl NarrativeGenerator for OpenAiTextClient {
    async fn generate(&self, request: &NarrativeRequest) -> Result<String> {
        let body = self.build_request(request);
        log::info!("Invoking text model: {}", self.model);

        let response = self
            .http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_failure("chat", e))?;

        if !response.status().is_success() {
            return Err(upstream_failure("chat", response).await);
        }

        let status = response.status().as_u16();
        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            StoryError::upstream(Some(status), format!("unreadable completion body: {}", e))
        })?;
        first_choice(completion)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}
