//! Story generation pipeline.
//!
//! `validate -> prompt -> narrative call -> parse -> illustrate (fan-out) ->
//! assemble`. Every stage before illustration can abort the request; the
//! illustration stage always completes, degrading failed scenes to the
//! fallback image.

pub mod assemble;
pub mod illustrate;
pub mod parser;
pub mod prompt;
pub mod traits;
pub mod validate;

pub use traits::{IllustrationGenerator, NarrativeGenerator};

use crate::{
    bedrock::{BedrockImageClient, BedrockTextClient},
    config::{Config, GenerationConfig, Provider},
    error::{Result, StoryError},
    logger,
    models::{GeneratedStory, GenerationRequest, SceneDraft},
    openai::{OpenAiImageClient, OpenAiTextClient},
};
use illustrate::IllustrationPlan;
use std::sync::Arc;
use tokio::time::Instant;
use uuid::Uuid;

#[derive(Clone)]
pub struct StoryGenerator {
    narrative: Arc<dyn NarrativeGenerator>,
    illustrator: Arc<dyn IllustrationGenerator>,
    config: GenerationConfig,
}

impl StoryGenerator {
    pub fn new(
        narrative: Arc<dyn NarrativeGenerator>,
        illustrator: Arc<dyn IllustrationGenerator>,
        config: GenerationConfig,
    ) -> Self {
        Self {
            narrative,
            illustrator,
            config,
        }
    }

    /// Builds the provider clients named by `config.provider`.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let (narrative, illustrator): (Arc<dyn NarrativeGenerator>, Arc<dyn IllustrationGenerator>) =
            match config.provider {
                Provider::OpenAi => (
                    Arc::new(OpenAiTextClient::new(&config.openai)?),
                    Arc::new(OpenAiImageClient::new(&config.openai)?),
                ),
                Provider::Bedrock => {
                    let client = crate::bedrock::connect(&config.bedrock).await;
                    (
                        Arc::new(BedrockTextClient::new(
                            client.clone(),
                            config.bedrock.text_model.clone(),
                        )),
                        Arc::new(BedrockImageClient::new(
                            client,
                            config.bedrock.image_model.clone(),
                        )),
                    )
                }
            };

        log::info!(
            "Story generator ready: text model {}, image model {}",
            narrative.model_id(),
            illustrator.model_id()
        );

        Ok(Self::new(narrative, illustrator, config.generation.clone()))
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Runs one request end to end.
    ///
    /// The request deadline bounds every stage up to parsing. Image calls
    /// still pending when it passes fall back instead of failing the story.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedStory> {
        let request_id = Uuid::new_v4().to_string();
        let _timer = logger::timer(&format!("[req:{}] generate-story", request_id));
        let deadline = Instant::now() + self.config.request_timeout;

        let outcome = match tokio::time::timeout_at(deadline, self.write(request, &request_id)).await
        {
            Ok(result) => result,
            Err(_) => Err(StoryError::TimeoutError(format!(
                "story generation exceeded {:?}",
                self.config.request_timeout
            ))),
        };

        let (art_style, drafts) = match outcome {
            Ok(written) => written,
            Err(e) => {
                if e.is_client_error() {
                    log::warn!("[req:{}] Rejected story request: {}", request_id, e);
                } else {
                    log::error!("[req:{}] Story generation failed: {}", request_id, e);
                }
                return Err(e);
            }
        };

        let plan = IllustrationPlan {
            art_style: &art_style,
            fallback_url: &self.config.fallback_image_url,
            timeout: self
                .config
                .image_timeout
                .min(deadline.saturating_duration_since(Instant::now())),
            request_id: &request_id,
        };
        let illustrations = {
            let _timer = logger::timer(&format!("[req:{}] illustrations", request_id));
            illustrate::illustrate_all(self.illustrator.as_ref(), &drafts, &plan).await
        };

        let fallbacks = illustrations.iter().filter(|i| i.image.is_fallback()).count();
        let story = assemble::assemble(&drafts, illustrations);
        log::info!(
            "[req:{}] Story generation complete with {} scenes ({} fallback images): {}",
            request_id,
            story.scenes.len(),
            fallbacks,
            story.title
        );
        Ok(story)
    }

    /// Validation through parsing; returns the art style and the scene drafts.
    async fn write(
        &self,
        request: &GenerationRequest,
        request_id: &str,
    ) -> Result<(String, Vec<SceneDraft>)> {
        let validated = validate::validate(request)?;
        log::info!(
            "[req:{}] Generating story for prompt: {}",
            request_id,
            validated.prompt
        );

        let narrative_request =
            prompt::compile(&validated, self.config.max_tokens, self.config.temperature);

        let raw = {
            let _timer = logger::timer(&format!("[req:{}] narrative", request_id));
            match tokio::time::timeout(
                self.config.text_timeout,
                self.narrative.generate(&narrative_request),
            )
            .await
            {
                Ok(result) => result?,
                Err(_) => {
                    return Err(StoryError::TimeoutError(format!(
                        "narrative generation exceeded {:?}",
                        self.config.text_timeout
                    )))
                }
            }
        };
        log::debug!("[req:{}] Generated story text: {}", request_id, raw);

        let drafts = parser::parse_scenes(&raw).map_err(|e| {
            log::error!("[req:{}] Raw narrative response: {}", request_id, raw);
            e
        })?;

        Ok((validated.art_style, drafts))
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    use super::*;
    use crate::models::{ImagePayload, NarrativeRequest};
    use async_trait::async_trait;
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    pub const FOUR_SCENES: &str = r#"[
        {"title": "Mayura's Dance", "scene": "Mayura the peacock loved to dance.", "image_prompt": "A blue peacock with golden eyes dancing"},
        {"title": "The Storm", "scene": "A storm hid the sun.", "image_prompt": "The blue peacock under dark clouds"},
        {"title": "Friends Help", "scene": "Her friends sang for her.", "image_prompt": "The blue peacock with a parrot and a monkey"},
        {"title": "Rainbow", "scene": "A rainbow appeared and she danced again.", "image_prompt": "The blue peacock dancing under a rainbow"}
    ]"#;

    pub enum NarrativeScript {
        Reply(String),
        Fail(u16),
        Hang,
    }

    pub struct FakeNarrative {
        pub script: NarrativeScript,
        pub calls: AtomicUsize,
        pub last_request: Mutex<Option<NarrativeRequest>>,
    }

    impl FakeNarrative {
        pub fn new(script: NarrativeScript) -> Self {
            Self {
                script,
                calls: AtomicUsize::new(0),
                last_request: Mutex::new(None),
            }
        }

        pub fn replying(text: &str) -> Self {
            Self::new(NarrativeScript::Reply(text.to_string()))
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl NarrativeGenerator for FakeNarrative {
        async fn generate(&self, request: &NarrativeRequest) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some(request.clone());
            match &self.script {
                NarrativeScript::Reply(text) => Ok(text.clone()),
                NarrativeScript::Fail(status) => {
                    Err(StoryError::upstream(Some(*status), "text backend unavailable"))
                }
                NarrativeScript::Hang => {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok(String::new())
                }
            }
        }

        fn model_id(&self) -> &str {
            "fake-narrative"
        }
    }

    /// Returns the prompt itself as the "image"; fails for prompts containing
    /// `fail_marker` and never answers prompts containing `hang_marker`.
    pub struct FakeImages {
        pub calls: AtomicUsize,
        pub fail_marker: Option<String>,
        pub hang_marker: Option<String>,
    }

    impl FakeImages {
        pub fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_marker: None,
                hang_marker: None,
            }
        }

        pub fn failing_on(marker: &str) -> Self {
            Self {
                fail_marker: Some(marker.to_string()),
                ..Self::new()
            }
        }

        pub fn hanging_on(marker: &str) -> Self {
            Self {
                hang_marker: Some(marker.to_string()),
                ..Self::new()
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl IllustrationGenerator for FakeImages {
        async fn generate(&self, prompt: &str) -> Result<ImagePayload> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(marker) = &self.hang_marker {
                if prompt.contains(marker.as_str()) {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                }
            }
            if let Some(marker) = &self.fail_marker {
                if prompt.contains(marker.as_str()) {
                    return Err(StoryError::upstream(Some(400), "content policy"));
                }
            }
            Ok(ImagePayload::new(STANDARD.encode(prompt), "image/webp"))
        }

        fn model_id(&self) -> &str {
            "fake-images"
        }
    }

    pub fn generator(
        narrative: Arc<FakeNarrative>,
        images: Arc<FakeImages>,
        config: GenerationConfig,
    ) -> StoryGenerator {
        StoryGenerator::new(narrative, images, config)
    }
}
