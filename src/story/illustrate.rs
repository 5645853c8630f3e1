use super::{prompt::illustration_prompt, traits::IllustrationGenerator};
use crate::models::{Illustration, ImagePayload, ImageReference, SceneDraft};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures::future::join_all;
use std::time::Duration;

/// Per-request settings for the illustration fan-out.
#[derive(Debug, Clone)]
pub struct IllustrationPlan<'a> {
    pub art_style: &'a str,
    pub fallback_url: &'a str,
    pub timeout: Duration,
    pub request_id: &'a str,
}

/// Draws every scene concurrently and waits for all of them.
///
/// Never fails: a scene whose call errors, times out or returns an unusable
/// payload gets the fallback image. The output is index-aligned with
/// `drafts` regardless of completion order.
pub async fn illustrate_all(
    generator: &dyn IllustrationGenerator,
    drafts: &[SceneDraft],
    plan: &IllustrationPlan<'_>,
) -> Vec<Illustration> {
    let calls = drafts
        .iter()
        .enumerate()
        .map(|(index, draft)| illustrate_one(generator, index, draft, plan));
    join_all(calls).await
}

async fn illustrate_one(
    generator: &dyn IllustrationGenerator,
    index: usize,
    draft: &SceneDraft,
    plan: &IllustrationPlan<'_>,
) -> Illustration {
    let prompt = illustration_prompt(&draft.illustration_description, plan.art_style);
    let scene = index + 1;

    let outcome = match tokio::time::timeout(plan.timeout, generator.generate(&prompt)).await {
        Ok(Ok(payload)) => check_payload(payload),
        Ok(Err(e)) => Err(e.to_string()),
        Err(_) => Err(format!("no response within {:?}", plan.timeout)),
    };

    let image = match outcome {
        Ok(payload) => {
            log::debug!(
                "[req:{}] Scene {} illustrated ({} base64 chars)",
                plan.request_id,
                scene,
                payload.data.len()
            );
            ImageReference::Generated(payload)
        }
        Err(reason) => {
            log::warn!(
                "[req:{}] Image generation failed for scene {}, using fallback: {}",
                plan.request_id,
                scene,
                reason
            );
            ImageReference::Fallback(plan.fallback_url.to_string())
        }
    };

    Illustration {
        image,
        illustration_description: draft.illustration_description.clone(),
        title: draft.title.clone(),
    }
}

fn check_payload(payload: ImagePayload) -> std::result::Result<ImagePayload, String> {
    if payload.data.is_empty() {
        return Err("empty image payload".into());
    }
    STANDARD
        .decode(payload.data.as_bytes())
        .map_err(|e| format!("image payload is not valid base64: {}", e))?;
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, StoryError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Answers with the scene number encoded in the prompt, optionally slowed
    /// down or failing per scene.
    struct ScriptedImages {
        calls: AtomicUsize,
        fail_on: Option<&'static str>,
        garbage_on: Option<&'static str>,
        hang_on: Option<&'static str>,
    }

    impl ScriptedImages {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_on: None,
                garbage_on: None,
                hang_on: None,
            }
        }
    }

    #[async_trait]
    impl IllustrationGenerator for ScriptedImages {
        async fn generate(&self, prompt: &str) -> Result<ImagePayload> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            // earlier scenes finish later
            let delay = if prompt.starts_with("Picture 1") {
                150
            } else if prompt.starts_with("Picture 2") {
                100
            } else if prompt.starts_with("Picture 3") {
                50
            } else {
                0
            };
            tokio::time::sleep(Duration::from_millis(delay)).await;

            if self.hang_on.map_or(false, |p| prompt.starts_with(p)) {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            if self.fail_on.map_or(false, |p| prompt.starts_with(p)) {
                return Err(StoryError::upstream(Some(500), "image backend exploded"));
            }
            if self.garbage_on.map_or(false, |p| prompt.starts_with(p)) {
                return Ok(ImagePayload::new("not base64!!", "image/webp"));
            }
            let data = STANDARD.encode(&prompt[..9]);
            Ok(ImagePayload::new(data, "image/webp"))
        }

        fn model_id(&self) -> &str {
            "scripted-images"
        }
    }

    fn drafts() -> Vec<SceneDraft> {
        (1..=4)
            .map(|n| SceneDraft {
                title: format!("Title {}", n),
                narrative_text: format!("Text {}", n),
                illustration_description: format!("Picture {}", n),
            })
            .collect()
    }

    fn plan(timeout: Duration) -> IllustrationPlan<'static> {
        IllustrationPlan {
            art_style: "Cartoon",
            fallback_url: "https://example.com/fallback.jpg",
            timeout,
            request_id: "test",
        }
    }

    fn decoded(illustration: &Illustration) -> String {
        match &illustration.image {
            ImageReference::Generated(payload) => {
                String::from_utf8(STANDARD.decode(&payload.data).unwrap()).unwrap()
            }
            ImageReference::Fallback(url) => url.clone(),
        }
    }

    #[tokio::test]
    async fn test_order_survives_out_of_order_completion() {
        let images = ScriptedImages::new();
        let result = illustrate_all(&images, &drafts(), &plan(Duration::from_secs(5))).await;

        assert_eq!(images.calls.load(Ordering::SeqCst), 4);
        assert_eq!(result.len(), 4);
        for (i, illustration) in result.iter().enumerate() {
            assert_eq!(decoded(illustration), format!("Picture {}", i + 1));
            assert_eq!(illustration.title, format!("Title {}", i + 1));
            assert_eq!(illustration.illustration_description, format!("Picture {}", i + 1));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_calls_run_concurrently() {
        let images = ScriptedImages::new();
        let started = tokio::time::Instant::now();
        illustrate_all(&images, &drafts(), &plan(Duration::from_secs(5))).await;
        // the slowest scene takes 150ms; sequential calls would take 300ms
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(150));
        assert!(elapsed < Duration::from_millis(300));
    }

    #[tokio::test]
    async fn test_single_failure_falls_back() {
        let mut images = ScriptedImages::new();
        images.fail_on = Some("Picture 2");
        let result = illustrate_all(&images, &drafts(), &plan(Duration::from_secs(5))).await;

        assert_eq!(result.len(), 4);
        assert_eq!(
            result[1].image,
            ImageReference::Fallback("https://example.com/fallback.jpg".into())
        );
        assert_eq!(result[1].title, "Title 2");
        for i in [0, 2, 3] {
            assert!(!result[i].image.is_fallback());
        }
    }

    #[tokio::test]
    async fn test_invalid_payload_falls_back() {
        let mut images = ScriptedImages::new();
        images.garbage_on = Some("Picture 4");
        let result = illustrate_all(&images, &drafts(), &plan(Duration::from_secs(5))).await;
        assert!(result[3].image.is_fallback());
        assert!(!result[0].image.is_fallback());
    }

    #[tokio::test]
    async fn test_slow_call_times_out_to_fallback() {
        let mut images = ScriptedImages::new();
        images.hang_on = Some("Picture 3");
        let result = illustrate_all(&images, &drafts(), &plan(Duration::from_secs(1))).await;
        assert!(result[2].image.is_fallback());
        assert!(!result[0].image.is_fallback());
        assert!(!result[3].image.is_fallback());
    }

    #[tokio::test]
    async fn test_prompt_includes_art_style() {
        struct Echo;

        #[async_trait]
        impl IllustrationGenerator for Echo {
            async fn generate(&self, prompt: &str) -> Result<ImagePayload> {
                Ok(ImagePayload::new(STANDARD.encode(prompt), "image/png"))
            }

            fn model_id(&self) -> &str {
                "echo"
            }
        }

        let mut plan = plan(Duration::from_secs(1));
        plan.art_style = "Indian Folk Art";
        let result = illustrate_all(&Echo, &drafts()[..1], &plan).await;
        assert_eq!(
            decoded(&result[0]),
            "Picture 1. Indian Folk Art style, colorful, whimsical, storybook illustration for children, high quality"
        );
    }
}
