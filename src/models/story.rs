use serde::{Deserialize, Serialize};

/// One scene as parsed from the narrative model's output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneDraft {
    pub title: String,
    pub narrative_text: String,
    pub illustration_description: String,
}

/// Base64 image bytes returned by an image provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub data: String,
    pub mime_type: String,
}

impl ImagePayload {
    pub fn new(data: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            mime_type: mime_type.into(),
        }
    }

    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageReference {
    Generated(ImagePayload),
    Fallback(String),
}

impl ImageReference {
    pub fn is_fallback(&self) -> bool {
        matches!(self, ImageReference::Fallback(_))
    }

    /// Value placed in the `imageUrl` field of the outbound scene.
    pub fn to_url(&self) -> String {
        match self {
            ImageReference::Generated(payload) => payload.to_data_uri(),
            ImageReference::Fallback(url) => url.clone(),
        }
    }
}

/// Result of the illustration stage for a single scene, index-aligned with
/// the drafts it was produced from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Illustration {
    pub image: ImageReference,
    pub illustration_description: String,
    pub title: String,
}

/// Outbound scene. Field names follow the JSON contract the UI renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    pub id: u32,
    pub text: String,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    #[serde(rename = "imagePrompt")]
    pub image_prompt: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedStory {
    #[serde(rename = "story")]
    pub scenes: Vec<Scene>,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResult {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub details: Option<String>,
}

impl ErrorResult {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl From<&crate::error::StoryError> for ErrorResult {
    fn from(error: &crate::error::StoryError) -> Self {
        use crate::error::{StoryError, GENERATION_FAILED};

        match error {
            StoryError::ValidationError(msg) => ErrorResult::new(msg.clone()),
            StoryError::NotFound(what) => ErrorResult::new(format!("{} not found", what)),
            StoryError::Unauthorized(msg) => ErrorResult::new(msg.clone()),
            StoryError::StorageError(msg) => {
                ErrorResult::new("Storage operation failed").with_details(msg.clone())
            }
            other => ErrorResult::new(GENERATION_FAILED).with_details(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{StoryError, PROMPT_REQUIRED};

    #[test]
    fn test_scene_wire_names() {
        let story = GeneratedStory {
            scenes: vec![Scene {
                id: 1,
                text: "Once upon a time.".into(),
                image_url: "https://example.com/a.png".into(),
                image_prompt: "A fox".into(),
                title: "The Fox".into(),
            }],
            title: "The Fox Adventure".into(),
        };
        let json = serde_json::to_value(&story).unwrap();
        assert_eq!(json["story"][0]["imageUrl"], "https://example.com/a.png");
        assert_eq!(json["story"][0]["imagePrompt"], "A fox");
        assert_eq!(json["story"][0]["id"], 1);
        assert_eq!(json["title"], "The Fox Adventure");
    }

    #[test]
    fn test_image_reference_urls() {
        let generated = ImageReference::Generated(ImagePayload::new("QUJD", "image/webp"));
        assert_eq!(generated.to_url(), "data:image/webp;base64,QUJD");
        assert!(!generated.is_fallback());

        let fallback = ImageReference::Fallback("https://example.com/placeholder.jpg".into());
        assert_eq!(fallback.to_url(), "https://example.com/placeholder.jpg");
        assert!(fallback.is_fallback());
    }

    #[test]
    fn test_error_envelope() {
        let validation = ErrorResult::from(&StoryError::ValidationError(PROMPT_REQUIRED.into()));
        assert_eq!(validation.error, "Prompt is required");
        assert_eq!(
            serde_json::to_string(&validation).unwrap(),
            r#"{"error":"Prompt is required"}"#
        );

        let upstream = ErrorResult::from(&StoryError::upstream(Some(500), "boom"));
        assert_eq!(upstream.error, "Failed to generate story");
        assert_eq!(upstream.details.as_deref(), Some("Upstream error (500): boom"));
    }
}
