use serde::{Deserialize, Serialize};

pub const DEFAULT_GENRE: &str = "Adventure";
pub const DEFAULT_TONE: &str = "Playful";
pub const DEFAULT_AUDIENCE: &str = "Children (3-6)";
pub const DEFAULT_ART_STYLE: &str = "Cartoon";

/// Inbound `generate story` payload, exactly as the client sent it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub tone: Option<String>,
    #[serde(default)]
    pub audience: Option<String>,
    #[serde(default)]
    pub art_style: Option<String>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: Some(prompt.into()),
            ..Default::default()
        }
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn with_tone(mut self, tone: impl Into<String>) -> Self {
        self.tone = Some(tone.into());
        self
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    pub fn with_art_style(mut self, art_style: impl Into<String>) -> Self {
        self.art_style = Some(art_style.into());
        self
    }
}

/// A request that passed validation, with every style label resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub prompt: String,
    pub genre: String,
    pub tone: String,
    pub audience: String,
    pub art_style: String,
}
