use super::story::{GeneratedStory, Scene};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A story as handed to the store by its owner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewStory {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub tone: Option<String>,
    #[serde(default)]
    pub audience: Option<String>,
    #[serde(default)]
    pub art_style: Option<String>,
    pub scenes: Vec<Scene>,
}

impl NewStory {
    pub fn from_generated(story: GeneratedStory) -> Self {
        Self {
            title: story.title,
            description: None,
            genre: None,
            tone: None,
            audience: None,
            art_style: None,
            scenes: story.scenes,
        }
    }

    pub fn with_style(
        mut self,
        genre: Option<String>,
        tone: Option<String>,
        audience: Option<String>,
        art_style: Option<String>,
    ) -> Self {
        self.genre = genre;
        self.tone = tone;
        self.audience = audience;
        self.art_style = art_style;
        self
    }

    /// The first scene's picture doubles as the library thumbnail.
    pub fn thumbnail_url(&self) -> Option<String> {
        self.scenes.first().map(|scene| scene.image_url.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredStory {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub tone: Option<String>,
    pub audience: Option<String>,
    pub art_style: Option<String>,
    pub scenes: Vec<Scene>,
    pub thumbnail_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
    Title,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StoryQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub sort: SortOrder,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl StoryQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Case-insensitive title search plus exact genre match. Blank filters
    /// match everything.
    pub fn matches(&self, story: &StoredStory) -> bool {
        let title_ok = match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => story
                .title
                .to_lowercase()
                .contains(&term.to_lowercase()),
            _ => true,
        };
        let genre_ok = match self.genre.as_deref() {
            Some(genre) if !genre.is_empty() => story.genre.as_deref() == Some(genre),
            _ => true,
        };
        title_ok && genre_ok
    }

    pub fn apply(&self, stories: impl IntoIterator<Item = StoredStory>) -> Vec<StoredStory> {
        let mut result: Vec<StoredStory> = stories.into_iter().filter(|s| self.matches(s)).collect();
        match self.sort {
            SortOrder::Newest => result.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            SortOrder::Oldest => result.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
            SortOrder::Title => result.sort_by(|a, b| a.title.cmp(&b.title)),
        }
        if let Some(limit) = self.limit {
            result.truncate(limit);
        }
        result
    }
}
