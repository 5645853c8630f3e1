use crate::{
    error::Result,
    models::storage::{NewStory, StoredStory, StoryQuery},
};
use async_trait::async_trait;

/// Per-user story library. Every operation is scoped to `user_id`; another
/// user's story behaves exactly like a missing one.
#[async_trait]
pub trait StoryStorage: Send + Sync {
    async fn insert(&self, user_id: &str, story: NewStory) -> Result<StoredStory>;

    async fn get(&self, user_id: &str, id: &str) -> Result<Option<StoredStory>>;

    async fn list(&self, user_id: &str, query: &StoryQuery) -> Result<Vec<StoredStory>>;

    /// Fails with `NotFound` when the user owns no story with this id.
    async fn delete(&self, user_id: &str, id: &str) -> Result<()>;

    async fn stats(&self, user_id: &str) -> Result<StorageStats>;

    async fn health_check(&self) -> Result<bool>;
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct StorageStats {
    pub total_stories: usize,
    pub genres: Vec<String>,
}
