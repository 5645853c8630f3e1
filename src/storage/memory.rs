use crate::{
    error::{Result, StoryError},
    models::storage::{NewStory, StoredStory, StoryQuery},
    storage::traits::{StorageStats, StoryStorage},
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeSet, HashMap};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Process-local library keyed by story id.
#[derive(Default)]
pub struct InMemoryStoryStorage {
    stories: RwLock<HashMap<String, StoredStory>>,
}

impl InMemoryStoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StoryStorage for InMemoryStoryStorage {
    async fn insert(&self, user_id: &str, story: NewStory) -> Result<StoredStory> {
        let stored = StoredStory {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            thumbnail_url: story.thumbnail_url(),
            title: story.title,
            description: story.description,
            genre: story.genre,
            tone: story.tone,
            audience: story.audience,
            art_style: story.art_style,
            scenes: story.scenes,
            created_at: Utc::now(),
        };

        self.stories
            .write()
            .await
            .insert(stored.id.clone(), stored.clone());
        log::debug!("Stored story {} for user {}", stored.id, user_id);
        Ok(stored)
    }

    async fn get(&self, user_id: &str, id: &str) -> Result<Option<StoredStory>> {
        let stories = self.stories.read().await;
        Ok(stories.get(id).filter(|s| s.user_id == user_id).cloned())
    }

    async fn list(&self, user_id: &str, query: &StoryQuery) -> Result<Vec<StoredStory>> {
        let stories = self.stories.read().await;
        let owned = stories.values().filter(|s| s.user_id == user_id).cloned();
        Ok(query.apply(owned))
    }

    async fn delete(&self, user_id: &str, id: &str) -> Result<()> {
        let mut stories = self.stories.write().await;
        match stories.get(id) {
            Some(story) if story.user_id == user_id => {
                stories.remove(id);
                Ok(())
            }
            _ => Err(StoryError::NotFound(format!("story {}", id))),
        }
    }

    async fn stats(&self, user_id: &str) -> Result<StorageStats> {
        let stories = self.stories.read().await;
        let owned: Vec<_> = stories.values().filter(|s| s.user_id == user_id).collect();
        let genres: BTreeSet<String> = owned.iter().filter_map(|s| s.genre.clone()).collect();
        Ok(StorageStats {
            total_stories: owned.len(),
            genres: genres.into_iter().collect(),
        })
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Scene, SortOrder};

    fn new_story(title: &str, genre: Option<&str>) -> NewStory {
        NewStory {
            title: title.into(),
            description: None,
            genre: genre.map(String::from),
            tone: Some("Playful".into()),
            audience: None,
            art_style: Some("Cartoon".into()),
            scenes: vec![Scene {
                id: 1,
                text: "Once.".into(),
                image_url: "https://example.com/1.png".into(),
                image_prompt: "A cat".into(),
                title: "Start".into(),
            }],
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_identity() {
        let storage = InMemoryStoryStorage::new();
        let stored = storage
            .insert("alice", new_story("The Cat Adventure", None))
            .await
            .unwrap();
        assert!(Uuid::parse_str(&stored.id).is_ok());
        assert_eq!(stored.user_id, "alice");
        assert_eq!(stored.thumbnail_url.as_deref(), Some("https://example.com/1.png"));

        let fetched = storage.get("alice", &stored.id).await.unwrap();
        assert_eq!(fetched, Some(stored));
    }

    #[tokio::test]
    async fn test_ownership_is_enforced() {
        let storage = InMemoryStoryStorage::new();
        let stored = storage
            .insert("alice", new_story("The Cat Adventure", None))
            .await
            .unwrap();

        assert_eq!(storage.get("bob", &stored.id).await.unwrap(), None);
        assert!(storage.list("bob", &StoryQuery::new()).await.unwrap().is_empty());
        assert!(matches!(
            storage.delete("bob", &stored.id).await,
            Err(StoryError::NotFound(_))
        ));

        storage.delete("alice", &stored.id).await.unwrap();
        assert_eq!(storage.get("alice", &stored.id).await.unwrap(), None);
        assert!(storage.delete("alice", &stored.id).await.is_err());
    }

    #[tokio::test]
    async fn test_list_and_stats() {
        let storage = InMemoryStoryStorage::new();
        storage.insert("alice", new_story("Zebra Tales", Some("Nature"))).await.unwrap();
        storage.insert("alice", new_story("Ant Tales", Some("Comedy"))).await.unwrap();
        storage.insert("alice", new_story("Moon Song", Some("Nature"))).await.unwrap();
        storage.insert("bob", new_story("Bob's Tale", None)).await.unwrap();

        let by_title = storage
            .list("alice", &StoryQuery::new().with_sort(SortOrder::Title))
            .await
            .unwrap();
        let titles: Vec<_> = by_title.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Ant Tales", "Moon Song", "Zebra Tales"]);

        let tales = storage
            .list("alice", &StoryQuery::new().with_search("tales"))
            .await
            .unwrap();
        assert_eq!(tales.len(), 2);

        let stats = storage.stats("alice").await.unwrap();
        assert_eq!(stats.total_stories, 3);
        assert_eq!(stats.genres, vec!["Comedy".to_string(), "Nature".to_string()]);
    }
}
