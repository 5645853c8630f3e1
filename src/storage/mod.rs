pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod traits;

use crate::{
    config::Config,
    error::Result,
    models::storage::{NewStory, StoredStory, StoryQuery},
};
use std::sync::Arc;
use traits::StoryStorage;

#[cfg(feature = "postgres")]
use postgres::PostgresStoryStorage;

pub use memory::InMemoryStoryStorage;
pub use traits::{StorageStats, StoryStorage as StoryStorageTrait};

#[derive(Clone)]
pub struct StoryStorageManager {
    backend: Arc<dyn StoryStorage>,
}

impl StoryStorageManager {
    /// Postgres when `use_psql` is set, otherwise an in-memory library.
    pub async fn new(config: &Config) -> Result<Self> {
        let backend: Arc<dyn StoryStorage> = if config.use_psql {
            #[cfg(feature = "postgres")]
            {
                let postgres_config = config.postgres.clone().ok_or_else(|| {
                    crate::error::StoryError::ConfigError("PostgreSQL config required".into())
                })?;
                Arc::new(PostgresStoryStorage::new(postgres_config).await?)
            }
            #[cfg(not(feature = "postgres"))]
            {
                return Err(crate::error::StoryError::ConfigError(
                    "PostgreSQL feature not enabled".into(),
                ));
            }
        } else {
            log::warn!("USE_PSQL not set, stories are kept in memory only");
            Arc::new(InMemoryStoryStorage::new())
        };

        Ok(Self { backend })
    }

    pub fn with_backend(backend: Arc<dyn StoryStorage>) -> Self {
        Self { backend }
    }

    pub fn in_memory() -> Self {
        Self::with_backend(Arc::new(InMemoryStoryStorage::new()))
    }

    pub fn storage(&self) -> &Arc<dyn StoryStorage> {
        &self.backend
    }
}

impl StoryStorageManager {
    pub async fn insert(&self, user_id: &str, story: NewStory) -> Result<StoredStory> {
        self.backend.insert(user_id, story).await
    }

    pub async fn get(&self, user_id: &str, id: &str) -> Result<Option<StoredStory>> {
        self.backend.get(user_id, id).await
    }

    pub async fn list(&self, user_id: &str, query: &StoryQuery) -> Result<Vec<StoredStory>> {
        self.backend.list(user_id, query).await
    }

    pub async fn delete(&self, user_id: &str, id: &str) -> Result<()> {
        self.backend.delete(user_id, id).await
    }

    pub async fn stats(&self, user_id: &str) -> Result<StorageStats> {
        self.backend.stats(user_id).await
    }

    pub async fn health_check(&self) -> Result<bool> {
        self.backend.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_backend_is_memory() {
        let manager = StoryStorageManager::new(&Config::default()).await.unwrap();
        assert!(manager.health_check().await.unwrap());
        assert_eq!(manager.stats("anyone").await.unwrap().total_stories, 0);
    }

    #[cfg(not(feature = "postgres"))]
    #[tokio::test]
    async fn test_postgres_requires_feature() {
        let config = Config::default().with_postgres(crate::config::PostgresConfig::new());
        assert!(StoryStorageManager::new(&config).await.is_err());
    }
}
