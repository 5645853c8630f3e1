#[cfg(feature = "postgres")]
use crate::{
    config::PostgresConfig,
    error::{Result, StoryError},
    models::{
        storage::{NewStory, SortOrder, StoredStory, StoryQuery},
        Scene,
    },
    storage::traits::{StorageStats, StoryStorage},
};

#[cfg(feature = "postgres")]
use async_trait::async_trait;
#[cfg(feature = "postgres")]
use chrono::{DateTime, Utc};
#[cfg(feature = "postgres")]
use deadpool_postgres::{Config, Pool, Runtime};
#[cfg(feature = "postgres")]
use tokio_postgres::{NoTls, Row};
#[cfg(feature = "postgres")]
use uuid::Uuid;

#[cfg(feature = "postgres")]
const STORY_COLUMNS: &str = "id, user_id, title, description, genre, tone, audience, art_style, \
     scenes, thumbnail_url, created_at";

#[cfg(feature = "postgres")]
pub struct PostgresStoryStorage {
    pool: Pool,
}

#[cfg(feature = "postgres")]
impl PostgresStoryStorage {
    pub async fn new(config: PostgresConfig) -> Result<Self> {
        let mut cfg = Config::new();
        cfg.host = config.host;
        cfg.port = config.port;
        cfg.user = config.username;
        cfg.password = config.password;
        cfg.dbname = config.database;

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| StoryError::ConfigError(format!("Failed to create pool: {}", e)))?;

        let storage = Self { pool };
        storage.initialize_schema().await?;

        Ok(storage)
    }

    async fn client(&self) -> Result<deadpool_postgres::Client> {
        self.pool
            .get()
            .await
            .map_err(|e| StoryError::StorageError(format!("Failed to get connection: {}", e)))
    }

    async fn initialize_schema(&self) -> Result<()> {
        let client = self.client().await?;

        client
            .execute(
                "CREATE TABLE IF NOT EXISTS stories (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                title TEXT NOT NULL,
                description TEXT,
                genre TEXT,
                tone TEXT,
                audience TEXT,
                art_style TEXT,
                scenes JSONB NOT NULL DEFAULT '[]',
                thumbnail_url TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )",
                &[],
            )
            .await
            .map_err(|e| {
                StoryError::StorageError(format!("Failed to create stories table: {}", e))
            })?;

        client
            .execute(
                "CREATE INDEX IF NOT EXISTS idx_stories_user_created ON stories(user_id, created_at DESC)",
                &[],
            )
            .await
            .map_err(|e| StoryError::StorageError(format!("Failed to create user index: {}", e)))?;

        log::info!("PostgreSQL story storage schema initialized");
        Ok(())
    }
}

#[cfg(feature = "postgres")]
fn row_to_story(row: &Row) -> Result<StoredStory> {
    let scenes: serde_json::Value = row.get("scenes");
    let scenes: Vec<Scene> = serde_json::from_value(scenes)?;
    let created_at: DateTime<Utc> = row.get("created_at");

    Ok(StoredStory {
        id: row.get("id"),
        user_id: row.get("user_id"),
        title: row.get("title"),
        description: row.get("description"),
        genre: row.get("genre"),
        tone: row.get("tone"),
        audience: row.get("audience"),
        art_style: row.get("art_style"),
        scenes,
        thumbnail_url: row.get("thumbnail_url"),
        created_at,
    })
}

#[cfg(feature = "postgres")]
fn order_clause(sort: SortOrder) -> &'static str {
    match sort {
        SortOrder::Newest => "created_at DESC",
        SortOrder::Oldest => "created_at ASC",
        SortOrder::Title => "title ASC",
    }
}

/// `ILIKE` pattern matching `term` literally anywhere in the title.
#[cfg(feature = "postgres")]
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(feature = "postgres")]
#[async_trait]
impl StoryStorage for PostgresStoryStorage {
    async fn insert(&self, user_id: &str, story: NewStory) -> Result<StoredStory> {
        let client = self.client().await?;

        let id = Uuid::new_v4().to_string();
        let thumbnail_url = story.thumbnail_url();
        let scenes = serde_json::to_value(&story.scenes)?;

        let stmt = client
            .prepare(&format!(
                "INSERT INTO stories (id, user_id, title, description, genre, tone, audience, art_style, scenes, thumbnail_url, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, NOW())
             RETURNING {}",
                STORY_COLUMNS
            ))
            .await
            .map_err(|e| {
                StoryError::StorageError(format!("Failed to prepare statement: {}", e))
            })?;

        let row = client
            .query_one(
                &stmt,
                &[
                    &id,
                    &user_id,
                    &story.title,
                    &story.description,
                    &story.genre,
                    &story.tone,
                    &story.audience,
                    &story.art_style,
                    &scenes,
                    &thumbnail_url,
                ],
            )
            .await
            .map_err(|e| StoryError::StorageError(format!("Failed to insert story: {}", e)))?;

        row_to_story(&row)
    }

    async fn get(&self, user_id: &str, id: &str) -> Result<Option<StoredStory>> {
        let client = self.client().await?;

        let rows = client
            .query(
                format!(
                    "SELECT {} FROM stories WHERE id = $1 AND user_id = $2",
                    STORY_COLUMNS
                )
                .as_str(),
                &[&id, &user_id],
            )
            .await
            .map_err(|e| StoryError::StorageError(format!("Failed to execute get query: {}", e)))?;

        rows.first().map(row_to_story).transpose()
    }

    async fn list(&self, user_id: &str, query: &StoryQuery) -> Result<Vec<StoredStory>> {
        let client = self.client().await?;

        let search = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(contains_pattern);
        let genre = query.genre.as_deref().filter(|g| !g.is_empty());
        let limit = query.limit.map(|l| l as i64);

        let sql = format!(
            "SELECT {} FROM stories
             WHERE user_id = $1
               AND ($2::TEXT IS NULL OR title ILIKE $2)
               AND ($3::TEXT IS NULL OR genre = $3)
             ORDER BY {}
             LIMIT $4",
            STORY_COLUMNS,
            order_clause(query.sort)
        );

        let rows = client
            .query(sql.as_str(), &[&user_id, &search, &genre, &limit])
            .await
            .map_err(|e| {
                StoryError::StorageError(format!("Failed to execute list query: {}", e))
            })?;

        rows.iter().map(row_to_story).collect()
    }

    async fn delete(&self, user_id: &str, id: &str) -> Result<()> {
        let client = self.client().await?;

        let deleted = client
            .execute(
                "DELETE FROM stories WHERE id = $1 AND user_id = $2",
                &[&id, &user_id],
            )
            .await
            .map_err(|e| StoryError::StorageError(format!("Failed to delete story: {}", e)))?;

        if deleted == 0 {
            return Err(StoryError::NotFound(format!("story {}", id)));
        }
        Ok(())
    }

    async fn stats(&self, user_id: &str) -> Result<StorageStats> {
        let client = self.client().await?;

        let count_row = client
            .query_one("SELECT COUNT(*) FROM stories WHERE user_id = $1", &[&user_id])
            .await
            .map_err(|e| StoryError::StorageError(format!("Failed to count stories: {}", e)))?;
        let total: i64 = count_row.get(0);

        let genre_rows = client
            .query(
                "SELECT DISTINCT genre FROM stories WHERE user_id = $1 AND genre IS NOT NULL ORDER BY genre",
                &[&user_id],
            )
            .await
            .map_err(|e| StoryError::StorageError(format!("Failed to list genres: {}", e)))?;

        Ok(StorageStats {
            total_stories: total as usize,
            genres: genre_rows.iter().map(|row| row.get(0)).collect(),
        })
    }

    async fn health_check(&self) -> Result<bool> {
        let client = self.client().await?;
        let result = client.query_one("SELECT 1", &[]).await;
        Ok(result.is_ok())
    }
}
