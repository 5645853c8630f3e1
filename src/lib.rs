//! KahaniKaar story engine.
//!
//! Turns a story idea plus style options into a four-scene illustrated
//! story: one call to a text-generation model writes the scenes, then one
//! image-generation call per scene draws them concurrently. Scenes whose
//! illustration fails keep a fallback image instead of failing the story.
//!
//! ```no_run
//! use kahanikaar::{Config, GenerationRequest, StoryGenerator};
//!
//! # async fn demo() -> kahanikaar::Result<()> {
//! let config = Config::from_env()?;
//! let generator = StoryGenerator::from_config(&config).await?;
//! let story = generator
//!     .generate(&GenerationRequest::new("a peacock who forgets how to dance"))
//!     .await?;
//! println!("{}: {} scenes", story.title, story.scenes.len());
//! # Ok(())
//! # }
//! ```

pub mod bedrock;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod openai;
#[cfg(feature = "server")]
pub mod server;
pub mod storage;
pub mod story;

pub use bedrock::{BedrockImageClient, BedrockTextClient};
pub use config::{BedrockConfig, Config, GenerationConfig, OpenAiConfig, PostgresConfig, Provider};
pub use error::{Result, StoryError};
pub use models::*;
pub use openai::{OpenAiImageClient, OpenAiTextClient};
pub use storage::{InMemoryStoryStorage, StorageStats, StoryStorageManager};
pub use story::{IllustrationGenerator, NarrativeGenerator, StoryGenerator};
