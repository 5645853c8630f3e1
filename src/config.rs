use crate::error::{Result, StoryError};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_FALLBACK_IMAGE_URL: &str =
    "https://images.unsplash.com/photo-1518709268805-4e9042af2176?w=800&h=600&fit=crop";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAi,
    Bedrock,
}

impl FromStr for Provider {
    type Err = StoryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAi),
            "bedrock" => Ok(Provider::Bedrock),
            other => Err(StoryError::ConfigError(format!(
                "Unknown story provider: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub text_model: String,
    pub image_model: String,
    pub image_size: String,
    pub image_quality: String,
    pub image_format: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        OpenAiConfig {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            text_model: "gpt-4.1-2025-04-14".to_string(),
            image_model: "gpt-image-1".to_string(),
            image_size: "1024x1024".to_string(),
            image_quality: "high".to_string(),
            image_format: "webp".to_string(),
        }
    }
}

impl OpenAiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        OpenAiConfig {
            api_key: env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()),
            base_url: env::var("OPENAI_BASE_URL").unwrap_or(defaults.base_url),
            text_model: env::var("OPENAI_TEXT_MODEL").unwrap_or(defaults.text_model),
            image_model: env::var("OPENAI_IMAGE_MODEL").unwrap_or(defaults.image_model),
            image_size: env::var("OPENAI_IMAGE_SIZE").unwrap_or(defaults.image_size),
            image_quality: env::var("OPENAI_IMAGE_QUALITY").unwrap_or(defaults.image_quality),
            image_format: env::var("OPENAI_IMAGE_FORMAT").unwrap_or(defaults.image_format),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_models(mut self, text_model: impl Into<String>, image_model: impl Into<String>) -> Self {
        self.text_model = text_model.into();
        self.image_model = image_model.into();
        self
    }

    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| StoryError::ConfigError("OPENAI_API_KEY is not set".into()))
    }
}

#[derive(Debug, Clone)]
pub struct BedrockConfig {
    pub region: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub text_model: String,
    pub image_model: String,
}

impl Default for BedrockConfig {
    fn default() -> Self {
        BedrockConfig {
            region: None,
            access_key: None,
            secret_key: None,
            text_model: "anthropic.claude-3-haiku-20240307-v1:0".to_string(),
            image_model: "amazon.titan-image-generator-v1".to_string(),
        }
    }
}

impl BedrockConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        BedrockConfig {
            region: env::var("AWS_REGION").ok(),
            access_key: env::var("AWS_ACCESS_KEY_ID").ok(),
            secret_key: env::var("AWS_SECRET_ACCESS_KEY").ok(),
            text_model: env::var("BEDROCK_TEXT_MODEL").unwrap_or(defaults.text_model),
            image_model: env::var("BEDROCK_IMAGE_MODEL").unwrap_or(defaults.image_model),
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_credentials(
        mut self,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        self.access_key = Some(access_key.into());
        self.secret_key = Some(secret_key.into());
        self
    }
}

/// Knobs for one story generation run, independent of the provider.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub max_tokens: u32,
    pub temperature: f32,
    pub fallback_image_url: String,
    pub text_timeout: Duration,
    pub image_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        GenerationConfig {
            max_tokens: 2000,
            temperature: 0.8,
            fallback_image_url: DEFAULT_FALLBACK_IMAGE_URL.to_string(),
            text_timeout: Duration::from_secs(60),
            image_timeout: Duration::from_secs(120),
            request_timeout: Duration::from_secs(300),
        }
    }
}

impl GenerationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        GenerationConfig {
            max_tokens: parse_env("STORY_MAX_TOKENS").unwrap_or(defaults.max_tokens),
            temperature: parse_env("STORY_TEMPERATURE").unwrap_or(defaults.temperature),
            fallback_image_url: env::var("STORY_FALLBACK_IMAGE_URL")
                .unwrap_or(defaults.fallback_image_url),
            text_timeout: parse_env("STORY_TEXT_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.text_timeout),
            image_timeout: parse_env("STORY_IMAGE_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.image_timeout),
            request_timeout: parse_env("STORY_REQUEST_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
        }
    }

    pub fn with_fallback_image_url(mut self, url: impl Into<String>) -> Self {
        self.fallback_image_url = url.into();
        self
    }

    pub fn with_timeouts(mut self, text: Duration, image: Duration, request: Duration) -> Self {
        self.text_timeout = text;
        self.image_timeout = image;
        self.request_timeout = request;
        self
    }

    pub fn with_sampling(mut self, max_tokens: u32, temperature: f32) -> Self {
        self.max_tokens = max_tokens;
        self.temperature = temperature;
        self
    }
}

#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        PostgresConfig {
            host: None,
            port: None,
            username: None,
            password: None,
            database: None,
        }
    }
}

impl PostgresConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        PostgresConfig {
            host: env::var("POSTGRES_HOST").ok(),
            port: parse_env("POSTGRES_PORT"),
            username: env::var("POSTGRES_USERNAME").ok(),
            password: env::var("POSTGRES_PASSWORD").ok(),
            database: env::var("POSTGRES_DATABASE").ok(),
        }
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_connection_info(
        mut self,
        host: impl Into<String>,
        port: u16,
        database: impl Into<String>,
    ) -> Self {
        self.host = Some(host.into());
        self.port = Some(port);
        self.database = Some(database.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub provider: Provider,
    pub use_psql: bool,
    pub openai: OpenAiConfig,
    pub bedrock: BedrockConfig,
    pub generation: GenerationConfig,
    pub postgres: Option<PostgresConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            provider: Provider::OpenAi,
            use_psql: false,
            openai: OpenAiConfig::default(),
            bedrock: BedrockConfig::default(),
            generation: GenerationConfig::default(),
            postgres: None,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the whole configuration from the process environment.
    ///
    /// Fails only on values that are present but unusable; a missing API key
    /// is reported later, when the provider clients are built.
    pub fn from_env() -> Result<Self> {
        let provider = match env::var("STORY_PROVIDER") {
            Ok(value) => value.parse()?,
            Err(_) => Provider::OpenAi,
        };
        let use_psql = env::var("USE_PSQL").ok().map_or(false, |val| val == "true");

        Ok(Config {
            port: parse_env("PORT").unwrap_or(8080),
            provider,
            use_psql,
            openai: OpenAiConfig::from_env(),
            bedrock: BedrockConfig::from_env(),
            generation: GenerationConfig::from_env(),
            postgres: use_psql.then(PostgresConfig::from_env),
        })
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_openai(mut self, config: OpenAiConfig) -> Self {
        self.openai = config;
        self.provider = Provider::OpenAi;
        self
    }

    pub fn with_bedrock(mut self, config: BedrockConfig) -> Self {
        self.bedrock = config;
        self.provider = Provider::Bedrock;
        self
    }

    pub fn with_generation(mut self, config: GenerationConfig) -> Self {
        self.generation = config;
        self
    }

    pub fn with_postgres(mut self, config: PostgresConfig) -> Self {
        self.postgres = Some(config);
        self.use_psql = true;
        self
    }
}

fn parse_env<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_parsing() {
        assert_eq!("openai".parse::<Provider>().unwrap(), Provider::OpenAi);
        assert_eq!(" Bedrock ".parse::<Provider>().unwrap(), Provider::Bedrock);
        assert!(matches!(
            "gemini".parse::<Provider>(),
            Err(StoryError::ConfigError(_))
        ));
    }

    #[test]
    fn test_generation_defaults() {
        let config = GenerationConfig::default();
        assert_eq!(config.max_tokens, 2000);
        assert!((config.temperature - 0.8).abs() < f32::EPSILON);
        assert_eq!(config.fallback_image_url, DEFAULT_FALLBACK_IMAGE_URL);
        assert!(config.text_timeout < config.request_timeout);
    }

    #[test]
    fn test_builders() {
        let config = Config::new()
            .with_port(9000)
            .with_bedrock(BedrockConfig::new().with_region("eu-west-1"))
            .with_postgres(PostgresConfig::new().with_connection_info("db", 5432, "stories"));
        assert_eq!(config.port, 9000);
        assert_eq!(config.provider, Provider::Bedrock);
        assert_eq!(config.bedrock.region.as_deref(), Some("eu-west-1"));
        assert!(config.use_psql);

        let openai = OpenAiConfig::new();
        assert!(openai.require_api_key().is_err());
        assert_eq!(openai.with_api_key("sk-test").require_api_key().unwrap(), "sk-test");
    }
}
