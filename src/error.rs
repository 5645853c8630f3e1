use thiserror::Error;

pub const PROMPT_REQUIRED: &str = "Prompt is required";
pub const SCHEMA_PARSE_FAILED: &str = "Failed to parse story content";
pub const GENERATION_FAILED: &str = "Failed to generate story";

#[derive(Debug, Error)]
pub enum StoryError {
    #[error("{0}")]
    ValidationError(String),
    #[error("Upstream error{}: {message}", format_status(.status))]
    UpstreamError {
        status: Option<u16>,
        message: String,
    },
    #[error("{}: {}", SCHEMA_PARSE_FAILED, .0)]
    SchemaError(String),
    #[error("Timed out: {0}")]
    TimeoutError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Storage error: {0}")]
    StorageError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("AWS error: {0}")]
    AwsError(String),
}

fn format_status(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({})", s)).unwrap_or_default()
}

impl StoryError {
    pub fn upstream(status: Option<u16>, message: impl Into<String>) -> Self {
        StoryError::UpstreamError {
            status,
            message: message.into(),
        }
    }

    /// HTTP status the error maps to at the outbound boundary.
    pub fn status_code(&self) -> u16 {
        match self {
            StoryError::ValidationError(_) => 400,
            StoryError::Unauthorized(_) => 401,
            StoryError::NotFound(_) => 404,
            StoryError::TimeoutError(_) => 504,
            _ => 500,
        }
    }

    /// Only validation failures are the caller's fault.
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

impl From<serde_json::Error> for StoryError {
    fn from(e: serde_json::Error) -> Self {
        StoryError::SerializationError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StoryError>;
