pub mod image_client;
pub mod text_client;

pub use image_client::OpenAiImageClient;
pub use text_client::OpenAiTextClient;

use crate::error::StoryError;

pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path)
}

/// Turns a non-success HTTP response into an `UpstreamError`, keeping the
/// body for diagnostics.
pub(crate) async fn upstream_failure(what: &str, response: reqwest::Response) -> StoryError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    log::error!("OpenAI {} API error ({}): {}", what, status, body);
    StoryError::upstream(Some(status), format!("OpenAI {} API error: {}", what, status))
}

pub(crate) fn transport_failure(what: &str, e: reqwest::Error) -> StoryError {
    log::error!("OpenAI {} request failed: {}", what, e);
    StoryError::upstream(e.status().map(|s| s.as_u16()), e.to_string())
}
