use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct ImageGenerationRequest {
    pub model: String,
    pub prompt: String,
    pub size: String,
    pub quality: String,
    pub output_format: String,
}

#[derive(Debug, Deserialize)]
pub struct ImageGenerationResponse {
    #[serde(default)]
    pub data: Vec<ImageDatum>,
}

#[derive(Debug, Deserialize)]
pub struct ImageDatum {
    #[serde(default)]
    pub b64_json: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct TitanImageResponse {
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub error: Option<String>,
}
