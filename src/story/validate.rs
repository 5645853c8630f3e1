use crate::{
    error::{Result, StoryError, PROMPT_REQUIRED},
    models::{
        GenerationRequest, ValidatedRequest, DEFAULT_ART_STYLE, DEFAULT_AUDIENCE, DEFAULT_GENRE,
        DEFAULT_TONE,
    },
};

/// Rejects requests without a usable prompt and resolves the style labels.
pub fn validate(request: &GenerationRequest) -> Result<ValidatedRequest> {
    let prompt = request
        .prompt
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| StoryError::ValidationError(PROMPT_REQUIRED.to_string()))?;

    Ok(ValidatedRequest {
        prompt: prompt.to_string(),
        genre: label_or(&request.genre, DEFAULT_GENRE),
        tone: label_or(&request.tone, DEFAULT_TONE),
        audience: label_or(&request.audience, DEFAULT_AUDIENCE),
        art_style: label_or(&request.art_style, DEFAULT_ART_STYLE),
    })
}

fn label_or(label: &Option<String>, default: &str) -> String {
    match label.as_deref().map(str::trim) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => default.to_string(),
    }
}
