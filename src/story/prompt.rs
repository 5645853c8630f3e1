use crate::models::{NarrativeRequest, ValidatedRequest};

pub const SCENE_COUNT: usize = 4;

const STYLE_QUALIFIERS: &str =
    "colorful, whimsical, storybook illustration for children, high quality";

/// Builds the system instruction for the narrative model.
///
/// The JSON shape demanded at the end is the contract `parser::parse_scenes`
/// enforces, so the two must change together.
pub fn compile_instructions(request: &ValidatedRequest) -> String {
    let mut doc = format!(
        "You are a professional children's storybook creator AI. Based on the user idea: \"{}\", \
         generate a short illustrated story in exactly {} scenes.\n\n",
        request.prompt, SCENE_COUNT
    );

    doc.push_str(&format!("Genre: {}\n", request.genre));
    doc.push_str(&format!("Tone: {}\n", request.tone));
    doc.push_str(&format!("Audience: {}\n", request.audience));
    doc.push_str(&format!("Art Style: {}\n\n", request.art_style));

    doc.push_str("Each scene must include:\n");
    doc.push_str("1. A short title for the scene.\n");
    doc.push_str(
        "2. A story text (2–3 sentences, appropriate for the audience, imaginative, and engaging).\n",
    );
    doc.push_str("3. An image_prompt that describes the illustration clearly.\n\n");

    doc.push_str("Important rules:\n");
    doc.push_str(&format!(
        "- Keep the story coherent across all {} scenes, with recurring characters, setting, and theme.\n",
        SCENE_COUNT
    ));
    doc.push_str(
        "- Ensure characters look the same in every image: restate their color, clothing, \
         expressions, and style in every image_prompt, because each illustration is drawn \
         without seeing the others.\n",
    );
    doc.push_str(&format!(
        "- Describe illustrations in the {} style: colorful, whimsical storybook pictures.\n",
        request.art_style
    ));
    doc.push_str("- Include emotions and actions in the image descriptions for stronger visuals.\n");
    doc.push_str("- Make it appropriate for the specified audience and tone.\n\n");

    doc.push_str("Return the result strictly in this JSON array format, with no other text:\n[\n");
    for n in 1..=SCENE_COUNT {
        doc.push_str(&format!(
            "  {{\n    \"title\": \"Scene {n} Title\",\n    \"scene\": \"Scene {n} story text\",\n    \"image_prompt\": \"Illustration description\"\n  }}"
        ));
        doc.push_str(if n < SCENE_COUNT { ",\n" } else { "\n" });
    }
    doc.push(']');
    doc
}

pub fn compile(request: &ValidatedRequest, max_tokens: u32, temperature: f32) -> NarrativeRequest {
    NarrativeRequest {
        system_prompt: compile_instructions(request),
        user_message: format!("Create a story based on: {}", request.prompt),
        max_tokens,
        temperature,
    }
}

/// Prompt sent to the image model for one scene.
pub fn illustration_prompt(description: &str, art_style: &str) -> String {
    format!("{}. {} style, {}", description, art_style, STYLE_QUALIFIERS)
}
