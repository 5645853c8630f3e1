use super::prompt::SCENE_COUNT;
use crate::{
    error::{Result, StoryError},
    models::SceneDraft,
};
#[cfg(test)]
use crate::error::SCHEMA_PARSE_FAILED;
use serde_json::{Map, Value};

/// Parses raw narrative model output into exactly `SCENE_COUNT` drafts.
///
/// The text is untrusted. It is first read as loose JSON, then every entry is
/// checked field by field; nothing is coerced. A single surrounding Markdown
/// code fence is the only decoration tolerated.
pub fn parse_scenes(raw: &str) -> Result<Vec<SceneDraft>> {
    let body = strip_code_fence(raw);
    let value: Value = serde_json::from_str(body)
        .map_err(|e| StoryError::SchemaError(format!("output is not valid JSON: {}", e)))?;

    let entries = value
        .as_array()
        .ok_or_else(|| StoryError::SchemaError("expected a JSON array of scenes".into()))?;

    if entries.len() != SCENE_COUNT {
        return Err(StoryError::SchemaError(format!(
            "expected {} scenes, got {}",
            SCENE_COUNT,
            entries.len()
        )));
    }

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| parse_entry(index + 1, entry))
        .collect()
}

fn parse_entry(position: usize, entry: &Value) -> Result<SceneDraft> {
    let object = entry.as_object().ok_or_else(|| {
        StoryError::SchemaError(format!("scene {} is not an object", position))
    })?;

    Ok(SceneDraft {
        title: optional_string(object, "title", position)?,
        narrative_text: required_string(object, "scene", position)?,
        illustration_description: required_string(object, "image_prompt", position)?,
    })
}

fn required_string(object: &Map<String, Value>, key: &str, position: usize) -> Result<String> {
    match object.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.clone()),
        Some(Value::String(_)) => Err(StoryError::SchemaError(format!(
            "scene {} has an empty \"{}\"",
            position, key
        ))),
        Some(_) => Err(StoryError::SchemaError(format!(
            "scene {} field \"{}\" is not a string",
            position, key
        ))),
        None => Err(StoryError::SchemaError(format!(
            "scene {} is missing \"{}\"",
            position, key
        ))),
    }
}

fn optional_string(object: &Map<String, Value>, key: &str, position: usize) -> Result<String> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(StoryError::SchemaError(format!(
            "scene {} field \"{}\" is not a string",
            position, key
        ))),
    }
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(inner) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // drop the info string (`json`) on the opening fence line
    match inner.find('\n') {
        Some(newline) => inner[newline + 1..].trim(),
        None => inner.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene_json(n: usize) -> String {
        format!(
            r#"{{"title": "Title {n}", "scene": "Scene text {n}.", "image_prompt": "Picture {n}"}}"#
        )
    }

    fn array_of(count: usize) -> String {
        let entries: Vec<String> = (1..=count).map(scene_json).collect();
        format!("[{}]", entries.join(","))
    }

    fn assert_schema_error(result: Result<Vec<SceneDraft>>) {
        match result {
            Err(StoryError::SchemaError(_)) => {}
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_parses_four_scenes_in_order() {
        let drafts = parse_scenes(&array_of(4)).unwrap();
        assert_eq!(drafts.len(), 4);
        for (i, draft) in drafts.iter().enumerate() {
            assert_eq!(draft.title, format!("Title {}", i + 1));
            assert_eq!(draft.narrative_text, format!("Scene text {}.", i + 1));
            assert_eq!(draft.illustration_description, format!("Picture {}", i + 1));
        }
    }

    #[test]
    fn test_accepts_code_fence() {
        let fenced = format!("```json\n{}\n```", array_of(4));
        assert_eq!(parse_scenes(&fenced).unwrap().len(), 4);
        let bare_fence = format!("  ```\n{}\n```  ", array_of(4));
        assert_eq!(parse_scenes(&bare_fence).unwrap().len(), 4);
    }

    #[test]
    fn test_schema_message() {
        let err = parse_scenes("not json").unwrap_err();
        assert!(err.to_string().starts_with(SCHEMA_PARSE_FAILED));
    }

    #[test]
    fn test_rejects_non_json() {
        assert_schema_error(parse_scenes("Once upon a time there was a fox."));
        assert_schema_error(parse_scenes(""));
        assert_schema_error(parse_scenes(r#"{"title": "not an array"}"#));
    }

    #[test]
    fn test_rejects_wrong_cardinality() {
        assert_schema_error(parse_scenes(&array_of(3)));
        assert_schema_error(parse_scenes(&array_of(5)));
        assert_schema_error(parse_scenes("[]"));
    }

    #[test]
    fn test_rejects_malformed_entries() {
        let missing_prompt = r#"[
            {"title": "A", "scene": "a"},
            {"title": "B", "scene": "b", "image_prompt": "b"},
            {"title": "C", "scene": "c", "image_prompt": "c"},
            {"title": "D", "scene": "d", "image_prompt": "d"}
        ]"#;
        assert_schema_error(parse_scenes(missing_prompt));

        let numeric_scene = array_of(4).replacen("\"Scene text 2.\"", "2", 1);
        assert_schema_error(parse_scenes(&numeric_scene));

        let not_object = format!("[{}, {}, {}, \"four\"]", scene_json(1), scene_json(2), scene_json(3));
        assert_schema_error(parse_scenes(&not_object));

        let numeric_title = array_of(4).replacen("\"Title 1\"", "7", 1);
        assert_schema_error(parse_scenes(&numeric_title));
    }

    #[test]
    fn test_title_may_be_absent() {
        let raw = array_of(4).replacen("\"title\": \"Title 1\", ", "", 1);
        let drafts = parse_scenes(&raw).unwrap();
        assert_eq!(drafts[0].title, "");
        assert_eq!(drafts[1].title, "Title 2");
    }
}
