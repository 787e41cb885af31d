//! Parse model replies into extracted metadata

use crate::error::ExtractionError;
use crate::prompt::{auxiliary_fields, creator_field};
use glimpse_domain::{ContentType, ExtractedMetadata};
use glimpse_llm::extract_json;
use serde_json::{Map, Value};

fn string_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find_map(|value| match value {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}

/// Parse a model reply into metadata for `content_type`
///
/// The creator is read from the type's own key (`artist`, `director`,
/// `author`) or a generic `creator` key. A missing confidence reads as 0.
pub fn parse_extraction(
    response: &str,
    content_type: ContentType,
    raw_text: Vec<String>,
) -> Result<ExtractedMetadata, ExtractionError> {
    let json_str = extract_json(response)
        .map_err(|e| ExtractionError::InvalidExtractionResult(e.to_string()))?;

    let json: Value = serde_json::from_str(&json_str).map_err(|e| {
        ExtractionError::InvalidExtractionResult(format!("JSON parse error: {}", e))
    })?;

    let obj = json.as_object().ok_or_else(|| {
        ExtractionError::InvalidExtractionResult("Expected a JSON object".to_string())
    })?;

    let title = string_field(obj, &["title"]).ok_or(ExtractionError::TitleNotFound)?;
    let creator = string_field(obj, &[creator_field(content_type), "creator"])
        .ok_or(ExtractionError::CreatorNotFound)?;

    let confidence = obj
        .get("confidence")
        .or_else(|| obj.get("confidenceScore"))
        .and_then(Value::as_f64)
        .unwrap_or(0.0);

    let mut metadata = ExtractedMetadata::new(title, creator, confidence, raw_text);
    for field in auxiliary_fields(content_type) {
        if let Some(value) = string_field(obj, &[*field]) {
            metadata = metadata.with_field(*field, value);
        }
    }

    Ok(metadata)
}
