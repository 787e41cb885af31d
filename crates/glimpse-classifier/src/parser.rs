//! Parse model replies into classification results

use crate::error::ClassificationError;
use glimpse_domain::{ClassificationResult, ContentType};
use glimpse_llm::extract_json;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ClassificationReply {
    #[serde(alias = "content_type", alias = "type", alias = "category")]
    #[serde(rename = "contentType")]
    content_type: String,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    rationale: Option<String>,
}

/// Map a free-form category label onto a content type
///
/// Anything that does not name a known category or synonym is `unknown`.
pub fn map_content_type(label: &str) -> ContentType {
    let label = label.trim().to_lowercase();
    if let Some(content_type) = ContentType::parse(&label) {
        return content_type;
    }
    match label.as_str() {
        "song" | "track" | "album" | "artist" | "podcast" | "audio" => ContentType::Music,
        "film" | "movies" | "tv" | "tv show" | "tv series" | "series" | "show" | "television" => {
            ContentType::Movie
        }
        "books" | "novel" | "ebook" | "e-book" | "audiobook" => ContentType::Book,
        "memes" | "joke" | "humor" | "humour" | "image macro" => ContentType::Meme,
        _ => ContentType::Unknown,
    }
}

/// Parse a model reply `{contentType, confidence, rationale}`
///
/// Confidence is clamped into `[0, 1]`; a missing confidence counts as 0 so
/// the caller falls back to keyword scoring.
pub fn parse_classification(response: &str) -> Result<ClassificationResult, ClassificationError> {
    let json = extract_json(response)
        .map_err(|e| ClassificationError::InvalidReply(e.to_string()))?;
    let reply: ClassificationReply = serde_json::from_str(&json)?;

    Ok(ClassificationResult::new(
        map_content_type(&reply.content_type),
        reply.confidence.unwrap_or(0.0),
        reply.rationale.unwrap_or_default(),
    ))
}
