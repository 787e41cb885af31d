//! Prompt construction for semantic classification

use glimpse_domain::{reading_order_text, ContentType, TextObservation};

/// Builds the classification prompt from observations in reading order
pub struct PromptBuilder {
    text: String,
}

impl PromptBuilder {
    /// Create a builder over the observations, sorted top to bottom
    pub fn new(observations: &[TextObservation]) -> Self {
        Self {
            text: reading_order_text(observations),
        }
    }

    /// Build the complete classification prompt
    pub fn build(&self) -> String {
        let categories = ContentType::RANKED
            .iter()
            .map(|c| c.as_str())
            .chain(std::iter::once(ContentType::Unknown.as_str()))
            .collect::<Vec<_>>()
            .join(", ");

        let mut prompt = String::new();
        prompt.push_str(CLASSIFICATION_INSTRUCTIONS);
        prompt.push_str("\n\n");
        prompt.push_str(&format!("Allowed categories: {}\n\n", categories));
        prompt.push_str("Screenshot text (top to bottom):\n");
        prompt.push_str("---\n");
        prompt.push_str(&self.text);
        prompt.push_str("\n---\n\n");
        prompt.push_str(OUTPUT_FORMAT_REMINDER);
        prompt
    }
}

/// Schema hint passed to providers with a structured output mode
pub const RESPONSE_SCHEMA: &str = r#"{"type":"object","properties":{"contentType":{"type":"string"},"confidence":{"type":"number"},"rationale":{"type":"string"}},"required":["contentType","confidence"]}"#;

const CLASSIFICATION_INSTRUCTIONS: &str = r#"You are classifying the text recognized in a phone screenshot.
Decide what the screenshot is mainly about:
- music: a song, album or artist, usually from a player or streaming app
- movie: a film or TV show, including streaming and review apps
- book: a book, e-book or audiobook
- meme: a joke image or social media humour
- unknown: anything else, or when the text is too sparse to tell

The text comes from OCR and may contain app chrome, timestamps and typos.
If you are unsure, answer with a confidence below 0.5."#;

const OUTPUT_FORMAT_REMINDER: &str = r#"Respond with a single JSON object and nothing else:
{"contentType": "<category>", "confidence": <0.0-1.0>, "rationale": "<one short sentence>"}"#;
