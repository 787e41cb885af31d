//! Prompt construction for semantic extraction

use glimpse_domain::ContentType;

/// JSON key the model uses for the creator of a content type
pub fn creator_field(content_type: ContentType) -> &'static str {
    match content_type {
        ContentType::Music => "artist",
        ContentType::Movie => "director",
        ContentType::Book => "author",
        _ => "creator",
    }
}

/// Optional extra keys requested for a content type
pub fn auxiliary_fields(content_type: ContentType) -> &'static [&'static str] {
    match content_type {
        ContentType::Music => &["album", "year"],
        ContentType::Movie => &["year", "studio"],
        ContentType::Book => &["publisher", "isbn"],
        _ => &[],
    }
}

fn subject(content_type: ContentType) -> &'static str {
    match content_type {
        ContentType::Music => "song",
        ContentType::Movie => "film or TV show",
        ContentType::Book => "book",
        _ => "item",
    }
}

/// Builds the extraction prompt for one content type
pub struct PromptBuilder {
    content_type: ContentType,
    text: String,
    max_chars: usize,
}

impl PromptBuilder {
    /// Create a prompt builder over reading-order text
    pub fn new(content_type: ContentType, text: impl Into<String>) -> Self {
        Self {
            content_type,
            text: text.into(),
            max_chars: usize::MAX,
        }
    }

    /// Cut the screenshot text after `max_chars` characters
    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    /// Build the complete extraction prompt
    pub fn build(&self) -> String {
        let creator = creator_field(self.content_type);
        let subject = subject(self.content_type);

        let mut prompt = String::new();
        prompt.push_str(&format!(
            "Extract the {} shown in this phone screenshot.\n",
            subject
        ));
        prompt.push_str(EXTRACTION_INSTRUCTIONS);
        prompt.push_str("\n\n");

        prompt.push_str("Screenshot text (top to bottom):\n");
        prompt.push_str("---\n");
        prompt.push_str(self.truncated_text());
        prompt.push_str("\n---\n\n");

        let mut keys = vec![
            "\"title\": \"...\"".to_string(),
            format!("\"{}\": \"...\"", creator),
        ];
        keys.extend(
            auxiliary_fields(self.content_type)
                .iter()
                .map(|field| format!("\"{}\": \"...\"", field)),
        );
        keys.push("\"confidence\": 0.0-1.0".to_string());

        prompt.push_str("Respond with a single JSON object and nothing else:\n");
        prompt.push_str(&format!("{{{}}}\n", keys.join(", ")));
        prompt.push_str("Leave optional fields out when they are not visible.");
        prompt
    }

    fn truncated_text(&self) -> &str {
        match self.text.char_indices().nth(self.max_chars) {
            Some((cut, _)) => &self.text[..cut],
            None => &self.text,
        }
    }
}

/// Schema hint passed to providers with a structured output mode
pub fn response_schema(content_type: ContentType) -> String {
    let mut properties = vec![
        "\"title\":{\"type\":\"string\"}".to_string(),
        format!("\"{}\":{{\"type\":\"string\"}}", creator_field(content_type)),
        "\"confidence\":{\"type\":\"number\"}".to_string(),
    ];
    properties.extend(
        auxiliary_fields(content_type)
            .iter()
            .map(|field| format!("\"{}\":{{\"type\":\"string\"}}", field)),
    );
    format!(
        "{{\"type\":\"object\",\"properties\":{{{}}},\"required\":[\"title\",\"{}\",\"confidence\"]}}",
        properties.join(","),
        creator_field(content_type)
    )
}

const EXTRACTION_INSTRUCTIONS: &str = r#"The text comes from OCR and may include app names, buttons, timestamps and typos; ignore those.
Only report what is actually written in the text. Never answer with template values such as
"Song Title", "Artist Name", "Unknown" or "N/A".
If you are uncertain about the title or creator, still give your best reading but report a
confidence below 0.5."#;
