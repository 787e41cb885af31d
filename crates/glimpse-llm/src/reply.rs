//! Helpers for unwrapping model replies

use crate::LlmError;

/// Extract the JSON payload from a model reply
///
/// Models sometimes wrap JSON in markdown code blocks or surround it with
/// prose; this returns the object between the first `{` and the last `}`.
pub fn extract_json(response: &str) -> Result<String, LlmError> {
    let trimmed = response.trim();

    let body = if trimmed.starts_with("```") {
        let lines: Vec<&str> = trimmed.lines().collect();
        if lines.len() < 2 {
            return Err(LlmError::InvalidResponse("Empty code block".to_string()));
        }
        // Skip first line (```json or ```) and the closing fence
        let end = if lines[lines.len() - 1].trim_start().starts_with("```") {
            lines.len() - 1
        } else {
            lines.len()
        };
        lines[1..end].join("\n")
    } else {
        trimmed.to_string()
    };

    match (body.find('{'), body.rfind('}')) {
        (Some(start), Some(end)) if start < end => Ok(body[start..=end].to_string()),
        _ => Err(LlmError::InvalidResponse(
            "Reply does not contain a JSON object".to_string(),
        )),
    }
}
