//! Error types for the Classifier
//!
//! These never escape `classify_with_fallback`; they are carried in the
//! fallback reason so callers can see why the keyword path was used.

use glimpse_domain::LlmError;
use thiserror::Error;

/// Errors that can occur on the semantic classification path
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClassificationError {
    /// There was no text to classify
    #[error("No text to classify")]
    EmptyInput,

    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// The model did not answer in time
    #[error("Classification timeout")]
    Timeout,

    /// The model's reply could not be parsed
    #[error("Invalid classification reply: {0}")]
    InvalidReply(String),

    /// The blocking worker running the model call died
    #[error("Worker error: {0}")]
    Worker(String),
}

impl From<serde_json::Error> for ClassificationError {
    fn from(e: serde_json::Error) -> Self {
        ClassificationError::InvalidReply(e.to_string())
    }
}
