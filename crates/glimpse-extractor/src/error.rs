//! Error types for the Extractor

use glimpse_domain::{ContentType, LlmError};
use thiserror::Error;

/// Errors that can occur during extraction
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractionError {
    /// The observations do not look like the content type being extracted
    #[error("Wrong content type: expected {expected}, found {found}")]
    WrongContentType {
        /// Type the caller assumed
        expected: ContentType,
        /// Type the gate saw
        found: ContentType,
    },

    /// No usable title
    #[error("Title not found")]
    TitleNotFound,

    /// No usable artist, director or author
    #[error("Creator not found")]
    CreatorNotFound,

    /// Extraction confidence below the configured threshold
    #[error("Confidence too low: {0:.2} (threshold: {1:.2})")]
    ConfidenceTooLow(f64, f64),

    /// The extraction model is not available on this host
    #[error("Extraction model unavailable: {0}")]
    ModelUnavailable(String),

    /// The extraction output failed validation or could not be read
    #[error("Invalid extraction result: {0}")]
    InvalidExtractionResult(String),

    /// Any other model provider failure
    #[error("Provider error: {0}")]
    Provider(String),

    /// The model did not answer in time
    #[error("Extraction timeout")]
    Timeout,
}

impl ExtractionError {
    /// Whether a later attempt could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            ExtractionError::WrongContentType { .. }
            | ExtractionError::ModelUnavailable(_)
            | ExtractionError::InvalidExtractionResult(_) => false,
            ExtractionError::TitleNotFound
            | ExtractionError::CreatorNotFound
            | ExtractionError::ConfidenceTooLow(_, _)
            | ExtractionError::Provider(_)
            | ExtractionError::Timeout => true,
        }
    }

    /// Whether the item is ambiguous rather than broken
    ///
    /// Ambiguous items are flagged for review; the rest are hard failures.
    pub fn is_ambiguity(&self) -> bool {
        matches!(
            self,
            ExtractionError::WrongContentType { .. }
                | ExtractionError::TitleNotFound
                | ExtractionError::CreatorNotFound
                | ExtractionError::ConfidenceTooLow(_, _)
                | ExtractionError::InvalidExtractionResult(_)
        )
    }

    /// Human-readable message for the item's outcome
    pub fn user_message(&self) -> String {
        match self {
            ExtractionError::WrongContentType { expected, .. } => format!(
                "This doesn't look like {} after all",
                expected.display_name().to_lowercase()
            ),
            ExtractionError::TitleNotFound => "Couldn't find a title".to_string(),
            ExtractionError::CreatorNotFound => "Couldn't tell who made this".to_string(),
            ExtractionError::ConfidenceTooLow(_, _) => {
                "Not sure enough about the details to file this".to_string()
            }
            ExtractionError::ModelUnavailable(_) => {
                "On-device model isn't available on this device".to_string()
            }
            ExtractionError::InvalidExtractionResult(reason) => {
                format!("Details looked wrong: {}", reason)
            }
            ExtractionError::Provider(_) => "Couldn't read the details right now".to_string(),
            ExtractionError::Timeout => "Reading the details took too long".to_string(),
        }
    }
}

impl From<LlmError> for ExtractionError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::ModelNotAvailable(model) => ExtractionError::ModelUnavailable(model),
            other => ExtractionError::Provider(other.to_string()),
        }
    }
}
