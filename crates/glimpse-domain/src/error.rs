//! Error types returned by external collaborators

use thiserror::Error;

/// Errors from the text recognition collaborator
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecognitionError {
    /// The image contains no recognizable text
    #[error("No text found")]
    NoTextFound,

    /// Recognition itself failed
    #[error("Recognition failed: {0}")]
    RecognitionFailed(String),
}

impl RecognitionError {
    /// Whether a later attempt could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, RecognitionError::RecognitionFailed(_))
    }
}

/// Errors from a language model provider
///
/// `SafetyRefusal` is deliberately a distinct variant so callers can branch on
/// it with a type match instead of inspecting error text.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LlmError {
    /// The model declined the input on content-safety grounds
    #[error("Model refused the input on safety grounds")]
    SafetyRefusal,

    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from the model
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model capability absent on this host
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

/// Errors from the metadata lookup and destination routing collaborators
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LookupError {
    /// No match for the supplied metadata
    #[error("No match found for '{0}'")]
    NotFound(String),

    /// The service could not be reached
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// The service throttled the request
    #[error("Rate limited")]
    RateLimited,

    /// The call did not complete in time
    #[error("Timed out")]
    Timeout,

    /// Anything else
    #[error("Lookup error: {0}")]
    Other(String),
}

impl LookupError {
    /// Lookup failures are always worth retrying later
    pub fn is_retryable(&self) -> bool {
        true
    }
}

/// Errors from the upstream item catalog
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    /// The catalog could not be read
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),

    /// Access to the catalog was denied
    #[error("Catalog access denied")]
    AccessDenied,
}
