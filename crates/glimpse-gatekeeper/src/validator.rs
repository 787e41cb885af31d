//! Metadata validation logic

use crate::ValidationConfig;
use glimpse_domain::ExtractedMetadata;
use std::fmt;
use tracing::debug;

/// Result of metadata validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    /// Whether the metadata passed validation
    pub status: ValidationStatus,

    /// Rejection reasons in check order (empty when accepted)
    pub reasons: Vec<RejectionReason>,

    /// Quality score (0.0-1.0)
    pub quality_score: f64,
}

impl ValidationResult {
    /// Whether the metadata was accepted
    pub fn is_accepted(&self) -> bool {
        self.status == ValidationStatus::Accepted
    }

    /// The first failed check, if any
    pub fn first_reason(&self) -> Option<&RejectionReason> {
        self.reasons.first()
    }
}

/// Validation status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationStatus {
    /// Metadata accepted
    Accepted,

    /// Metadata rejected
    Rejected,
}

/// Metadata field a check applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// The title
    Title,
    /// The artist, director or author
    Creator,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Title => write!(f, "title"),
            Field::Creator => write!(f, "creator"),
        }
    }
}

/// Reasons for rejection
#[derive(Debug, Clone, PartialEq)]
pub enum RejectionReason {
    /// Field shorter than the configured minimum
    TooShort {
        /// Offending field
        field: Field,
        /// Actual length in characters
        length: usize,
        /// Required minimum
        minimum: usize,
    },

    /// Field contains a denylisted placeholder pattern
    Placeholder {
        /// Offending field
        field: Field,
        /// First pattern that matched
        pattern: String,
    },

    /// Confidence score outside `[0, 1]` or not a number
    ConfidenceOutOfRange(f64),
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::TooShort {
                field,
                length,
                minimum,
            } => write!(
                f,
                "{} is too short ({} characters, minimum {})",
                field, length, minimum
            ),
            RejectionReason::Placeholder { field, pattern } => {
                write!(f, "{} contains placeholder pattern '{}'", field, pattern)
            }
            RejectionReason::ConfidenceOutOfRange(score) => {
                write!(f, "confidence {} is outside [0.0, 1.0]", score)
            }
        }
    }
}

/// The Gatekeeper rejects placeholder, truncated or out-of-range metadata
#[derive(Debug, Clone)]
pub struct Gatekeeper {
    config: ValidationConfig,
}

impl Gatekeeper {
    /// Create a new Gatekeeper with the given configuration
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Create a Gatekeeper with default configuration
    pub fn default_config() -> Self {
        Self::new(ValidationConfig::default())
    }

    /// Active configuration
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validate metadata against the configured rules
    ///
    /// Checks run title then creator (length, then placeholder), then the
    /// confidence range. Every failed check is reported, in that order.
    pub fn validate(&self, metadata: &ExtractedMetadata) -> ValidationResult {
        let mut reasons = Vec::new();
        let mut quality_score: f64 = 1.0;

        let fields = [
            (Field::Title, metadata.title.as_str(), self.config.min_title_length),
            (Field::Creator, metadata.creator.as_str(), self.config.min_creator_length),
        ];

        for (field, value, minimum) in fields {
            let length = value.trim().chars().count();
            if length < minimum {
                reasons.push(RejectionReason::TooShort {
                    field,
                    length,
                    minimum,
                });
                quality_score -= 0.3;
            }

            if let Some(pattern) = self.placeholder_in(value) {
                reasons.push(RejectionReason::Placeholder {
                    field,
                    pattern: pattern.to_string(),
                });
                quality_score -= 0.5;
            }
        }

        if self.config.validate_confidence_range
            && !(0.0..=1.0).contains(&metadata.confidence_score)
        {
            reasons.push(RejectionReason::ConfidenceOutOfRange(metadata.confidence_score));
            quality_score -= 0.4;
        }

        let status = if reasons.is_empty() {
            ValidationStatus::Accepted
        } else {
            debug!("Rejected metadata '{}': {}", metadata.title, reasons[0]);
            ValidationStatus::Rejected
        };

        ValidationResult {
            status,
            reasons,
            quality_score: quality_score.max(0.0),
        }
    }

    /// First configured placeholder pattern the value contains, ignoring case
    fn placeholder_in(&self, value: &str) -> Option<&str> {
        let value = value.to_lowercase();
        self.config
            .placeholder_patterns
            .iter()
            .find(|pattern| !pattern.is_empty() && value.contains(&pattern.to_lowercase()))
            .map(String::as_str)
    }
}
