//! Classification result module

use crate::ContentType;

/// Clamp a confidence value into `[0, 1]`
///
/// Non-finite values (NaN, infinities) clamp to 0.
pub fn clamp_confidence(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Verdict of a classifier
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    /// Winning category
    pub content_type: ContentType,

    /// Confidence in `[0, 1]`
    confidence: f64,

    /// Short explanation of the verdict
    pub rationale: String,
}

impl ClassificationResult {
    /// Create a result, clamping the confidence
    pub fn new(content_type: ContentType, confidence: f64, rationale: impl Into<String>) -> Self {
        Self {
            content_type,
            confidence: clamp_confidence(confidence),
            rationale: rationale.into(),
        }
    }

    /// An `unknown` verdict with zero confidence
    pub fn unknown(rationale: impl Into<String>) -> Self {
        Self::new(ContentType::Unknown, 0.0, rationale)
    }

    /// Clamped confidence
    pub fn confidence(&self) -> f64 {
        self.confidence
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_clamps_out_of_range() {
        assert_eq!(ClassificationResult::new(ContentType::Music, 1.7, "").confidence(), 1.0);
        assert_eq!(ClassificationResult::new(ContentType::Music, -0.2, "").confidence(), 0.0);
        assert_eq!(ClassificationResult::new(ContentType::Music, f64::NAN, "").confidence(), 0.0);
    }

    #[test]
    fn test_unknown_has_zero_confidence() {
        let result = ClassificationResult::unknown("nothing matched");
        assert_eq!(result.content_type, ContentType::Unknown);
        assert_eq!(result.confidence(), 0.0);
    }

    proptest! {
        #[test]
        fn prop_confidence_always_in_unit_range(raw in proptest::num::f64::ANY) {
            let result = ClassificationResult::new(ContentType::Book, raw, "prop");
            prop_assert!((0.0..=1.0).contains(&result.confidence()));
        }
    }
}
