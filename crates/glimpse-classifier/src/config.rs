//! Configuration for the Classifier

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the Classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Semantic verdicts below this confidence fall back to keyword scoring
    pub min_semantic_confidence: f64,

    /// Minimum keyword hits for the winning category; fewer means unknown
    pub min_keyword_matches: usize,

    /// A fragment must exceed this confidence to count towards the spatial
    /// music pattern
    pub spatial_confidence_threshold: f64,

    /// Number of confident upper-half fragments that make a music layout
    pub spatial_min_fragments: usize,

    /// Maximum time for a single model call (seconds)
    pub model_timeout_secs: u64,

    /// Confidence reported for a keyword verdict before per-hit bonus
    pub fallback_base_confidence: f64,

    /// Confidence added per keyword hit
    pub fallback_confidence_step: f64,
}

impl ClassifierConfig {
    /// Get the model timeout as a Duration
    pub fn model_timeout(&self) -> Duration {
        Duration::from_secs(self.model_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.min_semantic_confidence) {
            return Err("min_semantic_confidence must be between 0.0 and 1.0".to_string());
        }
        if self.min_keyword_matches == 0 {
            return Err("min_keyword_matches must be greater than 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.spatial_confidence_threshold) {
            return Err("spatial_confidence_threshold must be between 0.0 and 1.0".to_string());
        }
        if self.spatial_min_fragments == 0 {
            return Err("spatial_min_fragments must be greater than 0".to_string());
        }
        if self.model_timeout_secs == 0 {
            return Err("model_timeout_secs must be greater than 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.fallback_base_confidence)
            || !(0.0..=1.0).contains(&self.fallback_confidence_step)
        {
            return Err("fallback confidences must be between 0.0 and 1.0".to_string());
        }
        Ok(())
    }

    /// Strict preset: trust the model only when it is sure
    pub fn strict() -> Self {
        Self {
            min_semantic_confidence: 0.8,
            min_keyword_matches: 2,
            spatial_confidence_threshold: 0.9,
            spatial_min_fragments: 3,
            ..Self::default()
        }
    }

    /// Lenient preset: accept weaker signals from both tiers
    pub fn lenient() -> Self {
        Self {
            min_semantic_confidence: 0.4,
            spatial_confidence_threshold: 0.7,
            model_timeout_secs: 60,
            ..Self::default()
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            min_semantic_confidence: 0.6,
            min_keyword_matches: 1,
            spatial_confidence_threshold: 0.8,
            spatial_min_fragments: 2,
            model_timeout_secs: 30,
            fallback_base_confidence: 0.5,
            fallback_confidence_step: 0.1,
        }
    }
}
