//! Configuration for the Extractor

use glimpse_domain::ContentType;
use glimpse_gatekeeper::ValidationConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for one Extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Minimum title length in characters
    pub min_title_length: usize,

    /// Minimum creator length in characters
    pub min_creator_length: usize,

    /// Results below this confidence are rejected
    pub confidence_threshold: f64,

    /// Placeholder patterns checked after the built-in denylist
    pub extra_placeholders: Vec<String>,

    /// Maximum time for a single model call (seconds)
    pub model_timeout_secs: u64,

    /// Observation text beyond this many characters is cut from the prompt
    pub max_prompt_chars: usize,
}

impl ExtractorConfig {
    /// Default configuration tuned for a content type
    pub fn for_type(content_type: ContentType) -> Self {
        match content_type {
            // Book pages and store listings carry far more text than players
            ContentType::Book => Self {
                max_prompt_chars: 8_000,
                ..Self::default()
            },
            ContentType::Movie => Self {
                extra_placeholders: vec!["coming soon".to_string()],
                ..Self::default()
            },
            _ => Self::default(),
        }
    }

    /// Strict preset: higher threshold, longer minimum fields
    pub fn strict() -> Self {
        Self {
            min_title_length: 3,
            min_creator_length: 3,
            confidence_threshold: 0.8,
            ..Self::default()
        }
    }

    /// Lenient preset: accepts weaker results and waits longer
    pub fn lenient() -> Self {
        Self {
            min_title_length: 1,
            min_creator_length: 1,
            confidence_threshold: 0.5,
            model_timeout_secs: 60,
            ..Self::default()
        }
    }

    /// Get the model timeout as a Duration
    pub fn model_timeout(&self) -> Duration {
        Duration::from_secs(self.model_timeout_secs)
    }

    /// Validation rules for the Gatekeeper
    pub fn validation_config(&self) -> ValidationConfig {
        ValidationConfig {
            min_title_length: self.min_title_length,
            min_creator_length: self.min_creator_length,
            ..ValidationConfig::default()
        }
        .with_extra_placeholders(&self.extra_placeholders)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.min_title_length == 0 || self.min_creator_length == 0 {
            return Err("minimum field lengths must be greater than 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err("confidence_threshold must be between 0.0 and 1.0".to_string());
        }
        if self.model_timeout_secs == 0 {
            return Err("model_timeout_secs must be greater than 0".to_string());
        }
        if self.max_prompt_chars == 0 {
            return Err("max_prompt_chars must be greater than 0".to_string());
        }
        Ok(())
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

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            min_title_length: 2,
            min_creator_length: 2,
            confidence_threshold: 0.7,
            extra_placeholders: Vec::new(),
            model_timeout_secs: 30,
            max_prompt_chars: 4_000,
        }
    }
}
