//! Gatekeeper configuration

use serde::{Deserialize, Serialize};

/// Template and filler strings models emit instead of real metadata
pub const DEFAULT_PLACEHOLDERS: &[&str] = &[
    "unknown",
    "n/a",
    "title here",
    "song title",
    "movie title",
    "book title",
    "artist name",
    "author name",
    "director name",
    "test artist",
    "untitled",
    "placeholder",
    "lorem ipsum",
];

/// Configuration for validation rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Case-insensitive substrings that mark a field as placeholder output,
    /// checked in order
    pub placeholder_patterns: Vec<String>,

    /// Minimum title length in characters, after trimming
    pub min_title_length: usize,

    /// Minimum creator length in characters, after trimming
    pub min_creator_length: usize,

    /// Enable confidence range checking
    pub validate_confidence_range: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            placeholder_patterns: DEFAULT_PLACEHOLDERS.iter().map(|p| p.to_string()).collect(),
            min_title_length: 2,
            min_creator_length: 2,
            validate_confidence_range: true,
        }
    }
}

impl ValidationConfig {
    /// Create a permissive configuration (single-character fields allowed)
    pub fn permissive() -> Self {
        Self {
            min_title_length: 1,
            min_creator_length: 1,
            ..Self::default()
        }
    }

    /// Create a strict configuration (longer minimum lengths)
    pub fn strict() -> Self {
        Self {
            min_title_length: 3,
            min_creator_length: 3,
            ..Self::default()
        }
    }

    /// Append placeholder patterns after the configured ones, skipping
    /// blanks and duplicates
    pub fn with_extra_placeholders<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for pattern in patterns {
            let pattern = pattern.as_ref().trim().to_lowercase();
            if !pattern.is_empty() && !self.placeholder_patterns.contains(&pattern) {
                self.placeholder_patterns.push(pattern);
            }
        }
        self
    }
}
