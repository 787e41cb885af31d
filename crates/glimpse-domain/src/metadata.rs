//! Extracted metadata module

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Structured metadata extracted for music, movies and books
///
/// The shape is identical for every extracting type. Type-specific extras
/// (album, year, director, isbn, ...) go into `auxiliary_fields`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedMetadata {
    /// Song, film or book title
    pub title: String,

    /// Artist, director or author
    pub creator: String,

    /// Type-specific extra fields
    #[serde(default)]
    pub auxiliary_fields: BTreeMap<String, String>,

    /// Extraction confidence in `[0, 1]`
    pub confidence_score: f64,

    /// Source fragments the metadata was derived from, in reading order
    #[serde(default)]
    pub raw_text: Vec<String>,
}

impl ExtractedMetadata {
    /// Create metadata with no auxiliary fields
    pub fn new(
        title: impl Into<String>,
        creator: impl Into<String>,
        confidence_score: f64,
        raw_text: Vec<String>,
    ) -> Self {
        Self {
            title: title.into(),
            creator: creator.into(),
            auxiliary_fields: BTreeMap::new(),
            confidence_score,
            raw_text,
        }
    }

    /// Attach an auxiliary field, skipping blank values
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.trim().is_empty() {
            self.auxiliary_fields.insert(key.into(), value);
        }
        self
    }
}
