//! Glimpse Classifier
//!
//! Decides which content category a screenshot belongs to from its
//! recognized text.
//!
//! # Architecture
//!
//! ```text
//! Observations → semantic model ──ok, confident──→ verdict
//!                      │
//!                      └─error / low confidence──→ keyword scoring → verdict
//! ```
//!
//! Keyword scoring is deterministic and never fails, so
//! [`Classifier::classify_with_fallback`] always produces a verdict. The
//! returned [`Classification`] records which tier produced it.
//!
//! # Example
//!
//! ```
//! use glimpse_classifier::{Classifier, ClassifierConfig};
//! use glimpse_domain::{BoundingBox, ContentType, TextObservation};
//! use glimpse_llm::MockProvider;
//! use std::sync::Arc;
//!
//! let classifier = Classifier::new(Arc::new(MockProvider::default()), ClassifierConfig::default());
//! let observations = vec![
//!     TextObservation::new("Bohemian Rhapsody", 0.95, BoundingBox::new(0.1, 0.8, 0.8, 0.05)),
//!     TextObservation::new("Queen", 0.93, BoundingBox::new(0.1, 0.7, 0.5, 0.05)),
//!     TextObservation::new("Now Playing", 0.9, BoundingBox::new(0.1, 0.9, 0.4, 0.04)),
//! ];
//! assert_eq!(classifier.classify(&observations), ContentType::Music);
//! ```

#![warn(missing_docs)]

mod classifier;
mod config;
mod error;
pub mod keywords;
mod parser;
mod prompt;
mod spatial;

pub use classifier::{
    accept_semantic, Classification, ClassificationSource, Classifier, FallbackReason,
};
pub use config::ClassifierConfig;
pub use error::ClassificationError;
pub use keywords::{classify, keyword_scores, KeywordScores};
pub use parser::{map_content_type, parse_classification};
pub use spatial::has_music_layout;
