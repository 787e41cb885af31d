//! Glimpse Domain Layer
//!
//! Core data model and collaborator contracts shared by every Glimpse crate.
//!
//! ## Key Concepts
//!
//! - **TextObservation**: one OCR fragment with confidence and on-screen position
//! - **ContentType**: the closed set of categories an item can belong to
//! - **ClassificationResult**: a category verdict with a clamped confidence
//! - **ExtractedMetadata**: structured title/creator data for extracting categories
//! - **Outcome**: the single persisted result of processing one item
//!
//! ## Architecture
//!
//! This crate holds no infrastructure. Recognition, language models, lookup,
//! routing and persistence are expressed as traits in [`traits`]; concrete
//! implementations live in other crates or in the embedding application.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod classification;
pub mod content_type;
pub mod error;
pub mod metadata;
pub mod observation;
pub mod outcome;
pub mod traits;

// Re-exports for convenience
pub use classification::{clamp_confidence, ClassificationResult};
pub use content_type::ContentType;
pub use error::{CatalogError, LlmError, LookupError, RecognitionError};
pub use metadata::ExtractedMetadata;
pub use observation::{reading_order_text, sorted_by_reading_order, BoundingBox, TextObservation};
pub use outcome::{ItemHandle, ItemId, Outcome, OutcomeStatus};
