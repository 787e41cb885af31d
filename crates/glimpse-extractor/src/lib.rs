//! Glimpse Extractor
//!
//! Derives validated title/creator metadata from a screenshot's text for
//! the content types that carry it (music, movies, books).
//!
//! # Architecture
//!
//! ```text
//! Observations → gate → semantic model ──────────────→ Gatekeeper → confidence gate
//!                            │                              ↑
//!                            └─safety refusal─→ patterns ───┘
//! ```
//!
//! - **Gate**: the observations must still look like the assumed type
//!   (for music, a player-like layout also admits them)
//! - **Semantic**: a type-specific prompt asks the model for JSON
//! - **Fallback**: only a safety refusal switches to deterministic pattern
//!   matching; every other failure propagates unchanged
//! - **Validation**: placeholder, length and range checks, then the
//!   confidence threshold
//!
//! # Example Usage
//!
//! ```no_run
//! use glimpse_domain::{BoundingBox, ContentType, TextObservation};
//! use glimpse_extractor::{Extractor, ExtractorConfig};
//! use glimpse_llm::OllamaProvider;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = Arc::new(OllamaProvider::default_endpoint("llama3.2")?);
//! let extractor = Extractor::new(ContentType::Music, llm, ExtractorConfig::default());
//!
//! let observations = vec![
//!     TextObservation::new("Now Playing", 0.9, BoundingBox::new(0.1, 0.9, 0.4, 0.04)),
//!     TextObservation::new("Bohemian Rhapsody", 0.95, BoundingBox::new(0.1, 0.8, 0.8, 0.05)),
//!     TextObservation::new("Queen", 0.93, BoundingBox::new(0.1, 0.7, 0.5, 0.05)),
//! ];
//! let metadata = extractor.extract(&observations, ContentType::Music).await?;
//! println!("{} by {}", metadata.title, metadata.creator);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod extractor;
pub mod fallback;
mod parser;
mod prompt;
mod set;

pub use config::ExtractorConfig;
pub use error::ExtractionError;
pub use extractor::{Extraction, ExtractionSource, Extractor};
pub use fallback::FallbackStrategy;
pub use parser::parse_extraction;
pub use prompt::{auxiliary_fields, creator_field};
pub use set::ExtractorSet;
