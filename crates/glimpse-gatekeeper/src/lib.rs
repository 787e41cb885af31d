//! Glimpse Gatekeeper
//!
//! Validates extracted metadata before it leaves an extractor.
//!
//! The Gatekeeper rejects:
//! - Titles or creators shorter than the configured minimum
//! - Fields containing a denylisted placeholder pattern ("song title",
//!   "n/a", "lorem ipsum", ...), regardless of the reported confidence
//! - Confidence scores outside `[0, 1]`
//!
//! # Examples
//!
//! ```
//! use glimpse_domain::ExtractedMetadata;
//! use glimpse_gatekeeper::{Gatekeeper, ValidationConfig};
//!
//! let gatekeeper = Gatekeeper::new(ValidationConfig::default());
//! let metadata = ExtractedMetadata::new("Song Title", "Queen", 0.95, vec![]);
//!
//! let result = gatekeeper.validate(&metadata);
//! assert!(!result.is_accepted());
//! assert_eq!(
//!     result.first_reason().unwrap().to_string(),
//!     "title contains placeholder pattern 'song title'"
//! );
//! ```

#![warn(missing_docs)]

mod config;
mod validator;

pub use config::{ValidationConfig, DEFAULT_PLACEHOLDERS};
pub use validator::{Field, Gatekeeper, RejectionReason, ValidationResult, ValidationStatus};
