//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the pipeline and infrastructure.
//! Implementations live in other crates (`glimpse-llm`, `glimpse-store`) or in
//! the embedding application.

use crate::{
    CatalogError, ContentType, ExtractedMetadata, ItemHandle, ItemId, LlmError, LookupError,
    Outcome, RecognitionError, TextObservation,
};
use async_trait::async_trait;
use std::collections::HashSet;

/// Turns an image into text fragments
///
/// Recognition is CPU/accelerator bound, so the trait is synchronous and
/// callers run it on a blocking worker.
pub trait TextRecognizer: Send + Sync {
    /// Recognize all text fragments in the item's image
    fn recognize(&self, item: &ItemHandle) -> Result<Vec<TextObservation>, RecognitionError>;
}

/// Trait for language model operations
///
/// Used for both semantic classification and semantic extraction.
/// Implemented by the infrastructure layer (glimpse-llm).
pub trait LlmProvider: Send + Sync {
    /// Generate text completion
    fn generate(&self, prompt: &str) -> Result<String, LlmError>;

    /// Generate with structured output (if supported)
    fn generate_structured(&self, prompt: &str, schema: &str) -> Result<String, LlmError>;
}

/// Looks up extracted metadata in an external catalogue (music service, film
/// database, book search) and returns a link to the match
#[async_trait]
pub trait MetadataLookup: Send + Sync {
    /// Find the external link for the metadata
    async fn lookup(
        &self,
        content_type: ContentType,
        metadata: &ExtractedMetadata,
    ) -> Result<String, LookupError>;
}

/// Files a successfully processed item into its destination (album, folder)
#[async_trait]
pub trait DestinationRouter: Send + Sync {
    /// Move or link the item to the destination
    async fn route(&self, item: &ItemHandle, destination: &str) -> Result<(), LookupError>;
}

/// Lists the items that currently exist upstream
pub trait ItemCatalog: Send + Sync {
    /// Identifiers of every item still present
    fn item_ids(&self) -> Result<Vec<ItemId>, CatalogError>;
}

/// Trait for the processed index and result cache
///
/// Implemented by the infrastructure layer (glimpse-store). Only the batch
/// orchestrator writes through this trait.
pub trait OutcomeStore {
    /// Error type for store operations
    type Error;

    /// Load every processed item id
    fn processed_ids(&self) -> Result<HashSet<ItemId>, Self::Error>;

    /// Load every cached outcome in the order it was first recorded
    fn outcomes(&self) -> Result<Vec<Outcome>, Self::Error>;

    /// Number of cached outcomes
    fn outcome_count(&self) -> Result<usize, Self::Error>;

    /// Get the cached outcome for one item
    fn get_outcome(&self, id: &ItemId) -> Result<Option<Outcome>, Self::Error>;

    /// Add an id to the processed index (no-op if present)
    fn mark_processed(&mut self, id: &ItemId) -> Result<(), Self::Error>;

    /// Insert or replace the cached outcome for `outcome.item_id`
    ///
    /// A replaced outcome keeps its original position in load order.
    fn upsert_outcome(&mut self, outcome: &Outcome) -> Result<(), Self::Error>;

    /// Cache the outcome and add its id to the processed index as one unit
    ///
    /// An id must never be indexed without its outcome, or the item would be
    /// skipped forever with nothing to show for it. The default writes the
    /// outcome first so a failed write leaves the item pending. Stores that
    /// can write both in one transaction should override this.
    fn record(&mut self, outcome: &Outcome) -> Result<(), Self::Error> {
        self.upsert_outcome(outcome)?;
        self.mark_processed(&outcome.item_id)
    }

    /// Remove ids from both the index and the cache, returning how many index
    /// entries were removed
    fn remove_items(&mut self, ids: &[ItemId]) -> Result<usize, Self::Error>;
}
