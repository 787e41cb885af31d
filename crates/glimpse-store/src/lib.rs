//! Glimpse Storage Layer
//!
//! Implements the `OutcomeStore` trait: the processed-item index and the
//! per-item result cache.
//!
//! # Architecture
//!
//! - `SqliteStore`: durable store, one file (or `:memory:`)
//! - `MemoryStore`: volatile store for tests
//!
//! Both keep outcomes in first-recorded order; replacing an outcome keeps
//! its position.
//!
//! # Examples
//!
//! ```
//! use glimpse_domain::traits::OutcomeStore;
//! use glimpse_domain::ItemId;
//! use glimpse_store::SqliteStore;
//!
//! let mut store = SqliteStore::new(":memory:").unwrap();
//! store.mark_processed(&ItemId::new("IMG_0001")).unwrap();
//! assert!(store.processed_ids().unwrap().contains(&ItemId::new("IMG_0001")));
//! ```

#![warn(missing_docs)]

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Metadata column could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),
}
