//! Error types for the Batch Orchestrator

use glimpse_domain::CatalogError;
use thiserror::Error;

/// Errors that can leave the orchestrator
///
/// Per-item failures never appear here; they become outcomes.
#[derive(Error, Debug)]
pub enum OrchestratorError {
    /// A batch run is already in progress
    #[error("A batch run is already in progress")]
    AlreadyRunning,

    /// The processed index or result cache could not be read or written
    #[error("Store error: {0}")]
    Store(String),

    /// The upstream item catalog could not be listed
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// A blocking reconcile task panicked or was cancelled
    #[error("Worker task failed: {0}")]
    Worker(String),
}

/// Errors while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid TOML for the config schema
    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized
    #[error("Failed to serialize TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A section failed validation
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
