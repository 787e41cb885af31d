//! Glimpse Batch Orchestrator
//!
//! Runs the screenshot pipeline over a batch of items and keeps the
//! processed index and result cache in step with what exists upstream.
//!
//! # Overview
//!
//! For every candidate not yet processed, the orchestrator:
//! - **Recognizes** the image's text on a blocking worker
//! - **Classifies** it (semantic model, keyword fallback)
//! - **Extracts** title and creator for music, movies and books
//! - **Looks up** the metadata and **routes** successful items to their
//!   destination
//! - **Persists** one outcome per item, whatever happened to it
//!
//! # Run lifecycle
//!
//! | State | Entered when |
//! |-------|--------------|
//! | **Idle** | No run has started |
//! | **Running** | `run_batch` accepted a batch |
//! | **Completed** | Every pending item was processed |
//! | **Cancelled** | `BatchHandle::cancel` stopped the run between items |
//!
//! Only one run is active at a time. Items flagged or failed are never
//! routed; they stay where they were found for a human to review.
//!
//! # Usage
//!
//! ```no_run
//! use glimpse_domain::ItemHandle;
//! use glimpse_llm::OllamaProvider;
//! use glimpse_orchestrator::{BatchOrchestrator, Collaborators, GlimpseConfig};
//! use glimpse_store::SqliteStore;
//! use std::sync::Arc;
//!
//! # async fn example(collaborators: Collaborators) -> Result<(), Box<dyn std::error::Error>> {
//! glimpse_orchestrator::init_tracing("glimpse=info");
//!
//! let config = GlimpseConfig::from_path("glimpse.toml")?;
//! let llm = Arc::new(OllamaProvider::default_endpoint("llama3.2")?);
//! let store = SqliteStore::new("glimpse.db")?;
//! let orchestrator = BatchOrchestrator::new(llm, collaborators, store, config);
//!
//! let items = vec![ItemHandle::new("IMG_0001", "file:///shots/IMG_0001.png")];
//! let report = orchestrator.run_batch(items).await?;
//! println!("{}: {} outcome(s)", report.state, report.outcomes.len());
//! println!("{}", orchestrator.metrics().summary());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod events;
mod metrics;
mod orchestrator;
mod progress;
pub mod telemetry;
mod worker;

pub use config::{
    ExtractorConfigs, GlimpseConfig, OrchestratorConfig, MAX_RECONCILE_INTERVAL_MINUTES,
};
pub use error::{ConfigError, OrchestratorError};
pub use events::{BatchEvent, BatchReport, RunState};
pub use metrics::BatchMetrics;
pub use orchestrator::{BatchHandle, BatchOrchestrator, Collaborators};
pub use progress::ProgressThrottle;
pub use telemetry::init_tracing;
pub use worker::{ReconcileStats, ReconcileWorker};
