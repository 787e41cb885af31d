//! Background worker that reconciles the processed index on a schedule

use crate::error::OrchestratorError;
use crate::orchestrator::BatchOrchestrator;
use glimpse_domain::traits::{ItemCatalog, LlmProvider, OutcomeStore};
use std::fmt::Display;
use std::sync::Arc;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Totals from a bounded worker run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    /// Cycles that reconciled
    pub cycles: usize,
    /// Cycles skipped because a batch run was active
    pub skipped: usize,
    /// Ids removed across all cycles
    pub removed: usize,
}

/// Periodically drops index and cache entries for items deleted upstream
///
/// # Examples
///
/// ```no_run
/// # use std::sync::Arc;
/// # use glimpse_domain::traits::{ItemCatalog, LlmProvider};
/// # use glimpse_orchestrator::{BatchOrchestrator, ReconcileWorker};
/// # use glimpse_store::MemoryStore;
/// # use tokio_util::sync::CancellationToken;
/// # async fn demo<L: LlmProvider + 'static>(
/// #     orchestrator: Arc<BatchOrchestrator<L, MemoryStore>>,
/// #     catalog: Arc<dyn ItemCatalog>,
/// # ) {
/// let worker = ReconcileWorker::new(orchestrator, catalog);
/// let shutdown = CancellationToken::new();
///
/// // Runs until `shutdown.cancel()` is called
/// worker.run(shutdown.clone()).await;
/// # }
/// ```
pub struct ReconcileWorker<L, S>
where
    L: LlmProvider + 'static,
    S: OutcomeStore,
{
    orchestrator: Arc<BatchOrchestrator<L, S>>,
    catalog: Arc<dyn ItemCatalog>,
    interval: Duration,
}

impl<L, S> ReconcileWorker<L, S>
where
    L: LlmProvider + 'static,
    S: OutcomeStore + Send + 'static,
    S::Error: Display,
{
    /// Create a worker using the orchestrator's configured interval
    pub fn new(orchestrator: Arc<BatchOrchestrator<L, S>>, catalog: Arc<dyn ItemCatalog>) -> Self {
        let interval = orchestrator.config().orchestrator.reconcile_interval();
        Self {
            orchestrator,
            catalog,
            interval,
        }
    }

    /// Override the interval between cycles
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Interval between cycles
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run until `shutdown` is cancelled
    ///
    /// The first cycle runs immediately. Failed cycles are logged and retried
    /// on the next tick.
    pub async fn run(&self, shutdown: CancellationToken) {
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!("Reconcile worker started (interval: {:?})", self.interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.reconcile_once().await {
                        Ok(removed) => tracing::debug!("Reconcile cycle removed {} item(s)", removed),
                        Err(OrchestratorError::AlreadyRunning) => {
                            tracing::debug!("Batch run active, skipping reconcile cycle");
                        }
                        Err(e) => tracing::error!("Reconcile failed: {}", e),
                    }
                }
                _ = shutdown.cancelled() => {
                    tracing::info!("Shutdown requested, stopping reconcile worker");
                    break;
                }
            }
        }
    }

    /// Run a fixed number of cycles
    ///
    /// Cycles that overlap a batch run are counted as skipped; any other
    /// failure ends the run.
    pub async fn run_cycles(&self, cycles: usize) -> Result<ReconcileStats, OrchestratorError> {
        let mut ticker = interval(self.interval);
        let mut stats = ReconcileStats::default();

        for cycle in 0..cycles {
            ticker.tick().await;

            match self.reconcile_once().await {
                Ok(removed) => {
                    tracing::debug!("Reconcile {}/{} removed {} item(s)", cycle + 1, cycles, removed);
                    stats.cycles += 1;
                    stats.removed += removed;
                }
                Err(OrchestratorError::AlreadyRunning) => stats.skipped += 1,
                Err(e) => {
                    tracing::error!("Reconcile {}/{} failed: {}", cycle + 1, cycles, e);
                    return Err(e);
                }
            }
        }

        tracing::info!(
            "Reconcile worker finished {} cycle(s): {} removed",
            cycles,
            stats.removed
        );
        Ok(stats)
    }

    /// Reconcile on the blocking pool; catalog listing and store I/O are
    /// synchronous and must not stall the runtime
    async fn reconcile_once(&self) -> Result<usize, OrchestratorError> {
        let orchestrator = Arc::clone(&self.orchestrator);
        let catalog = Arc::clone(&self.catalog);
        tokio::task::spawn_blocking(move || orchestrator.reconcile(catalog.as_ref()))
            .await
            .map_err(|e| OrchestratorError::Worker(e.to_string()))?
    }
}
