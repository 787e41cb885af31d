//! Core Batch Orchestrator implementation

use crate::config::GlimpseConfig;
use crate::error::OrchestratorError;
use crate::events::{BatchEvent, BatchReport, RunState};
use crate::metrics::BatchMetrics;
use crate::progress::ProgressThrottle;
use glimpse_classifier::Classifier;
use glimpse_domain::traits::{
    DestinationRouter, ItemCatalog, LlmProvider, MetadataLookup, OutcomeStore, TextRecognizer,
};
use glimpse_domain::{
    ClassificationResult, ContentType, ExtractedMetadata, ItemHandle, ItemId, LookupError,
    Outcome, OutcomeStatus, RecognitionError, TextObservation,
};
use glimpse_extractor::{ExtractionError, Extractor, ExtractorSet};
use std::collections::HashSet;
use std::fmt::Display;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Message for items no tier could categorize
const UNKNOWN_MESSAGE: &str = "Couldn't tell what this is";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn store_error<E: Display>(e: E) -> OrchestratorError {
    OrchestratorError::Store(e.to_string())
}

/// Map an extraction error to a flagged or failed outcome
fn extraction_outcome(
    item: &ItemHandle,
    content_type: ContentType,
    error: &ExtractionError,
) -> Outcome {
    if error.is_ambiguity() {
        debug!("Extraction ambiguous: {}", error);
        Outcome::flagged(
            item.id.clone(),
            content_type,
            error.user_message(),
            error.is_retryable(),
        )
    } else {
        warn!("Extraction failed: {}", error);
        Outcome::failed(
            item.id.clone(),
            content_type,
            error.user_message(),
            error.is_retryable(),
        )
    }
}

/// The external services a run talks to
#[derive(Clone)]
pub struct Collaborators {
    /// Turns an item's image into text fragments
    pub recognizer: Arc<dyn TextRecognizer>,
    /// Resolves extracted metadata to an external link
    pub lookup: Arc<dyn MetadataLookup>,
    /// Files successful items into their destination
    pub router: Arc<dyn DestinationRouter>,
}

/// Run state shared between the orchestrator and its handles
#[derive(Debug)]
struct RunControl {
    state: Mutex<RunState>,
    in_progress: AtomicBool,
    current: AtomicUsize,
    total: AtomicUsize,
    cancel: Mutex<Option<CancellationToken>>,
}

impl RunControl {
    fn new() -> Self {
        Self {
            state: Mutex::new(RunState::Idle),
            in_progress: AtomicBool::new(false),
            current: AtomicUsize::new(0),
            total: AtomicUsize::new(0),
            cancel: Mutex::new(None),
        }
    }

    fn state(&self) -> RunState {
        *lock(&self.state)
    }

    /// Move to `Running`, or refuse if a run is already active
    fn begin(self: &Arc<Self>) -> Result<RunGuard, OrchestratorError> {
        let previous = {
            let mut state = lock(&self.state);
            if *state == RunState::Running {
                return Err(OrchestratorError::AlreadyRunning);
            }
            std::mem::replace(&mut *state, RunState::Running)
        };

        self.current.store(0, Ordering::SeqCst);
        self.total.store(0, Ordering::SeqCst);
        let token = CancellationToken::new();
        *lock(&self.cancel) = Some(token.clone());

        Ok(RunGuard {
            control: Arc::clone(self),
            token,
            exit_state: previous,
        })
    }
}

/// Holds `Running` for the lifetime of one run
///
/// Dropping the guard clears the in-progress flag and the cancellation token
/// and leaves `exit_state` behind, on every exit path.
struct RunGuard {
    control: Arc<RunControl>,
    token: CancellationToken,
    exit_state: RunState,
}

impl RunGuard {
    /// The index has loaded; items are about to be processed
    fn started(&mut self, total: usize, raise_flag: bool) {
        // From here on, abandoning the run counts as cancelling it
        self.exit_state = RunState::Cancelled;
        self.control.total.store(total, Ordering::SeqCst);
        self.control.in_progress.store(raise_flag, Ordering::SeqCst);
    }

    fn advance(&self, current: usize) {
        self.control.current.store(current, Ordering::SeqCst);
    }

    fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    fn finish(mut self, state: RunState) {
        self.exit_state = state;
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.control.in_progress.store(false, Ordering::SeqCst);
        *lock(&self.control.cancel) = None;
        *lock(&self.control.state) = self.exit_state;
    }
}

/// Cloneable view of the orchestrator's run state
///
/// Safe to use from any thread, including from inside collaborators while a
/// run is executing.
#[derive(Debug, Clone)]
pub struct BatchHandle {
    control: Arc<RunControl>,
}

impl BatchHandle {
    /// Request cancellation of the current run
    ///
    /// The item being processed finishes; no further item starts. Returns
    /// `false` when no run is active.
    pub fn cancel(&self) -> bool {
        match lock(&self.control.cancel).as_ref() {
            Some(token) => {
                info!("Cancellation requested");
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Current run state
    pub fn state(&self) -> RunState {
        self.control.state()
    }

    /// Whether a foreground run (one that started with an empty cache) is
    /// in progress
    pub fn is_in_progress(&self) -> bool {
        self.control.in_progress.load(Ordering::SeqCst)
    }

    /// `(current, total)` for the current or last run
    pub fn progress(&self) -> (usize, usize) {
        (
            self.control.current.load(Ordering::SeqCst),
            self.control.total.load(Ordering::SeqCst),
        )
    }
}

/// Drives recognition, classification, extraction, lookup and routing over a
/// batch of items, persisting one outcome per item
///
/// # Examples
///
/// ```no_run
/// # use std::sync::Arc;
/// # use glimpse_domain::traits::LlmProvider;
/// # use glimpse_domain::ItemHandle;
/// # use glimpse_orchestrator::{BatchOrchestrator, Collaborators, GlimpseConfig};
/// # use glimpse_store::MemoryStore;
/// # async fn demo<L: LlmProvider + 'static>(llm: Arc<L>, collaborators: Collaborators) {
/// let orchestrator =
///     BatchOrchestrator::new(llm, collaborators, MemoryStore::new(), GlimpseConfig::default());
///
/// let report = orchestrator
///     .run_batch(vec![ItemHandle::new("IMG_0001", "file:///shots/IMG_0001.png")])
///     .await
///     .unwrap();
/// println!("{} item(s) processed", report.outcomes.len());
/// # }
/// ```
pub struct BatchOrchestrator<L, S>
where
    L: LlmProvider + 'static,
    S: OutcomeStore,
{
    classifier: Classifier<L>,
    extractors: ExtractorSet<L>,
    collaborators: Collaborators,
    store: Mutex<S>,
    config: GlimpseConfig,
    control: Arc<RunControl>,
    metrics: Mutex<BatchMetrics>,
    events: Option<UnboundedSender<BatchEvent>>,
}

impl<L, S> BatchOrchestrator<L, S>
where
    L: LlmProvider + 'static,
    S: OutcomeStore + Send,
    S::Error: Display,
{
    /// Create a new orchestrator over an injected store
    pub fn new(
        llm_provider: Arc<L>,
        collaborators: Collaborators,
        store: S,
        config: GlimpseConfig,
    ) -> Self {
        let classifier = Classifier::new(Arc::clone(&llm_provider), config.classifier.clone());
        let extractors = ExtractorSet::new(
            llm_provider,
            config.extractor.music.clone(),
            config.extractor.movie.clone(),
            config.extractor.book.clone(),
        )
        .with_gate_config(config.classifier.clone());

        Self {
            classifier,
            extractors,
            collaborators,
            store: Mutex::new(store),
            config,
            control: Arc::new(RunControl::new()),
            metrics: Mutex::new(BatchMetrics::new()),
            events: None,
        }
    }

    /// Publish run events on `sender`
    ///
    /// The channel is unbounded and carries one `ItemFinished` per processed
    /// item on top of the throttled progress events, so a large batch queues
    /// that many outcomes until the receiver drains them. Keep a task reading
    /// the receiver for the orchestrator's lifetime. Once the receiver is
    /// dropped, events are discarded and runs carry on unaffected.
    pub fn with_events(mut self, sender: UnboundedSender<BatchEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    /// A handle for cancelling and observing runs
    pub fn handle(&self) -> BatchHandle {
        BatchHandle {
            control: Arc::clone(&self.control),
        }
    }

    /// Active configuration
    pub fn config(&self) -> &GlimpseConfig {
        &self.config
    }

    /// Snapshot of the collected metrics
    pub fn metrics(&self) -> BatchMetrics {
        lock(&self.metrics).clone()
    }

    /// Reset metrics counters
    pub fn reset_metrics(&self) {
        lock(&self.metrics).reset();
    }

    /// Every cached outcome, in first-recorded order
    pub fn outcomes(&self) -> Result<Vec<Outcome>, OrchestratorError> {
        lock(&self.store).outcomes().map_err(store_error)
    }

    /// Every processed item id
    pub fn processed_ids(&self) -> Result<HashSet<ItemId>, OrchestratorError> {
        lock(&self.store).processed_ids().map_err(store_error)
    }

    /// Replace an item's outcome with a human correction
    ///
    /// The id is added to the processed index if it was missing.
    pub fn apply_correction(&self, outcome: Outcome) -> Result<(), OrchestratorError> {
        let mut store = lock(&self.store);
        store.record(&outcome).map_err(store_error)?;
        info!(item = %outcome.item_id, status = outcome.status.as_str(), "Applied correction");
        Ok(())
    }

    /// Drop index and cache entries for items that no longer exist upstream
    ///
    /// Returns the number of ids removed. Rejected while a run is active.
    pub fn reconcile(&self, catalog: &dyn ItemCatalog) -> Result<usize, OrchestratorError> {
        self.ensure_not_running()?;
        let present: HashSet<ItemId> = catalog.item_ids()?.into_iter().collect();
        // Listing the catalog can be slow; a run may have started meanwhile
        self.ensure_not_running()?;

        let stale = {
            let mut store = lock(&self.store);
            let mut known = store.processed_ids().map_err(store_error)?;
            known.extend(
                store
                    .outcomes()
                    .map_err(store_error)?
                    .into_iter()
                    .map(|outcome| outcome.item_id),
            );

            let mut stale: Vec<ItemId> =
                known.into_iter().filter(|id| !present.contains(id)).collect();
            stale.sort();
            if !stale.is_empty() {
                let from_index = store.remove_items(&stale).map_err(store_error)?;
                debug!("Removed {} index entries", from_index);
            }
            stale
        };

        lock(&self.metrics).record_reconciled(stale.len());
        info!("Reconciled against catalog: {} item(s) removed", stale.len());
        Ok(stale.len())
    }

    /// Process every candidate not yet in the processed index
    ///
    /// Per-item failures become outcomes; only `AlreadyRunning` and failure to
    /// load the index are returned as errors.
    pub async fn run_batch(
        &self,
        candidates: Vec<ItemHandle>,
    ) -> Result<BatchReport, OrchestratorError> {
        let guard = self.control.begin()?;
        let run_id = Uuid::now_v7();
        let span = info_span!("batch_run", %run_id);
        self.execute(guard, run_id, candidates).instrument(span).await
    }

    async fn execute(
        &self,
        mut guard: RunGuard,
        run_id: Uuid,
        candidates: Vec<ItemHandle>,
    ) -> Result<BatchReport, OrchestratorError> {
        let start = Instant::now();

        let (processed, cached) = {
            let store = lock(&self.store);
            (
                store.processed_ids().map_err(store_error)?,
                store.outcome_count().map_err(store_error)?,
            )
        };

        let mut seen = HashSet::new();
        let total_candidates = candidates.len();
        let pending: Vec<ItemHandle> = candidates
            .into_iter()
            .filter(|item| seen.insert(item.id.clone()))
            .filter(|item| !processed.contains(&item.id))
            .collect();
        let skipped = total_candidates - pending.len();
        let total = pending.len();
        let background = cached > 0;

        guard.started(total, !background);
        info!(
            "Starting run: {} pending, {} skipped{}",
            total,
            skipped,
            if background { " (background)" } else { "" }
        );
        self.emit(BatchEvent::Started {
            run_id,
            total,
            skipped,
            background,
        });

        let mut throttle = ProgressThrottle::new(self.config.orchestrator.progress_interval());
        let mut outcomes = Vec::with_capacity(total);
        for item in &pending {
            if guard.is_cancelled() {
                info!("Run cancelled after {} of {} item(s)", outcomes.len(), total);
                break;
            }

            let outcome = self
                .process_item(item)
                .instrument(info_span!("item", id = %item.id))
                .await;
            self.persist(&outcome);
            lock(&self.metrics).record_outcome(&outcome);

            outcomes.push(outcome.clone());
            guard.advance(outcomes.len());
            self.emit(BatchEvent::ItemFinished(outcome));
            if throttle.ready(outcomes.len(), total) {
                self.emit(BatchEvent::Progress {
                    current: outcomes.len(),
                    total,
                });
            }
        }

        let state = if outcomes.len() < total {
            RunState::Cancelled
        } else {
            RunState::Completed
        };
        guard.finish(state);

        lock(&self.metrics).record_run(state == RunState::Cancelled, skipped, start.elapsed());
        info!("Run {}: {} item(s) processed", state, outcomes.len());
        self.emit(BatchEvent::Finished {
            state,
            processed: outcomes.len(),
        });

        Ok(BatchReport {
            run_id,
            state,
            outcomes,
            skipped,
            background,
        })
    }

    async fn process_item(&self, item: &ItemHandle) -> Outcome {
        let observations = match self.recognize(item).await {
            Ok(observations) => observations,
            Err(e) => {
                warn!("Recognition failed: {}", e);
                let message = match e {
                    RecognitionError::NoTextFound => e.to_string(),
                    RecognitionError::RecognitionFailed(_) => {
                        "Couldn't read the text in this image".to_string()
                    }
                };
                return Outcome::failed(
                    item.id.clone(),
                    ContentType::Unknown,
                    message,
                    e.is_retryable(),
                );
            }
        };

        let classification = self.classifier.classify_with_fallback(&observations).await;
        if classification.used_fallback() {
            lock(&self.metrics).record_keyword_fallback();
        }
        let content_type = classification.result.content_type;
        debug!("Classified as {}", content_type);

        let result = &classification.result;
        let outcome = if content_type == ContentType::Meme {
            Outcome::success(item.id.clone(), content_type, None, None)
        } else if let Some(extractor) = self.extractors.for_type(content_type) {
            self.extract_and_lookup(item, &observations, extractor, result)
                .await
                .unwrap_or_else(|e| extraction_outcome(item, content_type, &e))
        } else if self.classifier.has_spatial_music_pattern(&observations) {
            debug!("Unknown verdict with a music layout; trying the music extractor");
            self.extract_and_lookup(item, &observations, self.extractors.music(), result)
                .await
                .unwrap_or_else(|e| extraction_outcome(item, ContentType::Unknown, &e))
        } else {
            Outcome::flagged(item.id.clone(), ContentType::Unknown, UNKNOWN_MESSAGE, false)
        };

        self.route(item, outcome).await
    }

    async fn recognize(&self, item: &ItemHandle) -> Result<Vec<TextObservation>, RecognitionError> {
        let recognizer = Arc::clone(&self.collaborators.recognizer);
        let handle = item.clone();

        // Recognition is blocking work
        let observations = tokio::task::spawn_blocking(move || recognizer.recognize(&handle))
            .await
            .map_err(|e| RecognitionError::RecognitionFailed(e.to_string()))??;

        if observations.is_empty() {
            return Err(RecognitionError::NoTextFound);
        }
        Ok(observations)
    }

    /// Extract metadata and look it up; lookup failures are already outcomes
    async fn extract_and_lookup(
        &self,
        item: &ItemHandle,
        observations: &[TextObservation],
        extractor: &Extractor<L>,
        classification: &ClassificationResult,
    ) -> Result<Outcome, ExtractionError> {
        let content_type = extractor.content_type();
        let extraction = extractor
            .extract_detailed(observations, content_type, classification)
            .await?;
        debug!("Extracted via {:?}", extraction.source);

        Ok(self.lookup(item, content_type, extraction.metadata).await)
    }

    async fn lookup(
        &self,
        item: &ItemHandle,
        content_type: ContentType,
        metadata: ExtractedMetadata,
    ) -> Outcome {
        let result = timeout(
            self.config.orchestrator.lookup_timeout(),
            self.collaborators.lookup.lookup(content_type, &metadata),
        )
        .await
        .unwrap_or(Err(LookupError::Timeout));

        match result {
            Ok(link) => Outcome::success(item.id.clone(), content_type, Some(metadata), Some(link)),
            Err(e) => {
                warn!("Lookup failed: {}", e);
                let message = format!(
                    "Found \"{}\" by {}, but couldn't look it up",
                    metadata.title, metadata.creator
                );
                Outcome::flagged(item.id.clone(), content_type, message, e.is_retryable())
                    .with_metadata(metadata)
            }
        }
    }

    /// Route a successful outcome; everything else stays where it was found
    async fn route(&self, item: &ItemHandle, outcome: Outcome) -> Outcome {
        if !outcome.is_routable() {
            return outcome;
        }

        let destination = outcome.content_type.destination();
        let result = timeout(
            self.config.orchestrator.route_timeout(),
            self.collaborators.router.route(item, destination),
        )
        .await
        .unwrap_or(Err(LookupError::Timeout));

        match result {
            Ok(()) => {
                debug!("Routed to {}", destination);
                outcome
            }
            Err(e) => {
                warn!("Routing to {} failed: {}", destination, e);
                Outcome {
                    status: OutcomeStatus::Flagged,
                    message: format!("Couldn't move this item to {}", destination),
                    retryable: e.is_retryable(),
                    ..outcome
                }
            }
        }
    }

    /// Record the item in the index and cache; failures never stop the run
    fn persist(&self, outcome: &Outcome) {
        let result = {
            let mut store = lock(&self.store);
            store.record(outcome)
        };
        if let Err(e) = result {
            warn!(item = %outcome.item_id, "Failed to persist outcome: {}", e);
            lock(&self.metrics).record_store_failure();
        }
    }

    fn ensure_not_running(&self) -> Result<(), OrchestratorError> {
        if self.control.state() == RunState::Running {
            return Err(OrchestratorError::AlreadyRunning);
        }
        Ok(())
    }

    fn emit(&self, event: BatchEvent) {
        if let Some(sender) = &self.events {
            // A dropped receiver just means nobody is listening
            let _ = sender.send(event);
        }
    }
}
