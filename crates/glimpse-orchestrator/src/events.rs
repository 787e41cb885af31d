//! Run state and events published during a batch run

use glimpse_domain::Outcome;
use std::fmt;
use uuid::Uuid;

/// Lifecycle of the orchestrator's current (or last) run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunState {
    /// No run has started yet
    Idle,
    /// A run is in progress
    Running,
    /// The last run processed every pending item
    Completed,
    /// The last run stopped early on request
    Cancelled,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunState::Idle => "idle",
            RunState::Running => "running",
            RunState::Completed => "completed",
            RunState::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Event published on the orchestrator's channel
#[derive(Debug, Clone, PartialEq)]
pub enum BatchEvent {
    /// A run started
    Started {
        /// Run identifier
        run_id: Uuid,
        /// Items this run will process
        total: usize,
        /// Candidates skipped because they were already processed
        skipped: usize,
        /// Whether this is a background refresh (no loading state shown)
        background: bool,
    },
    /// Throttled progress update
    Progress {
        /// Items finished so far
        current: usize,
        /// Items this run will process
        total: usize,
    },
    /// One item finished
    ItemFinished(Outcome),
    /// The run ended
    Finished {
        /// Final state, `Completed` or `Cancelled`
        state: RunState,
        /// Items processed by this run
        processed: usize,
    },
}

/// What a finished run did
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    /// Run identifier
    pub run_id: Uuid,
    /// `Completed` or `Cancelled`
    pub state: RunState,
    /// Outcomes produced by this run, in processing order
    pub outcomes: Vec<Outcome>,
    /// Candidates skipped because they were already processed
    pub skipped: usize,
    /// Whether the run was a background refresh
    pub background: bool,
}
