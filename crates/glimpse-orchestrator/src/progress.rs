//! Progress throttling

use std::time::{Duration, Instant};

/// Limits how often progress is published
///
/// The first and the final update always pass.
#[derive(Debug)]
pub struct ProgressThrottle {
    interval: Duration,
    last_emit: Option<Instant>,
}

impl ProgressThrottle {
    /// Allow at most one update per `interval`
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_emit: None,
        }
    }

    /// Whether an update for `(current, total)` at `now` should be published
    pub fn ready_at(&mut self, current: usize, total: usize, now: Instant) -> bool {
        let due = match self.last_emit {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.interval,
        };
        if due || current >= total {
            self.last_emit = Some(now);
            return true;
        }
        false
    }

    /// [`ProgressThrottle::ready_at`] with the current time
    pub fn ready(&mut self, current: usize, total: usize) -> bool {
        self.ready_at(current, total, Instant::now())
    }
}
