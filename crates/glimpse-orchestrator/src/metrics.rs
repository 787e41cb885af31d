//! Metrics collection for batch runs

use glimpse_domain::{ContentType, Outcome, OutcomeStatus};
use std::collections::HashMap;
use std::time::Duration;

/// Metrics collected across batch runs
#[derive(Debug, Clone, Default)]
pub struct BatchMetrics {
    /// Outcomes per status
    pub by_status: HashMap<OutcomeStatus, usize>,

    /// Outcomes per content type
    pub by_type: HashMap<ContentType, usize>,

    /// Runs started
    pub runs: usize,

    /// Runs that ended early on request
    pub cancelled_runs: usize,

    /// Candidates skipped as already processed
    pub skipped: usize,

    /// Items whose verdict came from keyword scoring
    pub keyword_fallbacks: usize,

    /// Failed writes to the processed index or result cache
    pub store_failures: usize,

    /// Items removed by reconciliation
    pub reconciled: usize,

    /// Total run time in milliseconds
    pub total_runtime_ms: u64,
}

impl BatchMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one finished item
    pub fn record_outcome(&mut self, outcome: &Outcome) {
        *self.by_status.entry(outcome.status).or_insert(0) += 1;
        *self.by_type.entry(outcome.content_type).or_insert(0) += 1;
    }

    /// Record a finished run
    pub fn record_run(&mut self, cancelled: bool, skipped: usize, elapsed: Duration) {
        self.runs += 1;
        if cancelled {
            self.cancelled_runs += 1;
        }
        self.skipped += skipped;
        self.total_runtime_ms += elapsed.as_millis() as u64;
    }

    /// Record a keyword-tier classification
    pub fn record_keyword_fallback(&mut self) {
        self.keyword_fallbacks += 1;
    }

    /// Record a failed store write
    pub fn record_store_failure(&mut self) {
        self.store_failures += 1;
    }

    /// Record ids removed by reconciliation
    pub fn record_reconciled(&mut self, removed: usize) {
        self.reconciled += removed;
    }

    /// Outcomes with the given status
    pub fn count(&self, status: OutcomeStatus) -> usize {
        self.by_status.get(&status).copied().unwrap_or(0)
    }

    /// Get total items processed
    pub fn total_processed(&self) -> usize {
        self.by_status.values().sum()
    }

    /// Reset all metrics
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Batch Metrics Summary".to_string(),
            "=====================".to_string(),
            format!("Runs: {} ({} cancelled)", self.runs, self.cancelled_runs),
            format!("Total runtime: {}ms", self.total_runtime_ms),
            format!("Processed: {}", self.total_processed()),
            format!("Skipped: {}", self.skipped),
            format!("Keyword fallbacks: {}", self.keyword_fallbacks),
            format!("Store failures: {}", self.store_failures),
            format!("Reconciled: {}", self.reconciled),
            String::new(),
        ];

        if !self.by_status.is_empty() {
            lines.push("By status:".to_string());
            for status in [OutcomeStatus::Success, OutcomeStatus::Flagged, OutcomeStatus::Failed] {
                lines.push(format!("  {}: {}", status.as_str(), self.count(status)));
            }
            lines.push(String::new());
        }

        if !self.by_type.is_empty() {
            let mut types: Vec<_> = self.by_type.iter().collect();
            types.sort();
            lines.push("By content type:".to_string());
            for (content_type, count) in types {
                lines.push(format!("  {}: {}", content_type, count));
            }
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_summary() {
        let mut metrics = BatchMetrics::new();
        metrics.record_outcome(&Outcome::success("a".into(), ContentType::Meme, None, None));
        metrics.record_outcome(&Outcome::flagged("b".into(), ContentType::Unknown, "?", false));
        metrics.record_outcome(&Outcome::flagged("c".into(), ContentType::Music, "?", true));
        metrics.record_run(false, 4, Duration::from_millis(120));

        assert_eq!(metrics.count(OutcomeStatus::Flagged), 2);
        assert_eq!(metrics.total_processed(), 3);

        let summary = metrics.summary();
        assert!(summary.contains("Runs: 1 (0 cancelled)"));
        assert!(summary.contains("flagged: 2"));
        assert!(summary.contains("Skipped: 4"));
        assert!(summary.contains("meme: 1"));
    }

    #[test]
    fn test_reset() {
        let mut metrics = BatchMetrics::new();
        metrics.record_store_failure();
        metrics.record_run(true, 0, Duration::from_secs(1));
        metrics.reset();
        assert_eq!(metrics.runs, 0);
        assert_eq!(metrics.store_failures, 0);
    }
}
