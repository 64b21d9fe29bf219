//! Per-run summary.

use metrics::counter;
use serde::Serialize;
use tracing::info;
use tsync_models::{Extraction, FailureKind};

use crate::queue::QueueCounts;

/// Rows processed, by outcome.
pub const ROWS_TOTAL: &str = "transcript_rows_total";

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    #[serde(flatten)]
    pub counts: QueueCounts,
    pub selected: usize,
    pub succeeded: usize,
    pub failed_transient: usize,
    pub failed_permanent: usize,
    pub internal_errors: usize,
    pub write_failures: usize,
    pub dry_run: bool,
}

impl RunSummary {
    pub fn new(counts: QueueCounts, selected: usize, dry_run: bool) -> Self {
        Self {
            counts,
            selected,
            dry_run,
            ..Default::default()
        }
    }

    /// Count one extraction outcome.
    pub fn record(&mut self, outcome: &Extraction) {
        let label = match outcome {
            Extraction::Success { .. } => {
                self.succeeded += 1;
                "success"
            }
            Extraction::Failed { kind, .. } => {
                match kind {
                    FailureKind::Permanent => self.failed_permanent += 1,
                    FailureKind::Transient => self.failed_transient += 1,
                    FailureKind::Internal => self.internal_errors += 1,
                }
                kind.as_str()
            }
        };

        counter!(ROWS_TOTAL, "outcome" => label).increment(1);
    }

    pub fn record_write_failure(&mut self) {
        self.write_failures += 1;
        counter!(ROWS_TOTAL, "outcome" => "write_failed").increment(1);
    }

    /// Rows that went through the extractor.
    pub fn processed(&self) -> usize {
        self.succeeded + self.failed_transient + self.failed_permanent + self.internal_errors
    }

    /// Emit the summary as one structured log line.
    pub fn log(&self) {
        let c = &self.counts;
        info!(
            total_rows = c.total_rows,
            pending = c.pending,
            retryable = c.retryable,
            ready = c.ready,
            permanently_failed = c.permanently_failed,
            exhausted = c.exhausted,
            unrecognized = c.unrecognized,
            missing_item_id = c.missing_item_id,
            selected = self.selected,
            succeeded = self.succeeded,
            failed_transient = self.failed_transient,
            failed_permanent = self.failed_permanent,
            internal_errors = self.internal_errors,
            write_failures = self.write_failures,
            dry_run = self.dry_run,
            "Run complete: {} of {} selected rows processed",
            self.processed(),
            self.selected
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_outcomes() {
        let mut summary = RunSummary::new(QueueCounts::default(), 4, false);
        summary.record(&Extraction::success("text", "en"));
        summary.record(&Extraction::transient("no data"));
        summary.record(&Extraction::permanent("private"));
        summary.record(&Extraction::internal("timeout"));
        summary.record_write_failure();

        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed_transient, 1);
        assert_eq!(summary.failed_permanent, 1);
        assert_eq!(summary.internal_errors, 1);
        assert_eq!(summary.write_failures, 1);
        assert_eq!(summary.processed(), 4);
    }

    #[test]
    fn test_serializes_flat() {
        let counts = QueueCounts {
            total_rows: 3,
            pending: 1,
            ..Default::default()
        };
        let value = serde_json::to_value(RunSummary::new(counts, 1, true)).unwrap();
        assert_eq!(value["total_rows"], 3);
        assert_eq!(value["pending"], 1);
        assert_eq!(value["selected"], 1);
        assert_eq!(value["dry_run"], true);
    }
}
