//! Queue row state machine.
//!
//! Selection partitions rows into a pending list and a retry list, both in
//! table order, and fills the run budget from the pending list first.
//! Transitions map an extraction outcome onto the row's next status and
//! payload. Nothing here does I/O.

use serde::Serialize;
use tsync_models::{truncate_chars, Extraction, FailureKind, QueueRow, RowStatus, RowUpdate};

/// How a row is treated by selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowClass {
    /// Never attempted; highest priority.
    Pending,
    /// Failed transiently and still under the retry ceiling.
    Retry,
    /// Terminal success.
    Ready,
    /// Terminal failure.
    PermanentlyFailed,
    /// Failed row whose counter is already past the ceiling.
    Exhausted,
    /// Status this stage does not own; never touched.
    Unrecognized,
    /// Actionable status but no item id to extract.
    MissingItemId,
}

/// Retry ceiling and payload bound applied to transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueuePolicy {
    /// Maximum rows processed per run
    pub budget: usize,
    /// Transient failures tolerated after the first one
    pub max_retries: u32,
    /// Payload cell limit in characters
    pub max_payload_chars: usize,
}

impl QueuePolicy {
    pub fn classify(&self, row: &QueueRow) -> RowClass {
        let class = match &row.status {
            RowStatus::Pending => RowClass::Pending,
            RowStatus::Failed { attempts } if *attempts <= self.max_retries => RowClass::Retry,
            RowStatus::Failed { .. } => RowClass::Exhausted,
            RowStatus::Ready { .. } => RowClass::Ready,
            RowStatus::PermanentlyFailed => RowClass::PermanentlyFailed,
            RowStatus::Unrecognized { .. } => RowClass::Unrecognized,
        };

        match class {
            RowClass::Pending | RowClass::Retry if row.item_id.is_empty() => RowClass::MissingItemId,
            other => other,
        }
    }

    /// Build the work list for one run.
    pub fn plan(&self, rows: &[QueueRow]) -> WorkPlan {
        let mut counts = QueueCounts {
            total_rows: rows.len(),
            ..Default::default()
        };
        let mut pending = Vec::new();
        let mut retry = Vec::new();

        for row in rows {
            match self.classify(row) {
                RowClass::Pending => {
                    counts.pending += 1;
                    pending.push(row.clone());
                }
                RowClass::Retry => {
                    counts.retryable += 1;
                    retry.push(row.clone());
                }
                RowClass::Ready => counts.ready += 1,
                RowClass::PermanentlyFailed => counts.permanently_failed += 1,
                RowClass::Exhausted => counts.exhausted += 1,
                RowClass::Unrecognized => counts.unrecognized += 1,
                RowClass::MissingItemId => counts.missing_item_id += 1,
            }
        }

        let selected: Vec<QueueRow> = pending
            .into_iter()
            .chain(retry)
            .take(self.budget)
            .collect();

        WorkPlan { selected, counts }
    }

    /// Next status and payload for a row after an extraction.
    pub fn transition(&self, row: &QueueRow, outcome: &Extraction) -> RowUpdate {
        let position = row.row_position;

        match outcome {
            Extraction::Success { text, lang } => RowUpdate::with_payload(
                position,
                RowStatus::ready(lang.clone()),
                self.bounded(text),
            ),
            Extraction::Failed {
                kind: FailureKind::Permanent,
                diagnostic,
            } => RowUpdate::with_payload(position, RowStatus::PermanentlyFailed, self.bounded(diagnostic)),
            Extraction::Failed { diagnostic, .. } => {
                let attempts = row.status.attempts().saturating_add(1);
                if attempts > self.max_retries {
                    RowUpdate::with_payload(position, RowStatus::PermanentlyFailed, self.bounded(diagnostic))
                } else {
                    RowUpdate::status(position, RowStatus::failed(attempts))
                }
            }
        }
    }

    fn bounded(&self, text: &str) -> String {
        truncate_chars(text, self.max_payload_chars).to_string()
    }
}

/// Rows selected for a run plus the class counts of the whole table.
#[derive(Debug, Clone, Default)]
pub struct WorkPlan {
    pub selected: Vec<QueueRow>,
    pub counts: QueueCounts,
}

/// Row counts per class, for the run summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QueueCounts {
    pub total_rows: usize,
    pub pending: usize,
    pub retryable: usize,
    pub ready: usize,
    pub permanently_failed: usize,
    pub exhausted: usize,
    pub unrecognized: usize,
    pub missing_item_id: usize,
}
