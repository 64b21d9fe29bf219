//! Structured row logging utilities.
//!
//! Every line carries the row position and item id so a run can be traced
//! back to the sheet.

use tracing::{error, info, warn, Span};
use tsync_models::{FailureKind, QueueRow, RowStatus};

/// Row logger for structured logging with consistent fields.
#[derive(Debug, Clone)]
pub struct RowLogger {
    row: u32,
    item_id: String,
}

impl RowLogger {
    pub fn new(row: &QueueRow) -> Self {
        Self {
            row: row.row_position,
            item_id: row.item_id.to_string(),
        }
    }

    /// Log the start of an extraction.
    pub fn log_start(&self, status: &RowStatus) {
        info!(
            row = self.row,
            item_id = %self.item_id,
            status = %status,
            "Processing row"
        );
    }

    /// Log a usable transcript.
    pub fn log_success(&self, lang: &str, chars: usize) {
        info!(
            row = self.row,
            item_id = %self.item_id,
            lang = %lang,
            chars,
            "Transcript ready"
        );
    }

    /// Log a classified failure at the severity its kind deserves.
    pub fn log_failure(&self, kind: FailureKind, diagnostic: &str, next: &RowStatus) {
        match kind {
            FailureKind::Internal => error!(
                row = self.row,
                item_id = %self.item_id,
                outcome = kind.as_str(),
                status = %next,
                "Extractor error: {}", diagnostic
            ),
            FailureKind::Permanent | FailureKind::Transient => warn!(
                row = self.row,
                item_id = %self.item_id,
                outcome = kind.as_str(),
                status = %next,
                "Extraction failed: {}", diagnostic
            ),
        }
    }

    /// Log a failed write-back.
    pub fn log_write_failure(&self, err: &dyn std::fmt::Display) {
        error!(
            row = self.row,
            item_id = %self.item_id,
            "Failed to write row, it keeps its previous status: {}", err
        );
    }

    /// Log a row that would be processed in a dry run.
    pub fn log_planned(&self, status: &RowStatus) {
        info!(
            row = self.row,
            item_id = %self.item_id,
            status = %status,
            "Dry run: row selected"
        );
    }

    pub fn row(&self) -> u32 {
        self.row
    }

    pub fn item_id(&self) -> &str {
        &self.item_id
    }

    /// Create a tracing span for this row.
    pub fn create_span(&self) -> Span {
        tracing::info_span!("row", row = self.row, item_id = %self.item_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_logger_fields() {
        let row = QueueRow::new(7, "abc123", RowStatus::Pending);
        let logger = RowLogger::new(&row);

        assert_eq!(logger.row(), 7);
        assert_eq!(logger.item_id(), "abc123");
    }
}
