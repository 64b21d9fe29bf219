//! Run driver.
//!
//! One run: take the run lock, read the table once, plan the work list and
//! push each selected row through extraction and write-back, pausing
//! between rows.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tracing::{info, warn, Instrument};
use tsync_media::CaptionExtractor;
use tsync_models::Extraction;
use tsync_sheets::QueueTable;

use crate::config::{PacingConfig, WorkerConfig};
use crate::error::{WorkerError, WorkerResult};
use crate::lock::RunLock;
use crate::logging::RowLogger;
use crate::queue::QueuePolicy;
use crate::summary::RunSummary;

/// Result of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The run went through its work list.
    Completed(RunSummary),
    /// Another run holds the lock; nothing was read or written.
    Locked,
}

/// Drives one run against a queue table and an extractor.
pub struct RunDriver {
    table: Arc<dyn QueueTable>,
    extractor: Arc<dyn CaptionExtractor>,
    config: WorkerConfig,
}

impl RunDriver {
    pub fn new(
        table: Arc<dyn QueueTable>,
        extractor: Arc<dyn CaptionExtractor>,
        config: WorkerConfig,
    ) -> Self {
        Self {
            table,
            extractor,
            config,
        }
    }

    fn policy(&self) -> QueuePolicy {
        QueuePolicy {
            budget: self.config.max_rows_per_run,
            max_retries: self.config.max_retries,
            max_payload_chars: self.config.max_payload_chars,
        }
    }

    /// Execute one run under the run lock.
    pub async fn run(&self) -> WorkerResult<RunOutcome> {
        let Some(_lock) = RunLock::try_acquire(&self.config.lock_path)? else {
            warn!(
                lock = %self.config.lock_path.display(),
                "Another run is in progress, exiting"
            );
            return Ok(RunOutcome::Locked);
        };

        let summary = self.run_unlocked().await?;
        summary.log();
        Ok(RunOutcome::Completed(summary))
    }

    /// Execute one run without taking the lock.
    pub async fn run_unlocked(&self) -> WorkerResult<RunSummary> {
        let policy = self.policy();
        let rows = self.table.read_rows().await?;
        let plan = policy.plan(&rows);

        info!(
            total_rows = plan.counts.total_rows,
            pending = plan.counts.pending,
            retryable = plan.counts.retryable,
            selected = plan.selected.len(),
            budget = policy.budget,
            "Work list built"
        );

        let mut summary = RunSummary::new(plan.counts, plan.selected.len(), self.config.dry_run);

        if self.config.dry_run {
            for row in &plan.selected {
                RowLogger::new(row).log_planned(&row.status);
            }
            return Ok(summary);
        }

        let mut consecutive_write_failures: u32 = 0;
        let last = plan.selected.len().saturating_sub(1);

        for (index, row) in plan.selected.iter().enumerate() {
            let logger = RowLogger::new(row);
            let span = logger.create_span();

            logger.log_start(&row.status);
            let outcome = self.extractor.extract(&row.item_id).instrument(span.clone()).await;
            let update = policy.transition(row, &outcome);

            match &outcome {
                Extraction::Success { lang, text } => logger.log_success(lang, text.chars().count()),
                Extraction::Failed { kind, diagnostic } => {
                    logger.log_failure(*kind, diagnostic, &update.status)
                }
            }
            summary.record(&outcome);

            match self.table.apply(&update).instrument(span).await {
                Ok(()) => consecutive_write_failures = 0,
                Err(e) if e.is_fatal() => return Err(e.into()),
                Err(e) => {
                    summary.record_write_failure();
                    logger.log_write_failure(&e);
                    consecutive_write_failures += 1;
                    if consecutive_write_failures >= self.config.max_consecutive_write_failures {
                        return Err(WorkerError::aborted(format!(
                            "{} consecutive write failures, last: {}",
                            consecutive_write_failures, e
                        )));
                    }
                }
            }

            if index < last {
                tokio::time::sleep(pause_after(&self.config.pacing, outcome.is_success())).await;
            }
        }

        Ok(summary)
    }
}

/// Pause before the next row, with uniform random jitter on top.
pub fn pause_after(pacing: &PacingConfig, success: bool) -> Duration {
    let base = if success { pacing.success } else { pacing.failure };
    let jitter_ms = pacing.jitter.as_millis() as u64;
    if jitter_ms == 0 {
        return base;
    }
    base + Duration::from_millis(rand::rng().random_range(0..=jitter_ms))
}
