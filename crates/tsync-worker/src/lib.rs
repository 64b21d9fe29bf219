//! Transcript ingest queue worker.
//!
//! This crate provides:
//! - The queue row state machine (selection, run budget, transitions)
//! - The run driver with pacing and write-back failure handling
//! - Single-flight run lock
//! - Worker configuration, errors and structured row logging

pub mod config;
pub mod driver;
pub mod error;
pub mod lock;
pub mod logging;
pub mod queue;
pub mod summary;

pub use config::{PacingConfig, WorkerConfig};
pub use driver::{RunDriver, RunOutcome};
pub use error::{WorkerError, WorkerResult};
pub use logging::RowLogger;
pub use queue::{QueueCounts, QueuePolicy, RowClass, WorkPlan};
pub use summary::RunSummary;

use std::sync::Arc;

use tsync_media::YtDlpExtractor;
use tsync_sheets::{SheetsClient, SheetsConfig, SheetsQueueTable};

/// Build the production collaborators from the environment and run once.
pub async fn run_from_env(config: WorkerConfig) -> WorkerResult<RunOutcome> {
    let sheets_config = SheetsConfig::from_env()?;
    let client = SheetsClient::new(sheets_config).await?;
    let table = SheetsQueueTable::new(client, config.worksheet.clone());

    let extractor = YtDlpExtractor::new(config.extractor.clone());
    if !config.dry_run {
        let path = extractor.check_available()?;
        tracing::info!(ytdlp = %path.display(), "Using yt-dlp");
        std::fs::create_dir_all(&config.extractor.work_dir)?;
    }

    let driver = RunDriver::new(Arc::new(table), Arc::new(extractor), config);
    driver.run().await
}
