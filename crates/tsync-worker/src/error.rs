//! Worker error types.

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Run lock error: {0}")]
    LockFailed(String),

    #[error("Run aborted: {0}")]
    Aborted(String),

    #[error("Sheets error: {0}")]
    Sheets(#[from] tsync_sheets::SheetsError),

    #[error("Media error: {0}")]
    Media(#[from] tsync_media::MediaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn lock_failed(msg: impl Into<String>) -> Self {
        Self::LockFailed(msg.into())
    }

    pub fn aborted(msg: impl Into<String>) -> Self {
        Self::Aborted(msg.into())
    }

    /// Errors caused by setup (credentials, spreadsheet layout, tooling)
    /// rather than by something that happened mid-run.
    pub fn is_config_error(&self) -> bool {
        match self {
            WorkerError::ConfigError(_) => true,
            WorkerError::Sheets(e) => e.is_fatal(),
            WorkerError::Media(tsync_media::MediaError::YtDlpNotFound(_)) => true,
            _ => false,
        }
    }
}
