//! Error types for extractor invocation.

use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors raised while invoking the external tool.
///
/// These never reach the queue as errors: the extractor adapter folds them
/// into an internal-error extraction outcome.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("yt-dlp not found: {0}")]
    YtDlpNotFound(String),

    #[error("Failed to start yt-dlp: {0}")]
    SpawnFailed(String),

    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MediaError {
    pub fn spawn_failed(message: impl Into<String>) -> Self {
        Self::SpawnFailed(message.into())
    }
}
