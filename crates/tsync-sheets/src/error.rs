//! Sheets error types.

use thiserror::Error;

/// Result type for Sheets operations.
pub type SheetsResult<T> = Result<T, SheetsError>;

/// Errors that can occur during Sheets operations.
#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication failed: {0}")]
    AuthError(String),

    #[error("Spreadsheet or range not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Server error {0}: {1}")]
    ServerError(u16, String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Rate limited, retry after {0}ms")]
    RateLimited(u64),

    #[error("Required column '{column}' missing from header row of '{worksheet}'")]
    MissingColumn { worksheet: String, column: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Delay assumed for a 429 without a usable Retry-After header.
const DEFAULT_RATE_LIMIT_MS: u64 = 1000;

impl SheetsError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn auth_error(msg: impl Into<String>) -> Self {
        Self::AuthError(msg.into())
    }

    pub fn request_failed(msg: impl Into<String>) -> Self {
        Self::RequestFailed(msg.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    pub fn missing_column(worksheet: impl Into<String>, column: impl Into<String>) -> Self {
        Self::MissingColumn {
            worksheet: worksheet.into(),
            column: column.into(),
        }
    }

    /// Map a non-success HTTP status to an error.
    pub fn from_http_status(status: u16, msg: impl Into<String>) -> Self {
        Self::from_http_status_with_retry_after(status, msg, None)
    }

    /// Map a non-success HTTP status, honouring a parsed Retry-After value.
    pub fn from_http_status_with_retry_after(
        status: u16,
        msg: impl Into<String>,
        retry_after_ms: Option<u64>,
    ) -> Self {
        let msg = msg.into();
        match status {
            401 => Self::AuthError(msg),
            403 => Self::PermissionDenied(msg),
            404 => Self::NotFound(msg),
            429 => Self::RateLimited(retry_after_ms.unwrap_or(DEFAULT_RATE_LIMIT_MS)),
            500..=599 => Self::ServerError(status, msg),
            _ => Self::RequestFailed(msg),
        }
    }

    /// Check if error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SheetsError::Network(_) | SheetsError::RateLimited(_) | SheetsError::ServerError(..)
        )
    }

    /// Server-requested delay before the next attempt.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            SheetsError::RateLimited(ms) => Some(*ms),
            _ => None,
        }
    }

    /// HTTP status this error corresponds to, if any.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            SheetsError::AuthError(_) => Some(401),
            SheetsError::PermissionDenied(_) => Some(403),
            SheetsError::NotFound(_) => Some(404),
            SheetsError::RateLimited(_) => Some(429),
            SheetsError::ServerError(status, _) => Some(*status),
            SheetsError::RequestFailed(_) => Some(400),
            SheetsError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Errors that make the run pointless: bad credentials or table layout.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SheetsError::Config(_)
                | SheetsError::AuthError(_)
                | SheetsError::PermissionDenied(_)
                | SheetsError::NotFound(_)
                | SheetsError::MissingColumn { .. }
        )
    }
}

/// Parse a `Retry-After` header given in seconds.
pub fn parse_retry_after(value: Option<&str>) -> Option<u64> {
    value
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(|secs| secs.saturating_mul(1000))
}
