//! Queue row models.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::status::RowStatus;
use crate::utils::extract_youtube_id;

const WATCH_URL_PREFIX: &str = "https://www.youtube.com/watch?v=";

/// External identifier of a queued item (a YouTube video id or URL).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    /// Create from a raw cell value (surrounding whitespace is dropped).
    pub fn new(s: impl AsRef<str>) -> Self {
        Self(s.as_ref().trim().to_string())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// URL handed to the extractor.
    ///
    /// YouTube URLs, with or without a scheme, collapse to a canonical watch
    /// URL. Other `http(s)` URLs pass through and bare ids are expanded.
    pub fn watch_url(&self) -> String {
        if let Ok(id) = extract_youtube_id(&self.0) {
            return format!("{WATCH_URL_PREFIX}{id}");
        }
        if self.0.starts_with("http://") || self.0.starts_with("https://") {
            self.0.clone()
        } else {
            format!("{WATCH_URL_PREFIX}{}", self.0)
        }
    }

    /// Filesystem-safe stem used to name extractor artifacts.
    ///
    /// YouTube URLs collapse to their video id so the prefix matches the
    /// plain-id form; other values keep only `[A-Za-z0-9_-]`.
    pub fn artifact_stem(&self) -> String {
        if let Ok(id) = extract_youtube_id(&self.0) {
            return id;
        }
        self.0
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// One data row of the queue table, as read at the start of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueRow {
    /// 1-based sheet row (row 1 is the header, data starts at 2).
    pub row_position: u32,
    pub item_id: ItemId,
    pub status: RowStatus,
}

impl QueueRow {
    pub fn new(row_position: u32, item_id: impl Into<ItemId>, status: RowStatus) -> Self {
        Self {
            row_position,
            item_id: item_id.into(),
            status,
        }
    }
}

/// Write-back for one row: the new status plus an optional payload.
///
/// Applied as a single update so payload and status can never diverge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowUpdate {
    pub row_position: u32,
    pub status: RowStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
}

impl RowUpdate {
    /// Status-only update.
    pub fn status(row_position: u32, status: RowStatus) -> Self {
        Self {
            row_position,
            status,
            payload: None,
        }
    }

    /// Update that also writes the payload cell.
    pub fn with_payload(row_position: u32, status: RowStatus, payload: impl Into<String>) -> Self {
        Self {
            row_position,
            status,
            payload: Some(payload.into()),
        }
    }
}
