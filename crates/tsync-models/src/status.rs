//! Row status state machine and its status-cell encoding.
//!
//! The status cell of the queue table doubles as lifecycle state and retry
//! counter. [`RowStatus::decode`] and [`RowStatus::encode`] are the only
//! places that look at the raw string; everything else works on the enum.

use std::fmt;

use serde::{Deserialize, Serialize};

const PENDING: &str = "Pending Transcript";
const PENDING_SHORT: &str = "Pending";
const FAILED: &str = "TranscriptFailed";
const FAILED_LEGACY: &str = "Transcript Failed";
const FAILED_COUNTER_SEP: &str = " x";
const READY: &str = "Ready for AI";
const PERMANENTLY_FAILED: &str = "PermanentlyFailed";
const PERMANENTLY_FAILED_LEGACY: &str = "Permanently Failed";

/// Lifecycle state of a queue row, decoded from its status cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RowStatus {
    /// Newly enqueued, never attempted.
    Pending,
    /// Attempted `attempts` times, every attempt failed transiently (`attempts >= 1`).
    Failed { attempts: u32 },
    /// Transcript written; terminal.
    Ready { lang: Option<String> },
    /// Retry ceiling reached or permanent failure classified; terminal.
    PermanentlyFailed,
    /// Anything else, including empty cells and downstream workflow states.
    Unrecognized { raw: String },
}

impl RowStatus {
    /// Decode a raw status cell.
    ///
    /// Matching is case-sensitive against an exact allow-list. The retry
    /// counter is parsed forgivingly: a missing or malformed `xN` suffix
    /// counts as one attempt.
    pub fn decode(raw: &str) -> Self {
        let value = raw.trim();

        match value {
            PENDING | PENDING_SHORT => return RowStatus::Pending,
            PERMANENTLY_FAILED | PERMANENTLY_FAILED_LEGACY => return RowStatus::PermanentlyFailed,
            READY => return RowStatus::Ready { lang: None },
            _ => {}
        }

        if let Some(rest) = value.strip_prefix(READY) {
            let lang = rest
                .strip_prefix(" (")
                .and_then(|r| r.strip_suffix(')'))
                .filter(|l| is_lang_tag(l));
            if let Some(lang) = lang {
                return RowStatus::Ready {
                    lang: Some(lang.to_string()),
                };
            }
        }

        for prefix in [FAILED, FAILED_LEGACY] {
            if let Some(rest) = value.strip_prefix(prefix) {
                if rest.is_empty() {
                    return RowStatus::Failed { attempts: 1 };
                }
                if let Some(counter) = rest.strip_prefix(FAILED_COUNTER_SEP) {
                    return RowStatus::Failed {
                        attempts: parse_attempts(counter),
                    };
                }
            }
        }

        RowStatus::Unrecognized {
            raw: raw.to_string(),
        }
    }

    /// Encode into the canonical status-cell string.
    ///
    /// Spaced forms such as `Transcript Failed x2` still decode but are
    /// never written.
    pub fn encode(&self) -> String {
        match self {
            RowStatus::Pending => PENDING.to_string(),
            RowStatus::Failed { attempts } if *attempts <= 1 => FAILED.to_string(),
            RowStatus::Failed { attempts } => format!("{FAILED}{FAILED_COUNTER_SEP}{attempts}"),
            RowStatus::Ready { lang: Some(lang) } => format!("{READY} ({lang})"),
            RowStatus::Ready { lang: None } => READY.to_string(),
            RowStatus::PermanentlyFailed => PERMANENTLY_FAILED.to_string(),
            RowStatus::Unrecognized { raw } => raw.clone(),
        }
    }

    /// Failed status with the given attempt count (clamped to at least 1).
    pub fn failed(attempts: u32) -> Self {
        RowStatus::Failed {
            attempts: attempts.max(1),
        }
    }

    /// Ready status for a detected language.
    pub fn ready(lang: impl Into<String>) -> Self {
        RowStatus::Ready {
            lang: Some(lang.into()),
        }
    }

    /// Number of failed attempts recorded in the status (0 unless `Failed`).
    pub fn attempts(&self) -> u32 {
        match self {
            RowStatus::Failed { attempts } => *attempts,
            _ => 0,
        }
    }

    /// Check if this is a terminal state for the ingest stage.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RowStatus::Ready { .. } | RowStatus::PermanentlyFailed)
    }

    /// Short label used in logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            RowStatus::Pending => "pending",
            RowStatus::Failed { .. } => "failed",
            RowStatus::Ready { .. } => "ready",
            RowStatus::PermanentlyFailed => "permanently_failed",
            RowStatus::Unrecognized { .. } => "unrecognized",
        }
    }
}

fn parse_attempts(counter: &str) -> u32 {
    counter
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|n| *n >= 1)
        .unwrap_or(1)
}

fn is_lang_tag(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl fmt::Display for RowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl From<&str> for RowStatus {
    fn from(s: &str) -> Self {
        RowStatus::decode(s)
    }
}

impl From<String> for RowStatus {
    fn from(s: String) -> Self {
        RowStatus::decode(&s)
    }
}

impl From<RowStatus> for String {
    fn from(status: RowStatus) -> Self {
        status.encode()
    }
}
