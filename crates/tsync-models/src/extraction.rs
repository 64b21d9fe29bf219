//! Extraction outcomes handed from the extractor adapter to the queue.

use serde::{Deserialize, Serialize};

/// Failure category assigned by the failure classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Will never succeed on retry (sign-in required, deleted, private).
    Permanent,
    /// May succeed on a later run (no data found, generic tool error).
    Transient,
    /// The invocation itself did not complete (timeout, spawn failure).
    /// Retried like `Transient`, logged with higher severity.
    Internal,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Permanent => "permanent",
            FailureKind::Transient => "transient",
            FailureKind::Internal => "internal",
        }
    }

    /// Whether the row may be retried on a later run.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, FailureKind::Permanent)
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Normalized result of one extractor invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Extraction {
    /// Usable caption text and the language it was extracted in.
    Success { text: String, lang: String },
    /// No usable caption; `diagnostic` is short enough to store in a cell.
    Failed {
        kind: FailureKind,
        diagnostic: String,
    },
}

impl Extraction {
    pub fn success(text: impl Into<String>, lang: impl Into<String>) -> Self {
        Self::Success {
            text: text.into(),
            lang: lang.into(),
        }
    }

    pub fn permanent(diagnostic: impl Into<String>) -> Self {
        Self::failed(FailureKind::Permanent, diagnostic)
    }

    pub fn transient(diagnostic: impl Into<String>) -> Self {
        Self::failed(FailureKind::Transient, diagnostic)
    }

    pub fn internal(diagnostic: impl Into<String>) -> Self {
        Self::failed(FailureKind::Internal, diagnostic)
    }

    pub fn failed(kind: FailureKind, diagnostic: impl Into<String>) -> Self {
        Self::Failed {
            kind,
            diagnostic: diagnostic.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Extraction::Success { .. })
    }

    /// Label for logs and metrics: `success` or the failure kind.
    pub fn label(&self) -> &'static str {
        match self {
            Extraction::Success { .. } => "success",
            Extraction::Failed { kind, .. } => kind.as_str(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_kinds() {
        assert!(!FailureKind::Permanent.is_retryable());
        assert!(FailureKind::Transient.is_retryable());
        assert!(FailureKind::Internal.is_retryable());
    }

    #[test]
    fn test_labels() {
        assert_eq!(Extraction::success("t", "en").label(), "success");
        assert_eq!(Extraction::permanent("x").label(), "permanent");
        assert_eq!(Extraction::transient("x").label(), "transient");
        assert_eq!(Extraction::internal("x").label(), "internal");
    }

    #[test]
    fn test_serialization_is_tagged() {
        let json = serde_json::to_value(Extraction::transient("No transcript data found")).unwrap();
        assert_eq!(json["outcome"], "failed");
        assert_eq!(json["kind"], "transient");
        assert_eq!(json["diagnostic"], "No transcript data found");
    }
}
