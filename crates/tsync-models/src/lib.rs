//! Shared data models for the transcript ingest queue.
//!
//! This crate provides:
//! - The row status state machine and its single cell encoding
//! - Queue rows and item identifiers
//! - Extraction outcomes and failure categories
//! - Caption format detection and text truncation helpers

pub mod caption;
pub mod extraction;
pub mod row;
pub mod status;
pub mod text;
pub mod utils;

// Re-export common types
pub use caption::CaptionFormat;
pub use extraction::{Extraction, FailureKind};
pub use row::{ItemId, QueueRow, RowUpdate};
pub use status::RowStatus;
pub use text::truncate_chars;
pub use utils::{extract_youtube_id, YoutubeIdError, YoutubeIdResult};
