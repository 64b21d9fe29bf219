//! yt-dlp wrapper for caption extraction.
//!
//! This crate provides:
//! - yt-dlp command builder and runner with a hard timeout
//! - Caption text normalizer for VTT/SRT/SRV3/TTML documents
//! - Failure classifier (permanent / transient / internal)
//! - The subtitle extractor adapter with artifact cleanup

pub mod classify;
pub mod command;
pub mod error;
pub mod extractor;
pub mod normalize;

pub use classify::{classify_error, classify_failure, classify_output};
pub use command::{check_ytdlp, ToolOutput, YtDlpCommand, YtDlpRunner};
pub use error::{MediaError, MediaResult};
pub use extractor::{CaptionExtractor, ExtractorConfig, YtDlpExtractor};
pub use normalize::normalize_captions;
