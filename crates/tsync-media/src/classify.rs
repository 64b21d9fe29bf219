//! Failure classification for extractor runs.
//!
//! Rules are checked in order and the first match wins. Only the three
//! access markers are permanent; everything else is worth another try.

use tsync_models::{truncate_chars, Extraction};

use crate::command::ToolOutput;
use crate::error::MediaError;

/// Age gate or login wall.
const SIGN_IN_MARKER: &str = "Sign in";
/// Deleted or otherwise unavailable video.
const UNAVAILABLE_MARKER: &str = "Video unavailable";
/// Private video.
const PRIVATE_MARKER: &str = "Private video";

/// Characters of tool diagnostics kept in the stored message.
const DIAGNOSTIC_PREFIX_CHARS: usize = 50;

pub const MSG_SIGN_IN: &str = "Age Restricted / Sign-in Required";
pub const MSG_UNAVAILABLE: &str = "Video Deleted or Private";
pub const MSG_PRIVATE: &str = "Private Video";
pub const MSG_NO_DATA: &str = "No transcript data found";
pub const MSG_SILENT_FAILURE: &str = "yt-dlp Failed (Likely No Subtitles or Video Unavailable)";

/// Classify a finished run that produced no usable caption.
///
/// `exit_code` is `None` when the tool was killed by a signal, which is
/// treated like any other non-zero exit.
pub fn classify_failure(exit_code: Option<i32>, stderr: &str) -> Extraction {
    if stderr.contains(SIGN_IN_MARKER) {
        return Extraction::permanent(MSG_SIGN_IN);
    }
    if stderr.contains(UNAVAILABLE_MARKER) {
        return Extraction::permanent(MSG_UNAVAILABLE);
    }
    if stderr.contains(PRIVATE_MARKER) {
        return Extraction::permanent(MSG_PRIVATE);
    }

    if exit_code == Some(0) {
        return Extraction::transient(MSG_NO_DATA);
    }

    match last_line(stderr) {
        Some(line) => Extraction::transient(format!(
            "yt-dlp Error ({}...)",
            truncate_chars(line, DIAGNOSTIC_PREFIX_CHARS)
        )),
        None => Extraction::transient(MSG_SILENT_FAILURE),
    }
}

/// Classify a finished run from its captured output.
pub fn classify_output(output: &ToolOutput) -> Extraction {
    classify_failure(output.exit_code, &output.stderr)
}

/// Classify an invocation that did not complete.
pub fn classify_error(error: &MediaError) -> Extraction {
    match error {
        MediaError::Timeout(secs) => Extraction::internal(format!("yt-dlp timed out after {secs}s")),
        other => Extraction::internal(other.to_string()),
    }
}

/// Last non-empty stderr line; yt-dlp prints the fatal `ERROR:` line last.
fn last_line(stderr: &str) -> Option<&str> {
    stderr.lines().map(str::trim).filter(|l| !l.is_empty()).last()
}
