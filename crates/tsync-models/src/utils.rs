//! YouTube URL parsing.
//!
//! Item ids in the queue table are usually bare video ids, but upstream
//! sometimes pastes full URLs. Both must map to the same artifact prefix.

use thiserror::Error;

/// Errors that can occur during YouTube ID extraction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum YoutubeIdError {
    #[error("URL is not a valid YouTube URL")]
    InvalidYoutubeUrl,
    #[error("Video ID has invalid format")]
    InvalidVideoId,
    #[error("Video ID not found in URL")]
    VideoIdNotFound,
}

/// Result type for YouTube ID extraction.
pub type YoutubeIdResult<T> = Result<T, YoutubeIdError>;

/// Path/query markers that precede a video id, in order of preference.
const ID_MARKERS: [&str; 6] = ["?v=", "&v=", "youtu.be/", "/embed/", "/v/", "/shorts/"];

/// Extract the 11-character video id from a YouTube URL.
///
/// Supports `watch?v=`, `youtu.be/`, `/embed/`, `/v/` and `/shorts/`
/// forms, with or without extra query parameters and fragments.
pub fn extract_youtube_id(url: &str) -> YoutubeIdResult<String> {
    let url = url.trim();
    let lower = url.to_ascii_lowercase();

    if !(lower.contains("youtube.com") || lower.contains("youtu.be")) {
        return Err(YoutubeIdError::InvalidYoutubeUrl);
    }

    for marker in ID_MARKERS {
        let Some(pos) = lower.find(marker) else {
            continue;
        };
        let rest = &url[pos + marker.len()..];
        if rest.is_empty() {
            continue;
        }
        return validate_youtube_id(id_segment(rest));
    }

    Err(YoutubeIdError::VideoIdNotFound)
}

/// Everything up to the next URL delimiter.
fn id_segment(rest: &str) -> &str {
    let end = rest
        .find(|c| matches!(c, '&' | '#' | '?' | '/'))
        .unwrap_or(rest.len());
    rest[..end].trim()
}

fn validate_youtube_id(id: &str) -> YoutubeIdResult<String> {
    let valid_chars = id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if id.len() != 11 || !valid_chars {
        return Err(YoutubeIdError::InvalidVideoId);
    }

    Ok(id.to_string())
}
