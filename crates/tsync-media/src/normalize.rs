//! Caption text normalization.
//!
//! Turns a caption document into plain prose using line-shape heuristics
//! rather than a strict parser, so the same code handles every dialect
//! yt-dlp may hand back.

use std::sync::OnceLock;

use regex::{Captures, Regex};
use tsync_models::{truncate_chars, CaptionFormat};

/// Headers that can appear in any dialect.
const COMMON_HEADERS: [&str; 3] = ["WEBVTT", "<?xml", "<!DOCTYPE"];

/// WebVTT block headers and metadata lines.
const VTT_HEADERS: [&str; 5] = ["Kind:", "Language:", "NOTE", "STYLE", "REGION"];

fn tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"))
}

fn line_break_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)<br\s*/?>").expect("line break pattern is valid"))
}

fn inline_timestamp_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"<(?:\d{2}:)?\d{2}:\d{2}[.,]\d{3}>").expect("timestamp pattern is valid")
    })
}

fn entity_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[a-zA-Z]+);").expect("entity pattern is valid")
    })
}

/// Normalize a caption document into a single line of spoken text.
///
/// Cue indices, timing lines, dialect headers and lines carrying inline
/// cue styling are dropped; markup is stripped, entities decoded and
/// consecutive duplicate lines (rolling auto-captions) collapsed. The
/// result is truncated to `max_chars` characters.
pub fn normalize_captions(raw: &str, format: CaptionFormat, max_chars: usize) -> String {
    let mut kept: Vec<String> = Vec::new();

    for line in raw.lines() {
        let line = line.trim();
        if is_structural(line, format) {
            continue;
        }

        let text = clean_line(line);
        if text.is_empty() {
            continue;
        }
        if kept.last() == Some(&text) {
            continue;
        }
        kept.push(text);
    }

    truncate_chars(&kept.join(" "), max_chars).to_string()
}

/// Lines that carry no spoken text.
fn is_structural(line: &str, format: CaptionFormat) -> bool {
    if line.is_empty() {
        return true;
    }

    // Cue sequence number
    if line.chars().all(|c| c.is_ascii_digit()) {
        return true;
    }

    // Cue timing range
    if line.contains("-->") {
        return true;
    }

    if COMMON_HEADERS.iter().any(|h| line.starts_with(h)) {
        return true;
    }

    if format == CaptionFormat::Vtt && VTT_HEADERS.iter().any(|h| line.starts_with(h)) {
        return true;
    }

    // Inline cue styling marks the word-by-word duplicate of an auto caption
    line.contains("<c>") || line.contains("<c.") || inline_timestamp_pattern().is_match(line)
}

fn clean_line(line: &str) -> String {
    let line = line_break_pattern().replace_all(line, " ");
    let line = tag_pattern().replace_all(&line, "");
    let line = decode_entities(&line);
    line.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Decode the HTML entities that show up in caption files.
fn decode_entities(text: &str) -> String {
    entity_pattern()
        .replace_all(text, |caps: &Captures| {
            let entity = &caps[1];
            let decoded = match entity {
                "nbsp" => Some(' '),
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => decode_numeric(entity),
            };
            match decoded {
                Some(c) => c.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

fn decode_numeric(entity: &str) -> Option<char> {
    let digits = entity.strip_prefix('#')?;
    let code = match digits.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => digits.parse::<u32>().ok()?,
    };
    char::from_u32(code)
}
