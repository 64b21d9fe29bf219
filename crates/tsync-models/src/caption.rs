//! Caption file dialects produced by the extractor.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Markup dialect of a caption artifact, taken from its file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptionFormat {
    /// WebVTT (`.vtt`)
    Vtt,
    /// YouTube timed text v3 XML (`.srv3`)
    Srv3,
    /// Timed Text Markup Language (`.ttml`)
    Ttml,
    /// SubRip (`.srt`)
    Srt,
}

impl CaptionFormat {
    pub const ALL: [CaptionFormat; 4] = [
        CaptionFormat::Vtt,
        CaptionFormat::Srv3,
        CaptionFormat::Ttml,
        CaptionFormat::Srt,
    ];

    pub fn extension(&self) -> &'static str {
        match self {
            CaptionFormat::Vtt => "vtt",
            CaptionFormat::Srv3 => "srv3",
            CaptionFormat::Ttml => "ttml",
            CaptionFormat::Srt => "srt",
        }
    }

    /// Parse a bare extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.extension().eq_ignore_ascii_case(ext))
    }

    /// Detect the dialect from a file name or path.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

impl std::fmt::Display for CaptionFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path() {
        assert_eq!(
            CaptionFormat::from_path("temp_abc.en.vtt"),
            Some(CaptionFormat::Vtt)
        );
        assert_eq!(
            CaptionFormat::from_path("/tmp/temp_abc.ko.SRV3"),
            Some(CaptionFormat::Srv3)
        );
        assert_eq!(CaptionFormat::from_path("temp_abc.en.json3"), None);
        assert_eq!(CaptionFormat::from_path("temp_abc"), None);
    }
}
