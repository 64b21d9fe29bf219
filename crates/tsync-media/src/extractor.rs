//! Subtitle extractor adapter.
//!
//! Runs yt-dlp for one item, picks the best caption artifact it wrote,
//! normalizes it and reduces everything else to a classified failure.
//! Artifacts sharing the item's prefix are removed on every exit path.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};
use tsync_models::{CaptionFormat, Extraction, ItemId};

use crate::classify::{classify_error, classify_output, MSG_NO_DATA};
use crate::command::{check_ytdlp, YtDlpCommand, YtDlpRunner};
use crate::error::MediaResult;
use crate::normalize::normalize_captions;

/// Language tag used when an artifact name carries none.
const UNKNOWN_LANG: &str = "xx";

/// Something that can turn an item id into caption text.
#[async_trait]
pub trait CaptionExtractor: Send + Sync {
    /// Extract captions for one item. Never fails: every problem is
    /// reported as a classified [`Extraction::Failed`].
    async fn extract(&self, item_id: &ItemId) -> Extraction;
}

/// Extractor configuration.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// yt-dlp binary (name on PATH or absolute path)
    pub binary: PathBuf,
    /// Candidate caption languages in preference order
    pub languages: Vec<String>,
    /// Wall-clock limit for one invocation
    pub timeout: Duration,
    /// Directory yt-dlp writes artifacts into
    pub work_dir: PathBuf,
    /// Normalized text must be longer than this to count as a transcript
    pub min_chars: usize,
    /// Normalized text is truncated to this many characters
    pub max_chars: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("yt-dlp"),
            languages: ["en", "en-US", "en-orig", "ko", "ko-KR"]
                .into_iter()
                .map(String::from)
                .collect(),
            timeout: Duration::from_secs(45),
            work_dir: PathBuf::from("."),
            min_chars: 50,
            max_chars: 49_000,
        }
    }
}

/// yt-dlp backed [`CaptionExtractor`].
#[derive(Debug, Clone)]
pub struct YtDlpExtractor {
    config: ExtractorConfig,
    runner: YtDlpRunner,
}

impl YtDlpExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        let runner = YtDlpRunner::new(&config.binary, config.timeout);
        Self { config, runner }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Verify the configured binary can be found before a run starts.
    pub fn check_available(&self) -> MediaResult<PathBuf> {
        check_ytdlp(&self.config.binary)
    }

    /// Pick the first candidate whose normalized text is long enough.
    async fn first_usable(&self, candidates: &[CaptionArtifact]) -> Option<(String, String)> {
        for artifact in candidates {
            let raw = match tokio::fs::read(&artifact.path).await {
                Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                Err(e) => {
                    warn!(path = %artifact.path.display(), error = %e, "Failed to read caption file");
                    continue;
                }
            };

            let text = normalize_captions(&raw, artifact.format, self.config.max_chars);
            let chars = text.chars().count();
            if chars > self.config.min_chars {
                return Some((text, artifact.lang.clone()));
            }
            debug!(
                path = %artifact.path.display(),
                chars,
                "Caption file below minimum length, skipping"
            );
        }
        None
    }
}

#[async_trait]
impl CaptionExtractor for YtDlpExtractor {
    async fn extract(&self, item_id: &ItemId) -> Extraction {
        let prefix = format!("temp_{}", item_id.artifact_stem());
        let cleanup = ArtifactCleanup::new(&self.config.work_dir, &prefix);

        // Leftovers from a killed run would otherwise be read as fresh output
        cleanup.sweep();

        let cmd = YtDlpCommand::new(item_id.watch_url(), self.config.work_dir.join(&prefix))
            .sub_langs(self.config.languages.iter().cloned());

        let output = match self.runner.run(&cmd).await {
            Ok(output) => output,
            Err(e) => return classify_error(&e),
        };

        let candidates = caption_candidates(
            &self.config.work_dir,
            &prefix,
            &self.config.languages,
        );

        if let Some((text, lang)) = self.first_usable(&candidates).await {
            info!(
                item_id = %item_id,
                lang = %lang,
                chars = text.chars().count(),
                "Caption extracted"
            );
            return Extraction::success(text, lang);
        }

        if output.success() {
            Extraction::transient(MSG_NO_DATA)
        } else {
            classify_output(&output)
        }
    }
}

/// A caption file written by the extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CaptionArtifact {
    path: PathBuf,
    format: CaptionFormat,
    lang: String,
}

/// Whether a file name belongs to the artifact prefix.
///
/// yt-dlp appends `.<lang>.<ext>` to the template, so the prefix must be
/// followed by a dot; `temp_abc` must not match `temp_abcdef.en.vtt`.
fn belongs_to(name: &str, prefix: &str) -> bool {
    match name.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('.'),
        None => false,
    }
}

/// Language segment of `<prefix>.<lang>.<ext>`.
fn artifact_lang(name: &str, prefix: &str) -> String {
    name.strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('.'))
        .and_then(|rest| rest.rsplit_once('.'))
        .map(|(lang, _ext)| lang)
        .filter(|lang| !lang.is_empty())
        .unwrap_or(UNKNOWN_LANG)
        .to_string()
}

fn matching_files(dir: &Path, prefix: &str) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "Failed to read work directory");
            return Vec::new();
        }
    };

    entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| belongs_to(&entry.file_name().to_string_lossy(), prefix))
        .map(|entry| entry.path())
        .collect()
}

/// Caption artifacts for a prefix, ordered by language preference then name.
fn caption_candidates(dir: &Path, prefix: &str, languages: &[String]) -> Vec<CaptionArtifact> {
    let mut candidates: Vec<CaptionArtifact> = matching_files(dir, prefix)
        .into_iter()
        .filter_map(|path| {
            let format = CaptionFormat::from_path(&path)?;
            let name = path.file_name()?.to_string_lossy().into_owned();
            Some(CaptionArtifact {
                lang: artifact_lang(&name, prefix),
                format,
                path,
            })
        })
        .collect();

    candidates.sort_by(|a, b| {
        let rank = |lang: &str| {
            languages
                .iter()
                .position(|l| l == lang)
                .unwrap_or(languages.len())
        };
        rank(&a.lang)
            .cmp(&rank(&b.lang))
            .then_with(|| a.path.cmp(&b.path))
    });

    candidates
}

/// Removes every artifact sharing a prefix when dropped.
struct ArtifactCleanup {
    dir: PathBuf,
    prefix: String,
}

impl ArtifactCleanup {
    fn new(dir: &Path, prefix: &str) -> Self {
        Self {
            dir: dir.to_path_buf(),
            prefix: prefix.to_string(),
        }
    }

    fn sweep(&self) {
        for path in matching_files(&self.dir, &self.prefix) {
            match std::fs::remove_file(&path) {
                Ok(()) => debug!(path = %path.display(), "Removed caption artifact"),
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove caption artifact"),
            }
        }
    }
}

impl Drop for ArtifactCleanup {
    fn drop(&mut self) {
        self.sweep();
    }
}
