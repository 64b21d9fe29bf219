//! Worker configuration.

use std::path::PathBuf;
use std::time::Duration;

use tsync_media::ExtractorConfig;
use tsync_sheets::DEFAULT_WORKSHEET;

/// Lock file name created inside the work directory.
const LOCK_FILE_NAME: &str = ".transcript-sync.lock";

/// Pause between rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingConfig {
    /// Pause after a successful extraction
    pub success: Duration,
    /// Pause after a failed extraction
    pub failure: Duration,
    /// Upper bound of the random extra pause
    pub jitter: Duration,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            success: Duration::from_millis(2000),
            failure: Duration::from_millis(1000),
            jitter: Duration::from_millis(1000),
        }
    }
}

impl PacingConfig {
    /// No pauses at all.
    pub fn none() -> Self {
        Self {
            success: Duration::ZERO,
            failure: Duration::ZERO,
            jitter: Duration::ZERO,
        }
    }
}

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Worksheet (tab) holding the queue
    pub worksheet: String,
    /// Maximum rows processed per run
    pub max_rows_per_run: usize,
    /// Transient failures tolerated after the first one
    pub max_retries: u32,
    /// Payload cells are truncated to this many characters
    pub max_payload_chars: usize,
    /// Pause between rows
    pub pacing: PacingConfig,
    /// Extractor settings
    pub extractor: ExtractorConfig,
    /// Run lock file
    pub lock_path: PathBuf,
    /// Consecutive failed writes before the run is aborted
    pub max_consecutive_write_failures: u32,
    /// Select and log only; no extraction, no writes
    pub dry_run: bool,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        let extractor = ExtractorConfig::default();
        Self {
            worksheet: DEFAULT_WORKSHEET.to_string(),
            max_rows_per_run: 50,
            max_retries: 3,
            max_payload_chars: extractor.max_chars,
            pacing: PacingConfig::default(),
            lock_path: extractor.work_dir.join(LOCK_FILE_NAME),
            extractor,
            max_consecutive_write_failures: 3,
            dry_run: false,
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let work_dir = std::env::var("WORK_DIR")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| defaults.extractor.work_dir.clone());

        let max_payload_chars = env_parse("MAX_PAYLOAD_CHARS").unwrap_or(defaults.max_payload_chars);

        let languages = std::env::var("SUB_LANGS")
            .ok()
            .map(|s| parse_list(&s))
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| defaults.extractor.languages.clone());

        let extractor = ExtractorConfig {
            binary: std::env::var("YTDLP_PATH")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| defaults.extractor.binary.clone()),
            languages,
            timeout: Duration::from_secs(
                env_parse("YTDLP_TIMEOUT_SECS").unwrap_or(defaults.extractor.timeout.as_secs()),
            ),
            work_dir: work_dir.clone(),
            min_chars: env_parse("MIN_TRANSCRIPT_CHARS").unwrap_or(defaults.extractor.min_chars),
            max_chars: max_payload_chars,
        };

        let pacing = PacingConfig {
            success: env_millis("PACING_SUCCESS_MS").unwrap_or(defaults.pacing.success),
            failure: env_millis("PACING_FAILURE_MS").unwrap_or(defaults.pacing.failure),
            jitter: env_millis("PACING_JITTER_MS").unwrap_or(defaults.pacing.jitter),
        };

        let lock_path = std::env::var("LOCK_PATH")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| work_dir.join(LOCK_FILE_NAME));

        Self {
            worksheet: std::env::var("WORKSHEET_NAME")
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.worksheet),
            max_rows_per_run: env_parse("MAX_ROWS_PER_RUN").unwrap_or(defaults.max_rows_per_run),
            max_retries: env_parse("MAX_RETRIES").unwrap_or(defaults.max_retries),
            max_payload_chars,
            pacing,
            extractor,
            lock_path,
            max_consecutive_write_failures: env_parse("MAX_CONSECUTIVE_WRITE_FAILURES")
                .unwrap_or(defaults.max_consecutive_write_failures),
            dry_run: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

fn env_millis(key: &str) -> Option<Duration> {
    env_parse::<u64>(key).map(Duration::from_millis)
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
