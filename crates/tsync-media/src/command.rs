//! yt-dlp command builder and runner.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};

/// Builder for a subtitle-only yt-dlp invocation.
#[derive(Debug, Clone)]
pub struct YtDlpCommand {
    /// Video URL
    url: String,
    /// Output template (no extension; yt-dlp appends `.<lang>.<ext>`)
    output: PathBuf,
    /// Subtitle languages in preference order
    sub_langs: Vec<String>,
    /// Extra arguments placed before the URL
    extra_args: Vec<String>,
}

impl YtDlpCommand {
    /// Create a new command for a URL and output template.
    pub fn new(url: impl Into<String>, output: impl AsRef<Path>) -> Self {
        Self {
            url: url.into(),
            output: output.as_ref().to_path_buf(),
            sub_langs: Vec::new(),
            extra_args: Vec::new(),
        }
    }

    /// Set requested subtitle languages.
    pub fn sub_langs<I, S>(mut self, langs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sub_langs = langs.into_iter().map(Into::into).collect();
        self
    }

    /// Add an extra argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.extra_args.push(arg.into());
        self
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = vec![
            "--skip-download".to_string(),
            "--write-sub".to_string(),
            "--write-auto-sub".to_string(),
            "--no-warnings".to_string(),
        ];

        if !self.sub_langs.is_empty() {
            args.push("--sub-lang".to_string());
            args.push(self.sub_langs.join(","));
        }

        args.push("--output".to_string());
        args.push(self.output.to_string_lossy().to_string());

        args.extend(self.extra_args.clone());
        args.push(self.url.clone());

        args
    }
}

/// Exit status and captured diagnostics of a finished invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit code; `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    /// Captured standard error (lossy UTF-8)
    pub stderr: String,
}

impl ToolOutput {
    pub fn from_status(status: ExitStatus, stderr: String) -> Self {
        Self {
            exit_code: status.code(),
            stderr,
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runner for yt-dlp with a hard wall-clock timeout.
#[derive(Debug, Clone)]
pub struct YtDlpRunner {
    binary: PathBuf,
    timeout: Duration,
}

impl YtDlpRunner {
    /// Create a new runner.
    pub fn new(binary: impl AsRef<Path>, timeout: Duration) -> Self {
        Self {
            binary: binary.as_ref().to_path_buf(),
            timeout,
        }
    }

    /// Run a command to completion.
    ///
    /// Standard output is discarded and standard error captured. One deadline
    /// covers both the exit and the stderr drain, since a surviving grandchild
    /// can hold the pipe open. On timeout the child is killed and
    /// `MediaError::Timeout` returned.
    pub async fn run(&self, cmd: &YtDlpCommand) -> MediaResult<ToolOutput> {
        let args = cmd.build_args();
        debug!("Running yt-dlp: {} {}", self.binary.display(), args.join(" "));

        let mut child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    MediaError::YtDlpNotFound(self.binary.display().to_string())
                } else {
                    MediaError::spawn_failed(e.to_string())
                }
            })?;

        let stderr = child.stderr.take();
        let mut stderr_task = tokio::spawn(async move {
            let mut bytes = Vec::new();
            if let Some(mut pipe) = stderr {
                let _ = pipe.read_to_end(&mut bytes).await;
            }
            String::from_utf8_lossy(&bytes).into_owned()
        });

        let deadline = Instant::now() + self.timeout;
        let secs = self.timeout.as_secs();

        let status = match tokio::time::timeout_at(deadline, child.wait()).await {
            Ok(result) => result?,
            Err(_) => {
                warn!("yt-dlp timed out after {} seconds, killing process", secs);
                let _ = child.kill().await;
                stderr_task.abort();
                return Err(MediaError::Timeout(secs));
            }
        };

        let stderr = match tokio::time::timeout_at(deadline, &mut stderr_task).await {
            Ok(joined) => joined.unwrap_or_default(),
            Err(_) => {
                warn!("yt-dlp exited but its stderr stayed open past {} seconds", secs);
                stderr_task.abort();
                return Err(MediaError::Timeout(secs));
            }
        };
        Ok(ToolOutput::from_status(status, stderr))
    }
}

/// Check if yt-dlp (or the configured binary) is available.
pub fn check_ytdlp(binary: impl AsRef<Path>) -> MediaResult<PathBuf> {
    let binary = binary.as_ref();
    which::which(binary).map_err(|_| MediaError::YtDlpNotFound(binary.display().to_string()))
}
