//! Single-flight run lock.
//!
//! An advisory exclusive lock on a file keeps overlapping scheduled runs from
//! working the same queue. The OS drops the lock when the holder exits, so a
//! killed run never leaves a stale lock behind.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::{debug, warn};

use crate::error::{WorkerError, WorkerResult};

/// Held run lock; released on drop.
#[derive(Debug)]
pub struct RunLock {
    file: File,
    path: PathBuf,
}

impl RunLock {
    /// Try to take the lock without waiting.
    ///
    /// Returns `Ok(None)` when another process holds it.
    pub fn try_acquire(path: impl AsRef<Path>) -> WorkerResult<Option<Self>> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                WorkerError::lock_failed(format!(
                    "cannot create lock directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| {
                WorkerError::lock_failed(format!("cannot open {}: {}", path.display(), e))
            })?;

        match file.try_lock_exclusive() {
            Ok(()) => {}
            Err(e) if e.kind() == fs2::lock_contended_error().kind() => {
                debug!(path = %path.display(), "Run lock held by another process");
                return Ok(None);
            }
            Err(e) => {
                return Err(WorkerError::lock_failed(format!(
                    "cannot lock {}: {}",
                    path.display(),
                    e
                )))
            }
        }

        // Holder pid, for operators inspecting a stuck lock
        if let Err(e) = file
            .set_len(0)
            .and_then(|()| file.write_all(std::process::id().to_string().as_bytes()))
        {
            warn!(path = %path.display(), error = %e, "Failed to record pid in run lock");
        }

        Ok(Some(Self {
            file,
            path: path.to_path_buf(),
        }))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            warn!(path = %self.path.display(), error = %e, "Failed to release run lock");
        }
    }
}
