//! Counting exclusive lock guarding the update pipeline
//!
//! The whole multi-stage update must run under exactly one acquisition,
//! and the lock has to come free on every exit path, including a stage
//! failure mid-pipeline. Acquisition therefore hands out an RAII
//! [`LockGuard`]; dropping the guard releases one acquisition.
//!
//! The lock is backed by an `fs2` advisory file lock so that separate
//! processes (the cron-driven updater and an on-demand invocation, say)
//! exclude each other, not just threads of one process. Re-acquiring from
//! a process that already holds the lock increments a depth counter
//! instead of deadlocking on the file lock; the file lock is dropped when
//! the outermost guard goes away.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use fs2::FileExt;

use crate::{Error, Result};

/// Counting mutual-exclusion handle for the update pipeline.
pub struct ActionLock {
    path: PathBuf,
    state: Mutex<LockState>,
}

#[derive(Default)]
struct LockState {
    file: Option<File>,
    depth: u32,
}

impl ActionLock {
    /// Create a lock handle over the given lock file path. The file is not
    /// touched until the first acquisition.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            state: Mutex::new(LockState::default()),
        }
    }

    /// Path of the underlying lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Acquire the lock, blocking until the file lock is available when
    /// another process holds it. Nested acquisition from a holder only
    /// bumps the depth counter.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock file cannot be created or the advisory
    /// lock cannot be taken.
    pub fn acquire(&self) -> Result<LockGuard<'_>> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        if state.depth == 0 {
            if let Some(parent) = self.path.parent()
                && !parent.exists()
            {
                fs::create_dir_all(parent)?;
            }

            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&self.path)?;

            file.lock_exclusive().map_err(|_| Error::LockFailed {
                path: self.path.clone(),
            })?;

            // Record the holder pid for operators inspecting a stuck lock.
            let _ = write!(file, "{}", std::process::id());

            state.file = Some(file);
        }

        state.depth += 1;
        Ok(LockGuard { lock: self })
    }

    /// Current acquisition depth. Zero means the file lock is not held.
    pub fn depth(&self) -> u32 {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).depth
    }

    fn release(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.depth = state.depth.saturating_sub(1);

        if state.depth == 0
            && let Some(file) = state.file.take()
            && let Err(e) = FileExt::unlock(&file)
        {
            tracing::debug!("Failed to release lock {}: {}", self.path.display(), e);
        }
    }
}

/// RAII handle for one acquisition of an [`ActionLock`].
pub struct LockGuard<'a> {
    lock: &'a ActionLock,
}

impl Drop for LockGuard<'_> {
    fn drop(&mut self) {
        self.lock.release();
    }
}
