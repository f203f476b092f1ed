//! Reader for the last-pushed facts cache
//!
//! The cache file holds the fact set most recently accepted by the
//! entitlement service. It is written by the sync-completion side after a
//! successful push; this crate only ever reads it.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::store::FactSet;

/// Handle to the facts cache file.
#[derive(Debug, Clone)]
pub struct CacheFile {
    path: PathBuf,
}

impl CacheFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The last pushed fact set, or `None` when the file is absent,
    /// unreadable, or unparseable. An absent cache is the normal state
    /// before the first successful push, so none of these are errors.
    pub fn read(&self) -> Option<FactSet> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::debug!(
                        "Facts cache {} is unreadable: {}",
                        self.path.display(),
                        e
                    );
                }
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(facts) => Some(facts),
            Err(e) => {
                tracing::debug!(
                    "Ignoring unparseable facts cache {}: {}",
                    self.path.display(),
                    e
                );
                None
            }
        }
    }

    /// Modification time of the cache file, which doubles as the time of
    /// the last successful push. `None` when the file does not exist.
    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        let modified = fs::metadata(&self.path).ok()?.modified().ok()?;
        Some(DateTime::<Utc>::from(modified))
    }
}
