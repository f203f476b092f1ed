//! Error types for entsync-watch

use std::path::PathBuf;

/// Result type for entsync-watch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while setting up the watcher
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The initial watch could not be registered. Fatal to the watcher;
    /// the host decides whether to restart the worker.
    #[error("Failed to watch {path}: {source}")]
    WatchRegistration {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },
}
