//! Error types for entsync-facts

use std::path::PathBuf;

/// Result type for entsync-facts operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while collecting facts
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The hardware probe collaborator failed; not recovered here
    #[error("Hardware probe failed: {message}")]
    Probe { message: String },

    /// A custom facts file was readable but not valid JSON
    #[error("Malformed custom facts file {path}: {message}")]
    CustomFacts { path: PathBuf, message: String },

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn probe(message: impl Into<String>) -> Self {
        Self::Probe {
            message: message.into(),
        }
    }
}
