//! Error types for entsync-core

use std::path::PathBuf;

/// Result type for entsync-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while orchestrating the update pipeline
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A pipeline stage could not complete its update
    #[error("Stage {stage} failed: {message}")]
    Stage { stage: String, message: String },

    /// The pipeline lock could not be acquired
    #[error("Lock acquisition failed for {path}")]
    LockFailed { path: PathBuf },

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// TOML deserialization error
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),
}

impl Error {
    pub fn stage(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Stage {
            stage: stage.into(),
            message: message.into(),
        }
    }
}
