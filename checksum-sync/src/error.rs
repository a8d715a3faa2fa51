//! Error types for checksum-sync.

use std::path::PathBuf;

use thiserror::Error;

use checksum_core::ConfigError;

/// All errors that can arise from a checksum run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// An error from configuration validation.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input stream could not be read to the end while digesting it.
    #[error("trouble creating checksum for {path}: {source}")]
    Hash {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The output location exists but is not a directory.
    #[error("output path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// JSON serialization/deserialization error (run state).
    #[error("run state JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
