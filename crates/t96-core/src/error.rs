//! Error types for host-level operations (saves, configuration).
//!
//! In-game failures are never errors: they come back as ordinary
//! command output.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised while loading or validating persisted data.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Malformed JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot written by an incompatible version.
    #[error("unsupported save version {found} (expected {expected})")]
    UnsupportedSaveVersion {
        /// Version found in the snapshot.
        found: u32,
        /// Version this build writes.
        expected: u32,
    },

    /// A mutation names a path that is not a file in the archive.
    #[error("mutation for unknown file: {0}")]
    DanglingMutation(String),

    /// The working directory is not a directory in the archive.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// Configuration out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
