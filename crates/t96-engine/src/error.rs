//! Errors raised by the session host. In-game failures are command output,
//! not errors.

use t96_core::CoreError;
use thiserror::Error;

/// Result type for session operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors raised by [`Session`](crate::session::Session).
#[derive(Debug, Error)]
pub enum EngineError {
    /// Persistence or validation failure from the core crate.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Every save slot is taken.
    #[error("all {0} save slots are in use")]
    SaveSlotsFull(usize),

    /// No save slot with this name.
    #[error("no save slot named '{0}'")]
    SlotNotFound(String),
}
