//! Core types for Terminal 1996: the game state, the seeded random
//! number generator, and the gated virtual filesystem.
//!
//! This crate has no notion of commands. It defines the data the command
//! engine reads and the partial updates it produces, plus the persisted
//! form of a run.

/// Limits and engine configuration.
pub mod config;
/// Error types used throughout the crate.
pub mod error;
/// The gated virtual filesystem and the authored archive.
pub mod fs;
/// Partial state updates.
pub mod patch;
/// Seeded deterministic random number generation.
pub mod rng;
/// Versioned save snapshots.
pub mod save;
/// The per-run game state record.
pub mod state;
/// Evidence categories.
pub mod truth;

/// Re-export configuration types.
pub use config::{EngineConfig, Limits, SAVE_VERSION};
/// Re-export error types.
pub use error::{CoreError, CoreResult};
/// Re-export filesystem types.
pub use fs::{AccessDenied, DirEntry, EntryType, FileNode, FileStatus, FileSystem, MediaTrigger};
/// Re-export the state patch.
pub use patch::StatePatch;
/// Re-export the generator.
pub use rng::{Mulberry32, generate_seed};
/// Re-export save types.
pub use save::SaveSnapshot;
/// Re-export state types.
pub use state::{FileMutation, Flags, GameState, PlayerNote, TutorialState, TutorialStep, flag};
/// Re-export truth categories.
pub use truth::{TRUTH_COUNT, TruthCategory};
