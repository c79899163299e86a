//! Command engine for Terminal 1996.
//!
//! One raw input line and the current [`GameState`](t96_core::GameState)
//! go in; a [`CommandResult`] comes out, carrying output lines and a
//! [`StatePatch`](t96_core::StatePatch). The engine never mutates state:
//! the host applies the patch, which [`Session`] does for interactive use.
//!
//! # Layout
//!
//! - [`parser`] sanitizes and splits input.
//! - [`commands`] holds the handlers, [`dialogue`] the two conversational
//!   responders.
//! - [`pipeline`] runs the side systems after every dispatched command.
//! - [`onboarding`] and [`turing`] own input while they are active.
//! - [`executor`] ties these together; [`stream`] paces output for a
//!   terminal.

/// Command vocabulary and handlers.
pub mod commands;
/// Per-command execution context.
pub mod context;
/// Detection thresholds and delays.
pub mod detection;
/// Prisoner 45 and the neural scout link.
pub mod dialogue;
/// Session errors.
pub mod error;
/// Ending variants.
pub mod endings;
/// Evidence discovery.
pub mod evidence;
/// Top-level execution.
pub mod executor;
/// Guided onboarding.
pub mod onboarding;
/// Output lines and command results.
pub mod output;
/// Input sanitizing and parsing.
pub mod parser;
/// Side systems run after dispatch.
pub mod pipeline;
/// Host-side session.
pub mod session;
/// Paced output with skip.
pub mod stream;
/// The Turing evaluation.
pub mod turing;

#[cfg(test)]
mod testing;

pub use commands::Verb;
pub use context::Ctx;
pub use endings::{Ending, EndingFlags};
pub use error::{EngineError, EngineResult};
pub use executor::{execute, execute_with_tab};
pub use output::{CommandResult, EntryKind, OutputLine, StreamingMode};
pub use parser::{ParsedCommand, parse, sanitize};
pub use session::{HistoryEntry, Session};
pub use stream::{InstantPacer, Pacer, RandomPacer, SkipSignal, StreamOutcome, pause, stream_lines};
