//! Output lines and command results.

use serde::Serialize;
use t96_core::{MediaTrigger, StatePatch};

/// Display category of an output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Ordinary text.
    Output,
    /// Failure text.
    Error,
    /// Caution text.
    Warning,
    /// Terminal chrome.
    System,
    /// Narrative notices.
    Notice,
    /// Echo of player input.
    Input,
    /// File content.
    File,
    /// Commentary from the hacker contact.
    Ufo74,
}

/// A line of output without an identity; the host assigns IDs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputLine {
    /// Display category.
    pub kind: EntryKind,
    /// Text.
    pub content: String,
}

impl OutputLine {
    /// New line.
    pub fn new(kind: EntryKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
        }
    }

    /// Ordinary text.
    pub fn output(content: impl Into<String>) -> Self {
        Self::new(EntryKind::Output, content)
    }

    /// Empty spacer line.
    pub fn blank() -> Self {
        Self::output("")
    }

    /// Failure text.
    pub fn error(content: impl Into<String>) -> Self {
        Self::new(EntryKind::Error, content)
    }

    /// Caution text.
    pub fn warning(content: impl Into<String>) -> Self {
        Self::new(EntryKind::Warning, content)
    }

    /// Terminal chrome.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(EntryKind::System, content)
    }

    /// Narrative notice.
    pub fn notice(content: impl Into<String>) -> Self {
        Self::new(EntryKind::Notice, content)
    }

    /// Input echo.
    pub fn input(content: impl Into<String>) -> Self {
        Self::new(EntryKind::Input, content)
    }

    /// File content.
    pub fn file(content: impl Into<String>) -> Self {
        Self::new(EntryKind::File, content)
    }

    /// Hacker commentary.
    pub fn ufo74(content: impl Into<String>) -> Self {
        Self::new(EntryKind::Ufo74, content)
    }
}

/// Pacing hint for the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamingMode {
    /// Default pacing.
    Normal,
    /// Heavy records.
    Slow,
    /// Long or familiar records.
    Fast,
    /// Irregular pacing for unstable output.
    Glitchy,
    /// No pacing.
    Instant,
}

/// Everything one command produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandResult {
    /// Lines to append to history.
    pub output: Vec<OutputLine>,
    /// State changes to apply.
    pub patch: StatePatch,
    /// Pause before output, in milliseconds.
    pub delay_ms: Option<u64>,
    /// Whether the screen should flicker.
    pub trigger_flicker: bool,
    /// Image to show.
    pub image: Option<MediaTrigger>,
    /// Video to show.
    pub video: Option<MediaTrigger>,
    /// Pacing hint.
    pub streaming_mode: Option<StreamingMode>,
    /// Commentary the host shows after the output finishes.
    pub pending_ufo74: Vec<OutputLine>,
    /// Whether the host should clear its history.
    pub clear_history: bool,
    /// Whether the Turing evaluation just started.
    pub trigger_turing_test: bool,
    /// File the command read or decrypted.
    pub target_file: Option<String>,
}

impl CommandResult {
    /// Result with `output` and no state change.
    pub fn with_output(output: Vec<OutputLine>) -> Self {
        Self {
            output,
            ..Self::default()
        }
    }

    /// Result with `output` and `patch`.
    pub fn with_patch(output: Vec<OutputLine>, patch: StatePatch) -> Self {
        Self {
            output,
            patch,
            ..Self::default()
        }
    }

    /// Add to the output delay.
    pub fn add_delay(&mut self, ms: u64) {
        self.delay_ms = Some(self.delay_ms.unwrap_or(0) + ms);
    }

    /// Whether any error line was produced.
    pub fn has_error(&self) -> bool {
        self.output.iter().any(|l| l.kind == EntryKind::Error)
    }

    /// Whether any line contains `needle`.
    pub fn mentions(&self, needle: &str) -> bool {
        self.output.iter().any(|l| l.content.contains(needle))
    }
}

/// Build a vector of [`OutputLine`]s from `kind => text` pairs.
#[macro_export]
macro_rules! lines {
    ($($kind:ident => $text:expr),* $(,)?) => {
        vec![$($crate::output::OutputLine::$kind($text)),*]
    };
}
