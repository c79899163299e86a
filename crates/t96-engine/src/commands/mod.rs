//! Command vocabulary and dispatch.
//!
//! Every handler maps `(args, state, ctx)` to a [`CommandResult`] and never
//! touches the state directly.

mod crypto;
mod endgame;
mod navigation;
mod notes;
mod puzzles;
mod reading;
mod system;
/// Tips and penalties for unrecognised input.
pub mod tips;

use t96_core::GameState;
use t96_core::fs::path::resolve_path;

use crate::context::Ctx;
use crate::output::CommandResult;

pub use crypto::{answer_pending_decrypt, perform_decryption};
pub use endgame::DISCONNECT_REASON;

/// A recognised command word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    /// List commands.
    Help,
    /// Show session status.
    Status,
    /// List a directory.
    Ls,
    /// Change directory.
    Cd,
    /// Return to the previous directory.
    Back,
    /// Show the directory tree.
    Tree,
    /// Read a file.
    Open,
    /// Re-read the last file.
    Last,
    /// Decrypt a file.
    Decrypt,
    /// Repair a corrupted file.
    Recover,
    /// Trace the system.
    Trace,
    /// Enter an administrative override.
    Override,
    /// Talk to Prisoner 45.
    Chat,
    /// Query the neural link.
    Link,
    /// Run a reconstruction script.
    Script,
    /// Answer the morse puzzle.
    Message,
    /// Lie low.
    Wait,
    /// Emergency disconnect.
    Hide,
    /// Save a note.
    Note,
    /// List notes.
    Notes,
    /// Toggle or list bookmarks.
    Bookmark,
    /// List unread files.
    Unread,
    /// Show case progress.
    Progress,
    /// Show evidence per category.
    Map,
    /// Leak the evidence.
    Leak,
    /// Run an operator script.
    Run,
    /// Toggle tips or replay the onboarding.
    Tutorial,
    /// Sever the connection.
    Disconnect,
    /// Deep scan for masked nodes.
    Scan,
    /// Decode an intercepted cipher.
    Decode,
    /// Request a save.
    Save,
    /// Clear the screen.
    Clear,
}

impl Verb {
    /// Every verb, in help order.
    pub const ALL: [Verb; 32] = [
        Verb::Help,
        Verb::Status,
        Verb::Ls,
        Verb::Cd,
        Verb::Back,
        Verb::Tree,
        Verb::Open,
        Verb::Last,
        Verb::Decrypt,
        Verb::Recover,
        Verb::Trace,
        Verb::Override,
        Verb::Chat,
        Verb::Link,
        Verb::Script,
        Verb::Message,
        Verb::Wait,
        Verb::Hide,
        Verb::Note,
        Verb::Notes,
        Verb::Bookmark,
        Verb::Unread,
        Verb::Progress,
        Verb::Map,
        Verb::Leak,
        Verb::Run,
        Verb::Tutorial,
        Verb::Disconnect,
        Verb::Scan,
        Verb::Decode,
        Verb::Save,
        Verb::Clear,
    ];

    /// Look up a lowercased command word.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "morse" => Some(Self::Message),
            other => Self::ALL.into_iter().find(|v| v.name() == other),
        }
    }

    /// Command word.
    pub fn name(self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::Status => "status",
            Self::Ls => "ls",
            Self::Cd => "cd",
            Self::Back => "back",
            Self::Tree => "tree",
            Self::Open => "open",
            Self::Last => "last",
            Self::Decrypt => "decrypt",
            Self::Recover => "recover",
            Self::Trace => "trace",
            Self::Override => "override",
            Self::Chat => "chat",
            Self::Link => "link",
            Self::Script => "script",
            Self::Message => "message",
            Self::Wait => "wait",
            Self::Hide => "hide",
            Self::Note => "note",
            Self::Notes => "notes",
            Self::Bookmark => "bookmark",
            Self::Unread => "unread",
            Self::Progress => "progress",
            Self::Map => "map",
            Self::Leak => "leak",
            Self::Run => "run",
            Self::Tutorial => "tutorial",
            Self::Disconnect => "disconnect",
            Self::Scan => "scan",
            Self::Decode => "decode",
            Self::Save => "save",
            Self::Clear => "clear",
        }
    }

    /// Usage line.
    pub fn usage(self) -> &'static str {
        match self {
            Self::Help => "help [command]",
            Self::Status => "status",
            Self::Ls => "ls [-l]",
            Self::Cd => "cd <directory>",
            Self::Back => "back",
            Self::Tree => "tree",
            Self::Open => "open <filename>",
            Self::Last => "last",
            Self::Decrypt => "decrypt <filename>",
            Self::Recover => "recover <filename>",
            Self::Trace => "trace",
            Self::Override => "override protocol <CODE>",
            Self::Chat => "chat [message]",
            Self::Link => "link [query]",
            Self::Script => "script <commands>",
            Self::Message => "message <answer>",
            Self::Wait => "wait",
            Self::Hide => "hide",
            Self::Note => "note <text>",
            Self::Notes => "notes",
            Self::Bookmark => "bookmark [filename]",
            Self::Unread => "unread",
            Self::Progress => "progress",
            Self::Map => "map",
            Self::Leak => "leak [all]",
            Self::Run => "run <script>",
            Self::Tutorial => "tutorial [on|off]",
            Self::Disconnect => "disconnect",
            Self::Scan => "scan",
            Self::Decode => "decode <text>",
            Self::Save => "save",
            Self::Clear => "clear",
        }
    }

    /// One-line description.
    pub fn summary(self) -> &'static str {
        match self {
            Self::Help => "Show available commands",
            Self::Status => "Show session status",
            Self::Ls => "List directory contents",
            Self::Cd => "Change directory",
            Self::Back => "Return to previous directory",
            Self::Tree => "Show directory structure",
            Self::Open => "Open and read a file",
            Self::Last => "Re-read the last opened file",
            Self::Decrypt => "Attempt to decrypt an encrypted file",
            Self::Recover => "Attempt to recover corrupted data",
            Self::Trace => "Trace system connections",
            Self::Override => "Administrative override",
            Self::Chat => "Open a channel to a detained subject",
            Self::Link => "Query a preserved neural pattern",
            Self::Script => "Run a reconstruction script",
            Self::Message => "Submit a deciphered transmission",
            Self::Wait => "Lie low to reduce detection",
            Self::Hide => "Emergency evasion",
            Self::Note => "Save a personal note",
            Self::Notes => "List your notes",
            Self::Bookmark => "Bookmark a file",
            Self::Unread => "List files not yet read",
            Self::Progress => "Show investigation progress",
            Self::Map => "Show evidence by category",
            Self::Leak => "Leak the collected evidence",
            Self::Run => "Run an operator script",
            Self::Tutorial => "Toggle tips or replay the tutorial",
            Self::Disconnect => "Sever the connection",
            Self::Scan => "Deep scan for masked nodes",
            Self::Decode => "Decode an intercepted cipher",
            Self::Save => "Request a session save",
            Self::Clear => "Clear the screen",
        }
    }

    /// Whether `help` lists the verb.
    pub fn listed(self) -> bool {
        !matches!(self, Self::Hide | Self::Link | Self::Script | Self::Message) && !self.is_hidden()
    }

    /// Legacy utilities that only exist once a file has named them.
    pub fn is_hidden(self) -> bool {
        matches!(self, Self::Disconnect | Self::Scan | Self::Decode)
    }

    /// Whether the verb dispatches in `state`. Undiscovered legacy
    /// utilities are treated as unknown words.
    pub fn available(self, state: &GameState) -> bool {
        !self.is_hidden() || state.hidden_commands_discovered.contains(self.name())
    }
}

/// Resolve a file argument, falling back to a single close match in the
/// target directory. Also returns suggestions when nothing matched.
pub(crate) fn resolve_target(target: &str, state: &GameState, ctx: &Ctx<'_>) -> (String, Vec<String>) {
    let direct = resolve_path(target, &state.current_path);
    if ctx.fs.get_node(&direct, state).is_some() {
        return (direct, Vec::new());
    }
    let resolution = ctx.fs.smart_resolve_path(target, &state.current_path, state);
    (resolution.resolved_path, resolution.suggestions)
}

/// Run the handler for `verb`.
pub fn dispatch(verb: Verb, args: &[String], state: &GameState, ctx: &mut Ctx<'_>) -> CommandResult {
    match verb {
        Verb::Help => system::help(args, state),
        Verb::Status => system::status(state),
        Verb::Ls => navigation::ls(args, state, ctx),
        Verb::Cd => navigation::cd(args, state, ctx),
        Verb::Back => navigation::back(state, ctx),
        Verb::Tree => navigation::tree(state, ctx),
        Verb::Open => reading::open(args, state, ctx),
        Verb::Last => reading::last(state, ctx),
        Verb::Decrypt => crypto::decrypt(args, state, ctx),
        Verb::Recover => crypto::recover(args, state, ctx),
        Verb::Trace => system::trace(state, ctx),
        Verb::Override => system::override_protocol(args, state, ctx),
        Verb::Chat => crate::dialogue::prisoner::chat(args, state, ctx),
        Verb::Link => crate::dialogue::scout::link(args, state, ctx),
        Verb::Script => puzzles::script(args, state),
        Verb::Message => puzzles::message(args, state),
        Verb::Wait => system::wait(state),
        Verb::Hide => system::hide(state),
        Verb::Note => notes::note(args, state, ctx),
        Verb::Notes => notes::notes(state),
        Verb::Bookmark => reading::bookmark(args, state, ctx),
        Verb::Unread => reading::unread(state, ctx),
        Verb::Progress => system::progress(state),
        Verb::Map => endgame::map(state),
        Verb::Leak => endgame::leak(args, state),
        Verb::Run => endgame::run(args, state),
        Verb::Tutorial => endgame::tutorial(args),
        Verb::Disconnect => endgame::disconnect(state),
        Verb::Scan => endgame::scan(state),
        Verb::Decode => endgame::decode(args, state),
        Verb::Save => system::save(),
        Verb::Clear => CommandResult {
            clear_history: true,
            ..CommandResult::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for verb in Verb::ALL {
            assert_eq!(Verb::from_name(verb.name()), Some(verb));
        }
        assert_eq!(Verb::from_name("morse"), Some(Verb::Message));
        assert_eq!(Verb::from_name("cat"), None);
        assert_eq!(Verb::from_name("LS"), None);
    }

    #[test]
    fn legacy_utilities_need_discovery() {
        let mut state = GameState::without_tutorial(1);
        assert!(!Verb::Scan.available(&state));
        assert!(Verb::Leak.available(&state));
        state.hidden_commands_discovered.insert("scan".into());
        assert!(Verb::Scan.available(&state));
        assert!(!Verb::Scan.listed());
    }
}
