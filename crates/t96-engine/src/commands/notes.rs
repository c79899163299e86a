//! Player notes.

use chrono::DateTime;
use t96_core::{GameState, PlayerNote};

use crate::context::Ctx;
use crate::output::{CommandResult, OutputLine};

fn clock(timestamp: i64) -> String {
    DateTime::from_timestamp_millis(timestamp).map_or_else(|| "--:--".to_string(), |t| t.format("%H:%M").to_string())
}

/// `note <text>`: append a timestamped note.
pub(super) fn note(args: &[String], state: &GameState, ctx: &mut Ctx<'_>) -> CommandResult {
    let text = args.join(" ");
    let text = text.trim();
    if text.is_empty() {
        return CommandResult::with_output(vec![
            OutputLine::error("ERROR: Specify note text"),
            OutputLine::blank(),
            OutputLine::system("Usage: note <text>"),
        ]);
    }
    if state.player_notes.len() >= ctx.limits.max_player_notes {
        return CommandResult::with_output(vec![
            OutputLine::error("ERROR: Note storage full"),
            OutputLine::system(format!("Maximum of {} notes reached.", ctx.limits.max_player_notes)),
        ]);
    }

    let mut notes = state.player_notes.clone();
    notes.push(PlayerNote {
        note: text.to_string(),
        timestamp: i64::try_from(ctx.now_ms).unwrap_or(i64::MAX),
    });
    let total = notes.len();
    let mut result = CommandResult::with_output(vec![
        OutputLine::system(format!("Note saved: \"{text}\"")),
        OutputLine::system(format!("[{total} note{} total - use \"notes\" to view]", if total == 1 { "" } else { "s" })),
    ]);
    result.patch.player_notes = Some(notes);
    result
}

/// `notes`: list saved notes.
pub(super) fn notes(state: &GameState) -> CommandResult {
    if state.player_notes.is_empty() {
        return CommandResult::with_output(vec![
            OutputLine::system("No notes saved yet."),
            OutputLine::system("Use \"note <text>\" to save a note."),
        ]);
    }
    let mut output = vec![
        OutputLine::blank(),
        OutputLine::system("╔═══════════════════════════════════════════════════════╗"),
        OutputLine::system("║                    YOUR NOTES                         ║"),
        OutputLine::system("╚═══════════════════════════════════════════════════════╝"),
        OutputLine::blank(),
    ];
    output.extend(
        state
            .player_notes
            .iter()
            .enumerate()
            .map(|(i, n)| OutputLine::output(format!("  [{}] {} - {}", i + 1, clock(n.timestamp), n.note))),
    );
    output.push(OutputLine::blank());
    CommandResult::with_output(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{args, playing, run_at};

    #[test]
    fn note_appends_with_timestamp() {
        let state = playing();
        let result = run_at(&state, 3_600_000, |s, c| note(&args(&["check", "liaison"]), s, c));
        assert!(result.mentions("Note saved: \"check liaison\""));
        assert!(result.mentions("[1 note total"));
        let saved = result.patch.player_notes.unwrap_or_default();
        assert_eq!(saved[0].timestamp, 3_600_000);

        let mut next = state;
        next.player_notes = saved;
        let listed = notes(&next);
        assert!(listed.mentions("[1] 01:00 - check liaison"));
    }

    #[test]
    fn empty_note_rejected() {
        let result = run_at(&playing(), 0, |s, c| note(&args(&["  "]), s, c));
        assert!(result.mentions("Specify note text"));
        assert!(result.patch.is_empty());
    }

    #[test]
    fn notes_are_capped() {
        let mut state = playing();
        state.player_notes = (0..50)
            .map(|i| PlayerNote {
                note: format!("n{i}"),
                timestamp: 0,
            })
            .collect();
        let result = run_at(&state, 0, |s, c| note(&args(&["one more"]), s, c));
        assert!(result.mentions("Note storage full"));
        assert!(result.patch.player_notes.is_none());
    }

    #[test]
    fn no_notes_message() {
        assert!(notes(&playing()).mentions("No notes saved yet"));
    }
}
