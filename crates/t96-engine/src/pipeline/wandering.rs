//! Nudges for a player who has stopped making progress.

use t96_core::GameState;

use super::{Stage, Turn};
use crate::output::OutputLine;

/// Commands before wandering is tracked at all.
pub const GRACE_COMMANDS: u32 = 15;
/// Nudges per run.
pub const MAX_NUDGES: u32 = 3;
/// Idle commands before the first nudge; each nudge adds [`THRESHOLD_STEP`].
pub const BASE_THRESHOLD: u32 = 8;
/// Growth of the idle threshold per nudge shown.
pub const THRESHOLD_STEP: u32 = 5;

fn channel(body: Vec<OutputLine>) -> Vec<OutputLine> {
    let mut out = vec![
        OutputLine::system(""),
        OutputLine::ufo74("┌─────────────────────────────────────────────────────────┐"),
        OutputLine::ufo74("│         >> ENCRYPTED CHANNEL OPEN <<                    │"),
        OutputLine::ufo74("└─────────────────────────────────────────────────────────┘"),
        OutputLine::system(""),
    ];
    out.extend(body);
    out.extend([
        OutputLine::system(""),
        OutputLine::ufo74("┌─────────────────────────────────────────────────────────┐"),
        OutputLine::ufo74("│         >> ENCRYPTED CHANNEL CLOSED <<                  │"),
        OutputLine::ufo74("└─────────────────────────────────────────────────────────┘"),
        OutputLine::system(""),
    ]);
    out
}

fn read_under(state: &GameState, dir: &str) -> bool {
    state.files_read.iter().any(|p| p.contains(dir))
}

/// Hint pointing at the first area the player has neglected.
pub fn exploration_hint(state: &GameState) -> &'static str {
    use t96_core::TruthCategory::{BeingContainment, DebrisRelocation, TelepathicScouts};
    let truths = &state.truths_discovered;
    if !read_under(state, "/storage/") && !truths.contains(&DebrisRelocation) {
        "check /storage/ for transport logs."
    } else if !read_under(state, "/ops/") && !truths.contains(&BeingContainment) {
        "/ops/ has quarantine records."
    } else if !read_under(state, "/comms/") && !truths.contains(&TelepathicScouts) {
        "/comms/psi/ has weird signal stuff."
    } else if state.prisoner45_questions_asked == 0 {
        "try \"chat\". someones in here."
    } else if !read_under(state, "/admin/") && state.truth_count() >= 2 && state.access_level >= 3 {
        "you have clearance. check /admin/."
    } else {
        "READ the files. \"open <filename>\"."
    }
}

/// Nudge number `level` (0, 1 or 2).
pub fn nudge(level: u32, state: &GameState) -> Vec<OutputLine> {
    match level {
        0 => channel(vec![
            OutputLine::ufo74("UFO74: hey. need a hint?"),
            OutputLine::ufo74(format!("UFO74: {}", exploration_hint(state))),
        ]),
        1 => channel(vec![
            OutputLine::ufo74("UFO74: look for evidence in:"),
            OutputLine::output("       /storage/, /ops/quarantine/, /comms/"),
            OutputLine::ufo74("UFO74: read files. connect dots."),
        ]),
        _ => channel(vec![
            OutputLine::ufo74("UFO74: last hint:"),
            OutputLine::output("       1. cd <directory>"),
            OutputLine::output("       2. ls"),
            OutputLine::output("       3. open <filename>"),
            OutputLine::ufo74("UFO74: january 96. find the pieces."),
        ]),
    }
}

#[derive(Debug)]
pub(super) struct Wandering;

impl Stage for Wandering {
    fn name(&self) -> &'static str {
        "wandering"
    }

    fn run(&self, turn: &mut Turn<'_, '_>) {
        let before = turn.before;
        let after = turn.after();
        let count = before.session_command_count;
        let meaningful = (turn.is(&["open", "decrypt"]) && !turn.failed())
            || after.truth_count() > before.truth_count()
            || after.access_level > before.access_level;

        if meaningful {
            turn.result.patch.last_meaningful_action = Some(count);
            return;
        }
        if count < GRACE_COMMANDS || before.wandering_notice_count >= MAX_NUDGES || after.is_game_over {
            return;
        }

        let shown = before.wandering_notice_count;
        let idle = count.saturating_sub(before.last_meaningful_action);
        if idle < BASE_THRESHOLD + shown * THRESHOLD_STEP {
            return;
        }
        tracing::info!(idle, nudge = shown + 1, "wandering_nudge");
        turn.result.output.extend(nudge(shown.min(2), &after));
        turn.result.patch.wandering_notice_count = Some(shown + 1);
        turn.result.patch.last_meaningful_action = Some(count);
    }
}
