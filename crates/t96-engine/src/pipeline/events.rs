//! One-shot narrative beats. At most one fires per command.

use t96_core::{GameState, StatePatch, flag};

use super::{Stage, Turn};
use crate::output::{CommandResult, OutputLine};
use crate::turing;

/// A narrative beat that fires at most once per run.
#[derive(Debug, Clone, Copy)]
pub struct SingularEvent {
    /// Identifier recorded in the state once fired.
    pub id: &'static str,
    /// Whether the beat fires for this command.
    pub trigger: fn(&GameState, &str, &[String]) -> bool,
    /// The beat itself.
    pub execute: fn(&GameState) -> CommandResult,
}

fn fired(state: &GameState, id: &str) -> bool {
    state.singular_events_triggered.contains(id)
}

fn first_arg(args: &[String]) -> Option<String> {
    args.first().map(|a| a.to_lowercase())
}

fn beat(output: Vec<OutputLine>, patch: StatePatch, delay_ms: u64, flicker: bool) -> CommandResult {
    CommandResult {
        output,
        patch,
        delay_ms: Some(delay_ms),
        trigger_flicker: flicker,
        ..CommandResult::default()
    }
}

/// Ordered beat table; the first trigger that matches wins.
pub const SINGULAR_EVENTS: &[SingularEvent] = &[
    SingularEvent {
        id: "turing_warning",
        trigger: |s, _, _| {
            !s.turing_evaluation_completed && !s.turing_evaluation_active && s.detection_level >= 35 && s.truth_count() >= 1
        },
        execute: |_| {
            beat(
                vec![
                    OutputLine::blank(),
                    OutputLine::ufo74("┌─────────────────────────────────────────────────────────┐"),
                    OutputLine::ufo74("│         >> ENCRYPTED CHANNEL OPEN <<                    │"),
                    OutputLine::ufo74("└─────────────────────────────────────────────────────────┘"),
                    OutputLine::blank(),
                    OutputLine::ufo74("UFO74: heads up. RISK climbing."),
                    OutputLine::ufo74("       at 45-55% theres a TURING EVALUATION."),
                    OutputLine::ufo74("       pick COLD, LOGICAL answers. act like a machine."),
                    OutputLine::blank(),
                    OutputLine::ufo74("┌─────────────────────────────────────────────────────────┐"),
                    OutputLine::ufo74("│         >> ENCRYPTED CHANNEL CLOSED <<                  │"),
                    OutputLine::ufo74("└─────────────────────────────────────────────────────────┘"),
                    OutputLine::blank(),
                ],
                StatePatch::new(),
                500,
                false,
            )
        },
    },
    SingularEvent {
        id: "turing_evaluation",
        trigger: |s, _, _| {
            fired(s, "turing_warning")
                && !s.turing_evaluation_completed
                && !s.turing_evaluation_active
                && s.detection_level >= 45
                && s.truth_count() >= 1
        },
        execute: |_| {
            let mut patch = StatePatch::new();
            patch.turing_evaluation_active = Some(true);
            patch.turing_evaluation_index = Some(0);
            let mut result = beat(turing::opening_lines(), patch, 1500, true);
            result.trigger_turing_test = true;
            result
        },
    },
    SingularEvent {
        id: "the_echo",
        trigger: |s, command, args| {
            matches!(command, "open" | "decrypt")
                && first_arg(args).is_some_and(|p| p.contains("psi") || p.contains("transcript"))
                && s.detection_level >= 40
        },
        execute: |s| {
            let mut patch = StatePatch::new();
            patch.session_stability = Some(s.session_stability.saturating_sub(15));
            patch.system_hostility_level = Some(s.hostility_plus(2));
            beat(
                vec![
                    OutputLine::blank(),
                    OutputLine::error("▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓"),
                    OutputLine::blank(),
                    OutputLine::warning("                    [SIGNAL ECHO DETECTED]"),
                    OutputLine::blank(),
                    OutputLine::output("                    ...we see you seeing..."),
                    OutputLine::blank(),
                    OutputLine::error("▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓"),
                    OutputLine::blank(),
                ],
                patch,
                3000,
                true,
            )
        },
    },
    SingularEvent {
        id: "the_silence",
        trigger: |s, command, args| {
            let place = first_arg(args).unwrap_or_else(|| s.current_path.to_lowercase());
            matches!(command, "cd" | "ls")
                && place.contains("admin")
                && s.detection_level >= 60
                && s.flag(flag::ADMIN_UNLOCKED)
        },
        execute: |s| {
            let mut patch = StatePatch::new();
            patch.detection_level = Some((s.detection_level + 12).min(99).max(s.detection_level));
            patch.system_hostility_level = Some(s.hostility_plus(1));
            let mut output = vec![OutputLine::blank(); 3];
            output.push(OutputLine::system("            ."));
            output.extend(vec![OutputLine::blank(); 3]);
            output.push(OutputLine::system("                              ."));
            output.extend(vec![OutputLine::blank(); 2]);
            output.push(OutputLine::warning("                                              ."));
            output.extend(vec![OutputLine::blank(); 2]);
            output.push(OutputLine::error("SESSION OBSERVATION LEVEL: ELEVATED"));
            output.push(OutputLine::blank());
            beat(output, patch, 5000, true)
        },
    },
    SingularEvent {
        id: "watcher_ack",
        trigger: |s, _, _| s.truth_count() >= 3 && s.detection_level >= 50,
        execute: |s| {
            let mut patch = StatePatch::new();
            patch.system_hostility_level = Some(s.hostility_plus(1));
            beat(
                vec![
                    OutputLine::blank(),
                    OutputLine::error("─────────────────────────────────────────"),
                    OutputLine::blank(),
                    OutputLine::warning("NOTICE: Your inquiry has been noted."),
                    OutputLine::blank(),
                    OutputLine::output("Pattern analysis: SYSTEMATIC"),
                    OutputLine::output("Intent classification: RECONSTRUCTION"),
                    OutputLine::blank(),
                    OutputLine::warning("Observation continues."),
                    OutputLine::blank(),
                    OutputLine::error("─────────────────────────────────────────"),
                    OutputLine::blank(),
                ],
                patch,
                2500,
                true,
            )
        },
    },
    SingularEvent {
        id: "rival_investigator",
        trigger: |s, _, _| s.evidence_links >= 3 && s.detection_level >= 45,
        execute: |s| {
            let mut patch = StatePatch::new();
            patch.rival_investigator_active = Some(true);
            patch.system_hostility_level = Some(s.hostility_plus(1));
            patch.paranoia_level = Some((s.paranoia_level + 20).min(100));
            beat(
                vec![
                    OutputLine::blank(),
                    OutputLine::warning("─────────────────────────────────────────"),
                    OutputLine::warning("NOTICE: Parallel investigation detected"),
                    OutputLine::blank(),
                    OutputLine::output("A competing analyst is pulling records."),
                    OutputLine::output("Chain-of-custody locks engaged on key files."),
                    OutputLine::blank(),
                    OutputLine::warning("Maintain discretion. Expect delays."),
                    OutputLine::warning("─────────────────────────────────────────"),
                    OutputLine::blank(),
                ],
                patch,
                2000,
                true,
            )
        },
    },
];

/// First unfired event whose trigger matches.
pub fn check(state: &GameState, command: &str, args: &[String]) -> Option<&'static SingularEvent> {
    SINGULAR_EVENTS
        .iter()
        .find(|e| !fired(state, e.id) && (e.trigger)(state, command, args))
}

#[derive(Debug)]
pub(super) struct SingularEvents;

impl Stage for SingularEvents {
    fn name(&self) -> &'static str {
        "singular_events"
    }

    fn run(&self, turn: &mut Turn<'_, '_>) {
        let state = turn.after();
        if state.is_game_over {
            return;
        }
        let Some(event) = check(&state, turn.command, turn.args) else {
            return;
        };
        tracing::info!(event = event.id, detection = state.detection_level, "singular_event");

        let outcome = (event.execute)(&state);
        turn.result.output.extend(outcome.output);
        turn.result.patch.merge(outcome.patch);
        turn.result.patch.singular_events.insert(event.id.to_string());
        if let Some(ms) = outcome.delay_ms {
            turn.result.add_delay(ms);
        }
        turn.result.trigger_flicker |= outcome.trigger_flicker;
        turn.result.trigger_turing_test |= outcome.trigger_turing_test;
    }
}
