//! Top-level command execution: one raw input line against one state.
//!
//! Pre-emptive modes are checked in a fixed order before normal dispatch:
//! onboarding, the terminal state, the purge countdown, a pending decrypt
//! answer, the hard stop and the Turing evaluation. Only dispatched
//! commands go through the full [`pipeline`](crate::pipeline).

use t96_core::state::{HARD_STOP_ATTEMPTS, MAX_DETECTION};
use t96_core::{FileSystem, GameState, Limits, StatePatch};

use crate::commands::{self, Verb, tips};
use crate::context::Ctx;
use crate::output::{CommandResult, OutputLine};
use crate::{onboarding, parser, pipeline, turing};

fn terminated() -> CommandResult {
    CommandResult::with_output(vec![OutputLine::error("SESSION TERMINATED")])
}

fn purge() -> CommandResult {
    let bar = "▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓";
    let mut result = CommandResult::with_output(vec![
        OutputLine::error(""),
        OutputLine::error(bar),
        OutputLine::error(""),
        OutputLine::error("                    PURGE PROTOCOL COMPLETE"),
        OutputLine::error(""),
        OutputLine::warning("          You saw what you should not have seen."),
        OutputLine::warning("          The knowledge is yours to keep."),
        OutputLine::warning("          But this session is now closed."),
        OutputLine::error(""),
        OutputLine::error(bar),
        OutputLine::error(""),
    ]);
    result.patch.game_over("PURGE PROTOCOL - FORBIDDEN KNOWLEDGE");
    result.patch.session_doom_countdown = Some(0);
    result.trigger_flicker = true;
    result.delay_ms = Some(3000);
    result
}

fn hard_stop() -> CommandResult {
    let mut result = CommandResult::with_output(vec![
        OutputLine::error("SYSTEM LOCKDOWN"),
        OutputLine::error("NO FURTHER COMMANDS ACCEPTED"),
    ]);
    result.patch.game_over("LOCKDOWN");
    result
}

/// Layer the pre-dispatch patch under `result` and thread the RNG state.
fn finish(tick: StatePatch, mut result: CommandResult, ctx: Ctx<'_>) -> CommandResult {
    let mut patch = tick;
    patch.merge(std::mem::take(&mut result.patch));
    if let Some(next) = ctx.rolls.finish() {
        patch.rng_state = Some(next);
    }
    if let Some(detection) = patch.detection_level.as_mut() {
        *detection = (*detection).min(MAX_DETECTION);
    }
    result.patch = patch;
    result
}

/// Execute one raw input line.
pub fn execute(input: &str, state: &GameState, fs: &FileSystem, limits: &Limits, now_ms: u64) -> CommandResult {
    execute_with_tab(input, state, fs, limits, now_ms, false)
}

/// Execute one raw input line, noting whether the host completed it with
/// the tab key.
pub fn execute_with_tab(
    input: &str,
    state: &GameState,
    fs: &FileSystem,
    limits: &Limits,
    now_ms: u64,
    tab_pressed: bool,
) -> CommandResult {
    let sanitized = parser::sanitize(input, limits.max_input_length);
    if sanitized.was_truncated {
        tracing::debug!(max = limits.max_input_length, "input_truncated");
    }
    let line = sanitized.value.as_str();

    if state.in_onboarding() {
        return onboarding::handle_input(line, state, tab_pressed);
    }
    if state.is_game_over {
        return terminated();
    }

    let mut tick = StatePatch::new();
    let working = if state.terrible_mistake_triggered && state.session_doom_countdown > 0 {
        let remaining = state.session_doom_countdown - 1;
        if remaining == 0 {
            tracing::warn!("purge_complete");
            return purge();
        }
        tick.session_doom_countdown = Some(remaining);
        tick.apply_to(state)
    } else {
        state.clone()
    };
    let mut ctx = Ctx::new(fs, limits, now_ms, working.rng_state);

    if working.pending_decrypt_file.is_some() {
        match commands::answer_pending_decrypt(line, &working, &mut ctx) {
            Some(result) => {
                let result = pipeline::run_endings("decrypt", &working, result, &mut ctx);
                return finish(tick, result, ctx);
            }
            None => tick.pending_decrypt_file = Some(None),
        }
    }

    if working.legacy_alert_counter >= HARD_STOP_ATTEMPTS {
        tracing::warn!(alerts = working.legacy_alert_counter, "hard_stop");
        return finish(tick, hard_stop(), ctx);
    }

    if working.turing_evaluation_active {
        return finish(tick, turing::answer(line, &working), ctx);
    }

    let parsed = parser::parse(line);
    if parsed.is_empty() {
        return CommandResult::default();
    }

    let Some(verb) = Verb::from_name(&parsed.command).filter(|v| v.available(&working)) else {
        tracing::debug!(command = %parsed.command, "unknown_command");
        let result = tips::unknown_command(&parsed.command, &parsed.args, &working);
        let result = pipeline::run_endings(&parsed.command, &working, result, &mut ctx);
        return finish(tick, result, ctx);
    };

    let handled = commands::dispatch(verb, &parsed.args, &working, &mut ctx);
    let result = pipeline::run(verb.name(), &parsed.args, &working, handled, &mut ctx);
    let result = finish(tick, result, ctx);
    tracing::debug!(
        command = verb.name(),
        detection_before = state.detection_level,
        detection_after = result.patch.detection_level.unwrap_or(state.detection_level),
        "command_executed"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use t96_core::TruthCategory;

    fn exec(input: &str, state: &GameState) -> (CommandResult, GameState) {
        let result = execute(input, state, FileSystem::standard(), &Limits::default(), 0);
        let next = result.patch.apply_to(state);
        (result, next)
    }

    fn playing() -> GameState {
        GameState::without_tutorial(1)
    }

    #[test]
    fn eight_invalid_commands_lock_down_on_the_eighth() {
        let mut state = playing();
        for attempt in 1..=8u32 {
            let (result, next) = exec("xyzzy", &state);
            assert_eq!(next.legacy_alert_counter, attempt);
            let reason = next.game_over_reason.clone().unwrap_or_default();
            if attempt < 8 {
                assert!(!next.is_game_over, "ended early on attempt {attempt}");
            } else {
                assert!(next.is_game_over);
                assert!(reason.contains("THRESHOLD"));
                assert!(result.mentions("SESSION TERMINATED"));
            }
            state = next;
        }
        let (after, _) = exec("ls", &state);
        assert_eq!(after.output[0].content, "SESSION TERMINATED");
    }

    #[test]
    fn failed_open_can_reach_the_alert_threshold() {
        let mut state = playing();
        state.legacy_alert_counter = 7;
        let (result, next) = exec("open no_such_file.txt", &state);
        assert_eq!(next.legacy_alert_counter, 8);
        assert!(next.is_game_over);
        assert_eq!(next.game_over_reason.as_deref(), Some(pipeline::ALERT_THRESHOLD_REASON));
        assert!(result.mentions("SESSION TERMINATED"));
    }

    #[test]
    fn legacy_utilities_answer_only_after_the_maintenance_notes() {
        let state = playing();
        let (unknown, state) = exec("scan", &state);
        assert!(unknown.mentions("Command not recognized: scan"));
        assert_eq!(state.legacy_alert_counter, 1);
        assert!(!state.flag(t96_core::flag::ADMIN_UNLOCKED));

        let (_, state) = exec("open /internal/admin/maintenance_notes.txt", &state);
        let (scanned, state) = exec("scan", &state);
        assert!(scanned.mentions("DEEP SCAN INITIATED"));
        assert_eq!(state.legacy_alert_counter, 1);
        assert!(state.flag(t96_core::flag::ADMIN_UNLOCKED));
    }

    #[test]
    fn leak_with_full_evidence_ends_with_a_variant() {
        let mut state = playing();
        state.truths_discovered.extend(TruthCategory::ALL);
        state.flags.set(t96_core::flag::ALL_EVIDENCE_COLLECTED, true);
        state.flags.set(t96_core::flag::NEURAL_LINK_AUTHENTICATED, true);
        let (result, next) = exec("leak", &state);
        assert!(result.mentions("THE WORLD AFTER"));
        assert!(next.is_game_over);
        assert_eq!(next.game_over_reason.as_deref(), Some("ENDING: PERSONAL CONTAMINATION"));
        let (after, _) = exec("ls", &next);
        assert_eq!(after.output[0].content, "SESSION TERMINATED");
    }

    #[test]
    fn decrypt_wrong_answer_then_right_one() {
        let mut state = playing();
        state.current_path = "/comms/psi".into();
        let (prompt, state) = exec("decrypt transcript_core.enc", &state);
        assert!(prompt.mentions("DECRYPTION AUTHENTICATION REQUIRED"));
        assert_eq!(state.pending_decrypt_file.as_deref(), Some("/comms/psi/transcript_core.enc"));

        let (wrong, state) = exec("roswell", &state);
        assert!(wrong.mentions("AUTHENTICATION FAILED"));
        assert_eq!(state.pending_decrypt_file.as_deref(), Some("/comms/psi/transcript_core.enc"));
        assert_eq!(state.legacy_alert_counter, 1);

        let (right, state) = exec("VARGINHA1996", &state);
        assert!(!right.mentions("AUTHENTICATION FAILED"));
        assert_eq!(state.pending_decrypt_file, None);
        assert!(state.mutation("/comms/psi/transcript_core.enc").is_some_and(|m| m.decrypted));
        assert!(state.truths_discovered.contains(&TruthCategory::TelepathicScouts));
    }

    #[test]
    fn override_branch_is_reproducible() {
        let mut state = playing();
        state.detection_level = 92;
        state.truths_discovered = TruthCategory::ALL.into_iter().take(2).collect();
        let (a, _) = exec("override protocol COLHEITA", &state);
        let (b, _) = exec("override protocol colheita", &state);
        assert_eq!(a.patch.terrible_mistake_triggered, b.patch.terrible_mistake_triggered);
        assert_eq!(a.output, b.output);
        assert!(a.patch.rng_state.is_some());
    }

    #[test]
    fn detection_ceiling_ends_any_path() {
        let mut state = playing();
        state.detection_level = 99;
        let (result, next) = exec("xyzzy", &state);
        assert_eq!(next.detection_level, 100);
        assert!(next.is_game_over);
        assert_eq!(next.game_over_reason.as_deref(), Some("INTRUSION DETECTED - TRACED"));
        assert!(result.mentions("INTRUSION DETECTED"));
    }

    #[test]
    fn override_lockdown_outranks_wrong_attempts() {
        let mut state = playing();
        state.override_failed_attempts = 2;
        state.wrong_attempts = 7;
        let (_, next) = exec("override protocol NOPE", &state);
        assert!(next.is_game_over);
        assert_eq!(next.wrong_attempts, 8);
        assert_eq!(
            next.game_over_reason.as_deref(),
            Some("SECURITY LOCKDOWN - AUTHENTICATION FAILURE")
        );
    }

    #[test]
    fn purge_countdown_ticks_then_ends() {
        let mut state = playing();
        state.terrible_mistake_triggered = true;
        state.session_doom_countdown = 2;
        let (banner, state) = exec("status", &state);
        assert_eq!(state.session_doom_countdown, 1);
        assert!(banner.mentions("PURGE IN 1"));
        let (end, state) = exec("status", &state);
        assert!(end.mentions("PURGE PROTOCOL COMPLETE"));
        assert_eq!(state.game_over_reason.as_deref(), Some("PURGE PROTOCOL - FORBIDDEN KNOWLEDGE"));
    }

    #[test]
    fn hard_stop_refuses_everything() {
        let mut state = playing();
        state.legacy_alert_counter = 10;
        let (result, next) = exec("help", &state);
        assert!(result.mentions("NO FURTHER COMMANDS ACCEPTED"));
        assert_eq!(next.game_over_reason.as_deref(), Some("LOCKDOWN"));
    }

    #[test]
    fn turing_answers_preempt_dispatch() {
        let mut state = playing();
        state.turing_evaluation_active = true;
        let (result, next) = exec("ls", &state);
        assert!(result.mentions("INVALID RESPONSE"));
        assert!(next.turing_evaluation_active);
        assert_eq!(next.session_command_count, 0);
    }

    #[test]
    fn blank_input_is_a_no_op() {
        let state = playing();
        let (result, next) = exec("  \u{200B} ", &state);
        assert!(result.output.is_empty());
        assert_eq!(next, state);
    }

    #[test]
    fn onboarding_owns_input_until_complete() {
        let state = onboarding::begin().patch.apply_to(&GameState::new(3));
        let (result, next) = exec("help", &state);
        assert!(result.mentions("INVALID INPUT"));
        assert_eq!(next.legacy_alert_counter, 0);
        assert_eq!(next.tutorial.fail_count, 1);
    }

    #[test]
    fn dispatched_commands_count_and_alias() {
        let (_, next) = exec("LS", &playing());
        assert_eq!(next.session_command_count, 1);
        let (morse, _) = exec("morse", &playing());
        assert!(!morse.mentions("Command not recognized"));
    }
}
