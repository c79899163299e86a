//! Decryption, security questions and data recovery.

use t96_core::fs::path::file_name;
use t96_core::state::MAX_INVALID_ATTEMPTS;
use t96_core::{FileNode, FileStatus, GameState, flag};

use crate::context::Ctx;
use crate::detection::apply_variance;
use crate::evidence::check_truth_progress;
use crate::output::{CommandResult, OutputLine, StreamingMode};

use super::resolve_target;

const DECRYPT_CORRUPTION_CHANCE: f64 = 0.4;
const DECRYPT_DETECTION: u32 = 8;
const DECRYPT_STABILITY_COST: u32 = 5;
const RECOVER_DETECTION: u32 = 8;
const RECOVER_STABILITY_COST: u32 = 8;

/// Files `recover` may damage as collateral.
pub const COLLATERAL_POOL: [&str; 4] = [
    "/storage/assets/material_x_analysis.dat",
    "/storage/quarantine/bio_container.log",
    "/storage/quarantine/autopsy_alpha.log",
    "/comms/psi/transcript_core.enc",
];

/// `decrypt <file>`: decrypt a file or ask its security question.
pub(super) fn decrypt(args: &[String], state: &GameState, ctx: &mut Ctx<'_>) -> CommandResult {
    let Some(target) = args.first() else {
        return CommandResult::with_output(vec![OutputLine::error("ERROR: Specify file")]);
    };
    let (path, _) = resolve_target(target, state, ctx);
    let Some(file) = ctx.fs.get_file(&path, state) else {
        return CommandResult::with_output(vec![OutputLine::error("ERROR: File not found")]);
    };

    if file.status != FileStatus::Encrypted {
        return CommandResult::with_output(vec![
            OutputLine::error("ERROR: File is not encrypted"),
            OutputLine::blank(),
            OutputLine::system(format!("TIP: This file can be read directly with: open {target}")),
        ]);
    }
    if state.mutation(&path).is_some_and(|m| m.decrypted) {
        return CommandResult::with_output(vec![
            OutputLine::system("File already decrypted."),
            OutputLine::system(format!("TIP: Use \"open {target}\" to read it.")),
        ]);
    }
    if file.decrypted_fragment.is_none() {
        return CommandResult::with_output(vec![OutputLine::error("ERROR: No recoverable data")]);
    }

    if file.decrypt_threshold.is_some_and(|t| state.access_level < t) {
        let mut result = CommandResult::with_output(vec![
            OutputLine::error("ERROR: Decryption failed"),
            OutputLine::warning("WARNING: Access level insufficient"),
        ]);
        result.patch.detection_level = Some(state.detection_plus(10));
        result.patch.legacy_alert_counter = Some(state.legacy_alert_counter + 1);
        result.delay_ms = Some(1500);
        return result;
    }

    if let Some(question) = &file.security_question {
        let mut result = CommandResult::with_output(vec![
            OutputLine::system("Initiating decryption protocol..."),
            OutputLine::blank(),
            OutputLine::warning("══════════════════════════════════════════════"),
            OutputLine::warning("DECRYPTION AUTHENTICATION REQUIRED"),
            OutputLine::warning("══════════════════════════════════════════════"),
            OutputLine::blank(),
            OutputLine::system(question.question.clone()),
            OutputLine::blank(),
            OutputLine::system("Enter answer below:"),
        ]);
        result.patch.pending_decrypt_file = Some(Some(path));
        result.delay_ms = Some(500);
        return result;
    }

    perform_decryption(&path, file, state, ctx)
}

/// Decrypt `path`, possibly corrupting one line of the recovered fragment.
pub fn perform_decryption(path: &str, file: &FileNode, state: &GameState, ctx: &mut Ctx<'_>) -> CommandResult {
    let mut result = CommandResult {
        target_file: Some(path.to_string()),
        trigger_flicker: true,
        delay_ms: Some(2000),
        streaming_mode: Some(StreamingMode::Slow),
        ..CommandResult::default()
    };

    let mut mutation = state.mutation(path).cloned().unwrap_or_default();
    mutation.decrypted = true;
    if ctx.rolls.roll() < DECRYPT_CORRUPTION_CHANCE {
        let line = ctx.rolls.int(3, 11) as usize;
        if !mutation.corrupted_lines.contains(&line) {
            mutation.corrupted_lines.push(line);
        }
    }
    result.patch.file_mutations.insert(path.to_string(), mutation);
    result.patch.detection_level = Some(state.detection_plus(DECRYPT_DETECTION));
    result.patch.session_stability = Some(state.session_stability.saturating_sub(DECRYPT_STABILITY_COST));
    result.patch.pending_decrypt_file = Some(None);

    let neural = path.contains("neural_dump") || path.ends_with(".psi");
    if neural {
        result.patch.set_flag(flag::SCOUT_LINK_UNLOCKED);
    }

    let preview = result.patch.apply_to(state);
    let content = ctx
        .fs
        .get_file_content(path, &preview, true)
        .unwrap_or_else(|| vec!["[DECRYPTION FAILED]".to_string()]);
    let progress = check_truth_progress(&preview, &ctx.fs.get_file_reveals(path), path);

    let mut output = vec![
        OutputLine::system("AUTHENTICATION VERIFIED"),
        OutputLine::blank(),
        OutputLine::warning("WARNING: Partial recovery only"),
        OutputLine::blank(),
        OutputLine::system(format!("FILE: {path}")),
        OutputLine::blank(),
    ];
    output.extend(content.into_iter().map(OutputLine::file));
    output.extend(progress.notices);
    result.patch.merge(progress.patch);

    if neural {
        output.extend([
            OutputLine::blank(),
            OutputLine::notice("NOTICE: Neural pattern preserved."),
            OutputLine::notice("NOTICE: Remote link now available."),
            OutputLine::system("Use: link"),
        ]);
    }

    if let Some(image) = file.image.as_ref().filter(|i| !state.images_shown.contains(&i.src)) {
        let mut shown = state.images_shown.clone();
        shown.insert(image.src.clone());
        result.patch.images_shown = Some(shown);
        result.image = Some(image.clone());
    }
    if let Some(video) = file.video.as_ref().filter(|v| !state.videos_shown.contains(&v.src)) {
        let mut shown = state.videos_shown.clone();
        shown.insert(video.src.clone());
        result.patch.videos_shown = Some(shown);
        result.video = Some(video.clone());
    }

    tracing::info!(path, "file_decrypted");
    result.output = output;
    result
}

/// Answer the security question of the pending decryption.
///
/// `cancel` aborts. Wrong answers count as invalid attempts and lock the
/// terminal at the threshold.
pub fn answer_pending_decrypt(input: &str, state: &GameState, ctx: &mut Ctx<'_>) -> Option<CommandResult> {
    let path = state.pending_decrypt_file.as_deref()?;
    let answer = input.trim();

    if answer.eq_ignore_ascii_case("cancel") {
        let mut result = CommandResult::with_output(vec![OutputLine::system("Decryption cancelled.")]);
        result.patch.pending_decrypt_file = Some(None);
        return Some(result);
    }

    let file = ctx.fs.get_file(path, state)?;
    let question = file.security_question.as_ref()?;
    if question.accepts(answer) {
        return Some(perform_decryption(path, file, state, ctx));
    }

    let alerts = state.legacy_alert_counter + 1;
    let mut result = if alerts >= MAX_INVALID_ATTEMPTS {
        let mut result = CommandResult::with_output(vec![
            OutputLine::error("AUTHENTICATION FAILED"),
            OutputLine::blank(),
            OutputLine::error("═══════════════════════════════════════════════════════════"),
            OutputLine::error("CRITICAL: SECURITY THRESHOLD EXCEEDED"),
            OutputLine::error("═══════════════════════════════════════════════════════════"),
            OutputLine::blank(),
            OutputLine::error("SYSTEM LOCKDOWN INITIATED"),
        ]);
        result.patch.game_over("SECURITY LOCKDOWN - FAILED AUTHENTICATION");
        result.patch.pending_decrypt_file = Some(None);
        result.trigger_flicker = true;
        result.delay_ms = Some(2000);
        tracing::warn!(path, alerts, "decrypt_lockdown");
        result
    } else {
        let mut result = CommandResult::with_output(vec![
            OutputLine::error("AUTHENTICATION FAILED"),
            OutputLine::warning(format!("WARNING: Invalid attempts: {alerts}/{MAX_INVALID_ATTEMPTS}")),
            OutputLine::blank(),
            OutputLine::system(format!("HINT: {}", question.hint)),
            OutputLine::blank(),
            OutputLine::system("Enter answer or type \"cancel\" to abort:"),
        ]);
        result.delay_ms = Some(500);
        result
    };
    result.patch.legacy_alert_counter = Some(alerts);
    result.patch.detection_level = Some(state.detection_plus(5));
    result.patch.wrong_attempts = Some(state.wrong_attempts + 1);
    Some(result)
}

/// `recover <file>`: repair one corrupted line at the cost of another file.
pub(super) fn recover(args: &[String], state: &GameState, ctx: &mut Ctx<'_>) -> CommandResult {
    let Some(target) = args.first() else {
        return CommandResult::with_output(vec![OutputLine::error("ERROR: Specify file")]);
    };
    let (path, _) = resolve_target(target, state, ctx);
    if ctx.fs.get_file(&path, state).is_none() {
        return CommandResult::with_output(vec![OutputLine::error("ERROR: File not found")]);
    }

    let mut mutation = state.mutation(&path).cloned().unwrap_or_default();
    let Some(recovered) = mutation.corrupted_lines.pop() else {
        return CommandResult::with_output(vec![OutputLine::output(
            "File integrity nominal. No recovery needed.",
        )]);
    };

    let mut result = CommandResult::with_output(vec![
        OutputLine::system("Initiating recovery protocol..."),
        OutputLine::output(format!("Recovered data at line {recovered}")),
        OutputLine::warning("WARNING: Collateral integrity loss detected"),
    ]);
    result.patch.file_mutations.insert(path.clone(), mutation);

    let candidates: Vec<&str> = COLLATERAL_POOL.into_iter().filter(|p| *p != path).collect();
    if let Some(victim) = ctx.rolls.pick(&candidates) {
        let victim = (*victim).to_string();
        let mut damaged = result
            .patch
            .file_mutations
            .get(&victim)
            .or_else(|| state.mutation(&victim))
            .cloned()
            .unwrap_or_default();
        let line = ctx.rolls.int(3, 15) as usize;
        if !damaged.corrupted_lines.contains(&line) {
            damaged.corrupted_lines.push(line);
        }
        tracing::debug!(file = file_name(&victim), line, "collateral_corruption");
        result.patch.file_mutations.insert(victim, damaged);
    }

    let cost = apply_variance(state, "recover", RECOVER_DETECTION);
    result.patch.detection_level = Some(state.detection_plus(cost));
    result.patch.session_stability = Some(state.session_stability.saturating_sub(RECOVER_STABILITY_COST));
    result.trigger_flicker = true;
    result.delay_ms = Some(2500);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{args, playing, run};
    use t96_core::{FileMutation, TruthCategory};

    #[test]
    fn question_sets_pending() {
        let mut state = playing();
        state.current_path = "/comms/psi".into();
        let result = run(&state, |s, c| decrypt(&args(&["transcript_core.enc"]), s, c));
        assert!(result.mentions("DECRYPTION AUTHENTICATION REQUIRED"));
        assert_eq!(
            result.patch.pending_decrypt_file,
            Some(Some("/comms/psi/transcript_core.enc".to_string()))
        );
    }

    #[test]
    fn wrong_then_right_answer() {
        let mut state = playing();
        state.pending_decrypt_file = Some("/comms/psi/transcript_core.enc".into());

        let wrong = run(&state, |s, c| answer_pending_decrypt("roswell", s, c)).unwrap();
        assert!(wrong.mentions("AUTHENTICATION FAILED"));
        assert_eq!(wrong.patch.pending_decrypt_file, None);
        assert_eq!(wrong.patch.legacy_alert_counter, Some(1));
        let state = wrong.patch.apply_to(&state);
        assert!(state.pending_decrypt_file.is_some());

        let right = run(&state, |s, c| answer_pending_decrypt("VARGINHA1996", s, c)).unwrap();
        assert!(right.mentions("AUTHENTICATION VERIFIED"));
        let state = right.patch.apply_to(&state);
        assert!(state.pending_decrypt_file.is_none());
        assert!(state.mutation("/comms/psi/transcript_core.enc").is_some_and(|m| m.decrypted));
        assert!(state.truths_discovered.contains(&TruthCategory::TelepathicScouts));
    }

    #[test]
    fn eighth_wrong_answer_locks_down() {
        let mut state = playing();
        state.legacy_alert_counter = 7;
        state.pending_decrypt_file = Some("/comms/psi/neural_dump.psi".into());
        let result = run(&state, |s, c| answer_pending_decrypt("wrong", s, c)).unwrap();
        let next = result.patch.apply_to(&state);
        assert!(next.is_game_over);
        assert_eq!(
            next.game_over_reason.as_deref(),
            Some("SECURITY LOCKDOWN - FAILED AUTHENTICATION")
        );
        assert!(next.pending_decrypt_file.is_none());
    }

    #[test]
    fn cancel_clears_pending() {
        let mut state = playing();
        state.pending_decrypt_file = Some("/comms/psi/neural_dump.psi".into());
        let result = run(&state, |s, c| answer_pending_decrypt("Cancel", s, c)).unwrap();
        assert!(result.mentions("Decryption cancelled."));
        assert_eq!(result.patch.pending_decrypt_file, Some(None));
    }

    #[test]
    fn no_pending_means_no_answer() {
        let state = playing();
        assert!(run(&state, |s, c| answer_pending_decrypt("x", s, c)).is_none());
    }

    #[test]
    fn neural_dump_unlocks_link() {
        let mut state = playing();
        state.pending_decrypt_file = Some("/comms/psi/neural_dump.psi".into());
        let result = run(&state, |s, c| answer_pending_decrypt("operation prato", s, c)).unwrap();
        assert!(result.mentions("Remote link now available."));
        assert!(result.patch.apply_to(&state).flag(flag::SCOUT_LINK_UNLOCKED));
    }

    #[test]
    fn decrypt_threshold_enforced() {
        let mut state = playing();
        state.current_path = "/ops/assessments".into();
        let result = run(&state, |s, c| decrypt(&args(&["window_assessment.enc"]), s, c));
        assert!(result.mentions("Access level insufficient"));
        assert_eq!(result.patch.legacy_alert_counter, Some(1));
    }

    #[test]
    fn plain_files_are_not_encrypted() {
        let mut state = playing();
        state.current_path = "/tmp".into();
        let result = run(&state, |s, c| decrypt(&args(&["note_to_self.tmp"]), s, c));
        assert!(result.mentions("File is not encrypted"));
        assert!(result.patch.is_empty());
    }

    #[test]
    fn recover_repairs_and_damages() {
        let mut state = playing();
        state.file_mutations.insert(
            "/tmp/note_to_self.tmp".into(),
            FileMutation {
                corrupted_lines: vec![1],
                ..FileMutation::default()
            },
        );
        state.current_path = "/tmp".into();
        let result = run(&state, |s, c| recover(&args(&["note_to_self.tmp"]), s, c));
        assert!(result.mentions("Recovered data at line 1"));
        let next = result.patch.apply_to(&state);
        assert!(next.mutation("/tmp/note_to_self.tmp").is_some_and(|m| m.corrupted_lines.is_empty()));
        assert!(
            COLLATERAL_POOL
                .iter()
                .any(|p| next.mutation(p).is_some_and(|m| !m.corrupted_lines.is_empty()))
        );
        assert_eq!(next.session_stability, 92);
    }

    #[test]
    fn collateral_damage_spares_the_recovered_file() {
        let target = "/storage/quarantine/bio_container.log";
        for rng_state in 1..200 {
            let mut state = playing();
            state.access_level = 5;
            state.rng_state = rng_state;
            state.current_path = "/storage/quarantine".into();
            state.file_mutations.insert(
                target.into(),
                FileMutation {
                    corrupted_lines: vec![4],
                    ..FileMutation::default()
                },
            );
            let result = run(&state, |s, c| recover(&args(&["bio_container.log"]), s, c));
            let next = result.patch.apply_to(&state);
            assert!(
                next.mutation(target).is_some_and(|m| m.corrupted_lines.is_empty()),
                "target re-corrupted at rng state {rng_state}"
            );
            assert!(
                COLLATERAL_POOL
                    .iter()
                    .filter(|p| **p != target)
                    .any(|p| next.mutation(p).is_some_and(|m| !m.corrupted_lines.is_empty()))
            );
        }
    }

    #[test]
    fn recover_nominal_file() {
        let mut state = playing();
        state.current_path = "/tmp".into();
        let result = run(&state, |s, c| recover(&args(&["note_to_self.tmp"]), s, c));
        assert!(result.mentions("No recovery needed"));
    }
}
