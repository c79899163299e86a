//! Getting the evidence out: `leak`, `run`, `map`, `tutorial`, and the
//! legacy utilities `disconnect`, `scan` and `decode`.
//!
//! The legacy utilities are only dispatched once the maintenance notes have
//! named them (see [`Verb::available`](super::Verb::available)).

use std::collections::BTreeSet;

use t96_core::fs::path::file_name;
use t96_core::{GameState, TRUTH_COUNT, TruthCategory, flag};

use crate::endings::{Ending, EndingFlags};
use crate::onboarding;
use crate::output::{CommandResult, OutputLine};

/// Game-over reason when the player walks away before saving.
pub const DISCONNECT_REASON: &str = "NEUTRAL ENDING - DISCONNECTED";
/// Wrong `decode` attempts before the cipher hint.
pub const CIPHER_HINT_AFTER: u32 = 3;
/// Detection gained by a deep scan.
pub const SCAN_COST: u32 = 10;
/// Detection shed by the trace purge.
pub const PURGE_RELIEF: u32 = 10;

const CIPHER_PLAINTEXT: &str = "the truth is not what they told you";
const EVIDENCE_SYMBOL: &str = "●";
const MAP_FILE_LIMIT: usize = 8;

/// `leak [all]`: send the evidence out and end the run.
///
/// `all` also sends the wider conspiracy files, which changes the ending.
pub(super) fn leak(args: &[String], state: &GameState) -> CommandResult {
    if !state.flag(flag::ALL_EVIDENCE_COLLECTED) {
        return CommandResult::with_output(vec![
            OutputLine::error("LEAK FAILED"),
            OutputLine::system(format!(
                "Evidence set incomplete. Collect all {TRUTH_COUNT} evidence categories first."
            )),
        ]);
    }

    let everything = args.first().is_some_and(|a| a.eq_ignore_ascii_case("all"));
    let choices = EndingFlags {
        conspiracy_files_leaked: everything || state.flag(flag::CONSPIRACY_FILES_LEAKED),
        ..EndingFlags::from_state(state)
    };
    let ending = Ending::determine(choices);

    let mut output = vec![
        OutputLine::blank(),
        OutputLine::warning("INITIATING EVIDENCE LEAK..."),
        OutputLine::blank(),
        OutputLine::system("Connecting to external relay..."),
        OutputLine::system("Establishing secure tunnel..."),
        OutputLine::blank(),
        OutputLine::warning("▓▓▓▓▓▓▓▓▓▓▓▓░░░░░░░░ 60%"),
        OutputLine::blank(),
        OutputLine::error("CONNECTION INTERCEPTED"),
        OutputLine::warning("Primary relay blocked by firewall."),
        OutputLine::system("Rerouting through emergency channel..."),
        OutputLine::blank(),
        OutputLine::output("[OK] Emergency channel open"),
    ];
    if everything {
        output.push(OutputLine::output("[OK] Conspiracy archive attached"));
    }
    output.push(OutputLine::notice("[OK] Transfer complete"));
    output.extend(ending.lines());

    let mut result = CommandResult::with_output(output);
    result.patch.set_flag(flag::EVIDENCES_SAVED);
    result.patch.set_flag(flag::LEAK_ATTEMPTED);
    if everything {
        result.patch.set_flag(flag::CONSPIRACY_FILES_LEAKED);
    }
    result.patch.game_over(&ending.reason());
    result.delay_ms = Some(2000);
    result.trigger_flicker = true;
    tracing::info!(ending = ending.title(), truths = state.truth_count(), "evidence_leaked");
    result
}

fn save_evidence(state: &GameState) -> CommandResult {
    if !state.flag(flag::ALL_EVIDENCE_COLLECTED) {
        let mut result = CommandResult::with_output(vec![
            OutputLine::error("EXECUTION FAILED"),
            OutputLine::system("Evidence set incomplete. Script aborted."),
        ]);
        result.patch.detection_level = Some(state.detection_plus(4));
        return result;
    }
    let mut result = CommandResult::with_output(vec![
        OutputLine::system("Executing save_evidence.sh..."),
        OutputLine::output("[OK] Evidence bundle sealed"),
        OutputLine::output("[OK] External backup created"),
        OutputLine::warning("WARNING: Transfer window closing"),
    ]);
    result.patch.set_flag(flag::EVIDENCES_SAVED);
    result.delay_ms = Some(1500);
    result.trigger_flicker = true;
    result
}

fn purge_trace(state: &GameState) -> CommandResult {
    if !state.trace_spike_active {
        return CommandResult::with_output(vec![
            OutputLine::error("EXECUTION FAILED"),
            OutputLine::system("No active trace detected."),
        ]);
    }
    let mut result = CommandResult::with_output(vec![
        OutputLine::warning("TRACE PURGE UTILITY"),
        OutputLine::output("[OK] Trace buffers wiped"),
        OutputLine::output("[OK] Session log truncated"),
        OutputLine::warning("NOTICE: Countermeasures reset"),
    ]);
    result.patch.trace_spike_active = Some(false);
    result.patch.detection_level = Some(state.detection_minus(PURGE_RELIEF));
    result.patch.set_flag(flag::TRACE_PURGE_USED);
    result.delay_ms = Some(1200);
    result.trigger_flicker = true;
    result
}

/// `run <script>`: the operator scripts.
pub(super) fn run(args: &[String], state: &GameState) -> CommandResult {
    let Some(script) = args.first() else {
        return CommandResult::with_output(vec![
            OutputLine::system("USAGE: run <script>"),
            OutputLine::system("Example: run save_evidence.sh"),
        ]);
    };
    match script.to_lowercase().as_str() {
        "save_evidence.sh" => save_evidence(state),
        "purge_trace.sh" => purge_trace(state),
        _ => CommandResult::with_output(vec![
            OutputLine::error("EXECUTION FAILED"),
            OutputLine::system(format!("Script not found: {script}")),
        ]),
    }
}

/// `disconnect`: walk away. Ends the run unless a transfer is running.
pub(super) fn disconnect(state: &GameState) -> CommandResult {
    if state.flag(flag::EVIDENCES_SAVED) {
        return CommandResult::with_output(vec![
            OutputLine::system("Cannot disconnect: connection transfer in progress."),
            OutputLine::system("Evidence files are being relayed. Stand by."),
        ]);
    }
    let mut result = CommandResult::with_output(vec![
        OutputLine::blank(),
        OutputLine::warning("DISCONNECTING..."),
        OutputLine::blank(),
        OutputLine::system("Connection severed."),
        OutputLine::warning("Evidence not saved. Files lost in disconnection."),
        OutputLine::blank(),
        OutputLine::output("You escaped... but the truth remains buried."),
        OutputLine::blank(),
    ]);
    result.patch.game_over(DISCONNECT_REASON);
    result.trigger_flicker = true;
    result.delay_ms = Some(2000);
    result
}

/// `scan`: loud sweep that unmasks the administrative archive.
pub(super) fn scan(state: &GameState) -> CommandResult {
    let mut result = CommandResult::with_output(vec![
        OutputLine::warning("▓ DEEP SCAN INITIATED ▓"),
        OutputLine::system("Scanning for hidden filesystem entries..."),
        OutputLine::system("Revealing masked nodes..."),
        OutputLine::blank(),
        OutputLine::notice("[!] Scan complete. Hidden paths may now be visible."),
        OutputLine::warning("[!] Detection risk: ELEVATED"),
    ]);
    result.patch.detection_level = Some(state.detection_plus(SCAN_COST));
    result.patch.set_flag(flag::ADMIN_UNLOCKED);
    result.trigger_flicker = true;
    result
}

fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// `decode <text>`: answer the encoded transmission.
pub(super) fn decode(args: &[String], state: &GameState) -> CommandResult {
    if args.is_empty() {
        return CommandResult::with_output(vec![OutputLine::system("Usage: decode <text>")]);
    }

    let attempt = normalize(&args.join(" "));
    if attempt == CIPHER_PLAINTEXT || attempt == "the truth" {
        let mut result = CommandResult::with_output(vec![
            OutputLine::blank(),
            OutputLine::ufo74("[UFO74]: Decryption successful."),
            OutputLine::ufo74("[UFO74]: \"The truth is not what they told you.\""),
            OutputLine::blank(),
            OutputLine::output("You understand now. The official reports were never meant to be accurate."),
        ]);
        result.patch.set_flag(flag::CIPHER_DECODED);
        result.patch.set_flag(flag::DISINFORMATION_DISCOVERED);
        return result;
    }

    let attempts = state.cipher_attempts + 1;
    let output = if attempts >= CIPHER_HINT_AFTER {
        vec![
            OutputLine::error("Decryption failed."),
            OutputLine::ufo74("[UFO74]: Still struggling with the cipher?"),
            OutputLine::ufo74("[UFO74]: Try applying ROT13. Classic but effective."),
        ]
    } else {
        vec![OutputLine::error("Decryption failed. Pattern not recognized.")]
    };
    let mut result = CommandResult::with_output(output);
    result.patch.cipher_attempts = Some(attempts);
    result
}

/// `map`: evidence found per category.
pub(super) fn map(state: &GameState) -> CommandResult {
    let mut output = vec![
        OutputLine::blank(),
        OutputLine::system("╔═══════════════════════════════════════════════════════╗"),
        OutputLine::system("║                  EVIDENCE MAP                         ║"),
        OutputLine::system("╠═══════════════════════════════════════════════════════╣"),
        OutputLine::blank(),
    ];
    if state.truths_discovered.is_empty() {
        output.extend([
            OutputLine::system("  No evidence collected yet."),
            OutputLine::blank(),
            OutputLine::system("  Read files to discover evidence."),
            OutputLine::blank(),
            OutputLine::system("╚═══════════════════════════════════════════════════════╝"),
        ]);
        return CommandResult::with_output(output);
    }

    output.extend([OutputLine::system("  EVIDENCE BY CATEGORY:"), OutputLine::blank()]);
    for category in TruthCategory::ALL {
        if state.truths_discovered.contains(&category) {
            output.push(OutputLine::output(format!("  {EVIDENCE_SYMBOL} {} [FOUND]", category.label())));
        } else {
            output.push(OutputLine::system(format!("  ○ {} [MISSING]", category.label())));
        }
    }
    output.push(OutputLine::blank());

    let mut seen = BTreeSet::new();
    let files: Vec<&str> = state
        .evidence_states
        .values()
        .flatten()
        .map(String::as_str)
        .filter(|p| seen.insert(*p))
        .collect();
    if !files.is_empty() {
        output.extend([
            OutputLine::system("  ─────────────────────────────────────────────"),
            OutputLine::system("  FILES WITH EVIDENCE:"),
        ]);
        output.extend(
            files
                .iter()
                .take(MAP_FILE_LIMIT)
                .map(|p| OutputLine::output(format!("    • {}", file_name(p)))),
        );
        if files.len() > MAP_FILE_LIMIT {
            output.push(OutputLine::system(format!("    ... and {} more", files.len() - MAP_FILE_LIMIT)));
        }
        output.push(OutputLine::blank());
    }

    output.extend([
        OutputLine::system("  ─────────────────────────────────────────────"),
        OutputLine::system(format!(
            "  PROGRESS: {}/{TRUTH_COUNT} categories discovered",
            state.truth_count()
        )),
        OutputLine::blank(),
        OutputLine::system("╚═══════════════════════════════════════════════════════╝"),
    ]);
    CommandResult::with_output(output)
}

/// `tutorial [on|off]`: toggle tips, or replay the onboarding.
pub(super) fn tutorial(args: &[String]) -> CommandResult {
    match args.first().map(|a| a.to_lowercase()).as_deref() {
        Some("on") => {
            let mut result = CommandResult::with_output(vec![
                OutputLine::notice("TUTORIAL MODE: ENABLED"),
                OutputLine::ufo74("[UFO74]: I'll show extra tips as you explore."),
                OutputLine::system("Type \"tutorial off\" anytime to disable."),
            ]);
            result.patch.flags.insert(flag::TIPS_DISABLED.to_string(), false);
            result
        }
        Some("off") => {
            let mut result = CommandResult::with_output(vec![
                OutputLine::notice("TUTORIAL MODE: DISABLED"),
                OutputLine::ufo74("[UFO74]: You're on your own now. Good luck kid."),
            ]);
            result.patch.set_flag(flag::TIPS_DISABLED);
            result
        }
        _ => {
            let mut replay = onboarding::begin();
            let mut output = vec![OutputLine::system("Restarting tutorial sequence..."), OutputLine::blank()];
            output.append(&mut replay.output);
            let mut patch = std::mem::take(&mut replay.patch);
            patch.tutorial_complete = Some(false);
            let mut result = CommandResult::with_patch(output, patch);
            result.clear_history = true;
            result
        }
    }
}
