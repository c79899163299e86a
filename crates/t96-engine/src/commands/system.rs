//! Session-level commands: help, status, trace, override, wait, hide,
//! progress, save.

use std::collections::BTreeSet;

use t96_core::fs::path::file_name;
use t96_core::state::{MAX_ACCESS, MAX_INVALID_ATTEMPTS};
use t96_core::{GameState, TRUTH_COUNT, TruthCategory, flag};

use crate::context::Ctx;
use crate::detection::{ALERT, HIDE_RESET, HIGH_WAIT_REDUCTION, IMMINENT, SUSPICIOUS, WAIT_FLOOR, WAIT_HIGH, WAIT_NORMAL, apply_variance};
use crate::output::{CommandResult, OutputLine, StreamingMode};

use super::{Verb, tips};

/// Code accepted by `override protocol`.
pub const OVERRIDE_CODE: &str = "COLHEITA";
/// Wrong codes before the security lockdown.
pub const MAX_OVERRIDE_FAILURES: u32 = 3;
/// Operations between the forbidden-knowledge branch and the purge.
pub const DOOM_COUNTDOWN: u32 = 8;
const FORBIDDEN_CHANCE: f64 = 0.35;
const FORBIDDEN_MIN_TRUTHS: usize = 2;
const TRACE_ACCESS_CAP: u32 = 3;
const HIDE_USED: &str = "hide_used";
const RULE: &str = "═══════════════════════════════════════════════════════════";

fn help_details(verb: Verb) -> &'static [&'static str] {
    match verb {
        Verb::Ls => &[
            "MARKERS:",
            "  [NEW]          - File not yet read",
            "  [READ]         - File already opened",
            "  [ENCRYPTED]    - Requires decryption",
            "  ★              - Bookmarked file",
        ],
        Verb::Cd => &["  cd ..          - Go to parent directory", "  cd /ops        - Go to absolute path"],
        Verb::Open => &[
            "NOTE: Some files are encrypted and require the \"decrypt\" command.",
            "NOTE: Opening certain files may increase detection risk.",
        ],
        Verb::Decrypt => &[
            "You may be prompted with a security question.",
            "Wrong answers increase detection and may trigger lockdown.",
            "TIP: Type \"cancel\" to abort a decryption attempt.",
        ],
        Verb::Recover => &["WARNING: Recovery destabilises other records."],
        Verb::Trace => &["WARNING: Tracing is loud. Detection will rise."],
        Verb::Override => &["Requires an authentication code.", "Three wrong codes trigger a lockdown."],
        Verb::Wait => &["Limited uses per session. Makes the system impatient."],
        _ => &[],
    }
}

fn unlocked(verb: Verb, state: &GameState) -> bool {
    match verb {
        Verb::Link => state.flag(flag::SCOUT_LINK_UNLOCKED),
        Verb::Hide => state.hide_available,
        Verb::Message => state.flag(flag::MORSE_FILE_READ),
        Verb::Script => state.files_read.contains("/tmp/data_reconstruction.util"),
        Verb::Disconnect | Verb::Scan | Verb::Decode => verb.available(state),
        _ => verb.listed(),
    }
}

/// `help [command]`.
pub(super) fn help(args: &[String], state: &GameState) -> CommandResult {
    if let Some(name) = args.first() {
        let name = name.to_lowercase();
        let Some(verb) = Verb::from_name(&name).filter(|v| unlocked(*v, state)) else {
            return CommandResult::with_output(vec![
                OutputLine::error(format!("Unknown command: {name}")),
                OutputLine::system("Type \"help\" to see all available commands."),
            ]);
        };
        let mut output = vec![
            OutputLine::blank(),
            OutputLine::output(format!("COMMAND: {}", verb.usage())),
            OutputLine::blank(),
            OutputLine::output(verb.summary()),
        ];
        let details = help_details(verb);
        if !details.is_empty() {
            output.push(OutputLine::blank());
            output.extend(details.iter().map(|l| OutputLine::output(*l)));
        }
        output.push(OutputLine::blank());
        return CommandResult::with_output(output);
    }

    let mut output = vec![
        OutputLine::blank(),
        OutputLine::output(RULE),
        OutputLine::output("TERMINAL COMMANDS"),
        OutputLine::output(RULE),
        OutputLine::blank(),
    ];
    output.extend(
        Verb::ALL
            .into_iter()
            .filter(|v| unlocked(*v, state))
            .map(|v| OutputLine::output(format!("  {:<26}{}", v.usage(), v.summary()))),
    );
    output.extend([
        OutputLine::blank(),
        OutputLine::output("TIP: Type \"help <command>\" for detailed usage."),
        OutputLine::output(RULE),
        OutputLine::blank(),
    ]);
    CommandResult::with_output(output)
}

/// `status`: vague readout of the session; archives a winning session.
pub(super) fn status(state: &GameState) -> CommandResult {
    let terse = state.system_hostility_level >= 3;
    let pick = |full: &str, short: &str| if terse { short.to_string() } else { full.to_string() };
    let mut lines = vec![String::new(), RULE.to_string(), "SYSTEM STATUS".to_string(), RULE.to_string(), String::new()];

    lines.push(match state.detection_level {
        0..20 => "  LOGGING: Nominal".to_string(),
        20..50 => pick("  LOGGING: Active monitoring enabled", "  LOGGING: Active"),
        50..80 => pick("  LOGGING: WARNING - Audit trail flagged", "  LOGGING: FLAGGED"),
        _ => pick("  LOGGING: CRITICAL - Countermeasures engaged", "  LOGGING: CRITICAL"),
    });
    lines.push(match MAX_INVALID_ATTEMPTS.saturating_sub(state.wrong_attempts) {
        6.. => pick("  SYSTEM TOLERANCE: Normal", "  TOLERANCE: Normal"),
        3..=5 => pick("  SYSTEM TOLERANCE: Reduced - Errors noted", "  TOLERANCE: Reduced"),
        1..=2 => pick("  SYSTEM TOLERANCE: CRITICAL - Few attempts remaining", "  TOLERANCE: CRITICAL"),
        0 => pick("  SYSTEM TOLERANCE: EXHAUSTED - Lockdown imminent", "  TOLERANCE: NONE"),
    });
    lines.push(match state.session_stability {
        81.. => "  SESSION: Connected".to_string(),
        51..=80 => "  SESSION: Intermittent".to_string(),
        _ => pick("  SESSION: UNSTABLE - Connection degrading", "  SESSION: UNSTABLE"),
    });
    lines.push(
        match state.access_level {
            0..=1 => "  ACCESS: Standard",
            2..=3 => "  ACCESS: Elevated",
            _ => "  ACCESS: Administrative",
        }
        .to_string(),
    );
    if state.system_hostility_level >= 4 {
        lines.extend([String::new(), "  SYSTEM ATTITUDE: Non-cooperative".to_string()]);
    } else if state.system_hostility_level >= 2 {
        lines.extend([String::new(), "  SYSTEM ATTITUDE: Monitored".to_string()]);
    }
    if state.terrible_mistake_triggered {
        lines.extend([String::new(), "  ▓▓▓ PURGE PROTOCOL: ACTIVE ▓▓▓".to_string()]);
        if state.session_doom_countdown > 0 {
            lines.push(format!("  OPERATIONS REMAINING: {}", state.session_doom_countdown));
        }
    }
    lines.extend([
        String::new(),
        format!("  CURRENT PATH: {}", state.current_path),
        String::new(),
        RULE.to_string(),
    ]);

    let mut result = CommandResult::default();
    if state.is_victory() {
        lines.extend([String::new(), "SESSION ARCHIVED".to_string()]);
        result.patch.game_over("SESSION ARCHIVED");
        result.patch.set_flag(flag::SESSION_ARCHIVED);
        tracing::info!(truths = state.truth_count(), "session_archived");
    } else {
        lines.push(String::new());
        result.patch.detection_level = Some(state.detection_plus(1));
        result.patch.status_command_count = Some(state.status_command_count + 1);
    }
    result.output = lines.into_iter().map(OutputLine::output).collect();
    result
}

/// `trace`: map the archive at the cost of detection; raises clearance.
pub(super) fn trace(state: &GameState, ctx: &mut Ctx<'_>) -> CommandResult {
    let mut output = vec![
        OutputLine::system("Initiating trace protocol..."),
        OutputLine::blank(),
        OutputLine::output("TRACE RESULT:"),
    ];
    if state.access_level < 2 {
        output.extend([
            OutputLine::output("  /storage/ - ACCESSIBLE"),
            OutputLine::output("  /ops/ - PARTIAL"),
            OutputLine::output("  /comms/ - ACCESSIBLE"),
            OutputLine::output("  /admin/ - RESTRICTED"),
            OutputLine::blank(),
            OutputLine::warning("WARNING: Trace logged. Detection increased."),
        ]);
    } else {
        let mut elevated = state.clone();
        elevated.access_level = MAX_ACCESS;
        for entry in ctx.fs.list_directory("/", &elevated).unwrap_or_default() {
            let dir = format!("/{}", entry.name.trim_end_matches('/'));
            let count = ctx
                .fs
                .all_file_paths()
                .iter()
                .filter(|p| p.starts_with(&format!("{dir}/")))
                .count();
            let tag = if ctx.fs.is_dir(&dir, state) { "" } else { " [RESTRICTED]" };
            output.push(OutputLine::output(format!("  {dir}/ - {count} files{tag}")));
        }
        output.extend([
            OutputLine::blank(),
            OutputLine::notice("NOTICE: Administrative access may be obtainable."),
        ]);
    }

    let mut result = CommandResult::with_output(output);
    let cost = apply_variance(state, "trace", 10);
    result.patch.detection_level = Some(state.detection_plus(cost));
    result.patch.access_level = Some((state.access_level + 1).min(TRACE_ACCESS_CAP).max(state.access_level));
    result.patch.session_stability = Some(state.session_stability.saturating_sub(5));
    result.trigger_flicker = true;
    result.delay_ms = Some(1800);
    result
}

/// `override protocol <CODE>`: administrative unlock.
pub(super) fn override_protocol(args: &[String], state: &GameState, ctx: &mut Ctx<'_>) -> CommandResult {
    if !args.first().is_some_and(|a| a.eq_ignore_ascii_case("protocol")) {
        return tips::invalid_command("", state);
    }
    if args.len() < 2 {
        let mut result = CommandResult::with_output(vec![
            OutputLine::system("Initiating protocol override..."),
            OutputLine::blank(),
            OutputLine::error("ACCESS DENIED"),
            OutputLine::blank(),
            OutputLine::warning("Protocol override requires authentication code."),
            OutputLine::warning("Usage: override protocol <CODE>"),
            OutputLine::blank(),
            OutputLine::system("Hint: Someone in this system might know the code..."),
        ]);
        result.patch.detection_level = Some(state.detection_plus(5));
        result.trigger_flicker = true;
        result.delay_ms = Some(1500);
        return result;
    }

    let code = args[1..].join(" ").to_uppercase();
    let verifying = OutputLine::system(format!("Verifying code: {code}..."));

    if code != OVERRIDE_CODE {
        let failures = state.override_failed_attempts + 1;
        let mut result = if failures >= MAX_OVERRIDE_FAILURES {
            let mut result = CommandResult::with_output(vec![
                verifying,
                OutputLine::blank(),
                OutputLine::error(RULE),
                OutputLine::error("SECURITY COUNTERMEASURE ACTIVATED"),
                OutputLine::error("MULTIPLE AUTHENTICATION FAILURES DETECTED"),
                OutputLine::error(RULE),
                OutputLine::blank(),
                OutputLine::error("IMMEDIATE SHUTDOWN"),
            ]);
            result.patch.game_over("SECURITY LOCKDOWN - AUTHENTICATION FAILURE");
            result.delay_ms = Some(3000);
            tracing::warn!(failures, "override_lockdown");
            result
        } else {
            let remaining = MAX_OVERRIDE_FAILURES - failures;
            let mut result = CommandResult::with_output(vec![
                verifying,
                OutputLine::blank(),
                OutputLine::error("INVALID AUTHENTICATION CODE"),
                OutputLine::blank(),
                OutputLine::warning(format!("WARNING: {remaining} attempt(s) remaining before lockdown")),
            ]);
            result.patch.detection_level = Some(state.detection_plus(10));
            result.delay_ms = Some(1500);
            result
        };
        result.patch.override_failed_attempts = Some(failures);
        result.patch.wrong_attempts = Some(state.wrong_attempts + 1);
        result.trigger_flicker = true;
        return result;
    }

    let roll = ctx.rolls.roll();
    let forbidden = state.detection_level >= ALERT
        && state.truth_count() >= FORBIDDEN_MIN_TRUTHS
        && !state.terrible_mistake_triggered
        && roll < FORBIDDEN_CHANCE;

    let mut result = if forbidden {
        let mut result = CommandResult::with_output(vec![
            verifying,
            OutputLine::system("Authentication accepted."),
            OutputLine::blank(),
            OutputLine::error("▓▓▓ CRITICAL BREACH ▓▓▓"),
            OutputLine::blank(),
            OutputLine::warning("EMERGENCY BUFFER DUMP - DO NOT DISTRIBUTE"),
            OutputLine::blank(),
            OutputLine::output("RECOVERED FRAGMENT [ORIGIN: UNKNOWN NODE]:"),
            OutputLine::output("  ...harvest cycle confirmed..."),
            OutputLine::output("  ...window activation: IMMINENT..."),
            OutputLine::output("  ...observation terminates upon extraction..."),
            OutputLine::blank(),
            OutputLine::error("PURGE PROTOCOL INITIATED"),
            OutputLine::error(format!("SYSTEM WILL TERMINATE IN {DOOM_COUNTDOWN} OPERATIONS")),
            OutputLine::blank(),
            OutputLine::warning("You should not have seen this."),
        ]);
        result.patch.terrible_mistake_triggered = Some(true);
        result.patch.session_doom_countdown = Some(DOOM_COUNTDOWN);
        result.patch.set_flag(flag::FORBIDDEN_KNOWLEDGE);
        result.patch.detection_level = Some(99);
        result.patch.system_hostility_level = Some(5);
        result.delay_ms = Some(4000);
        tracing::warn!(detection = state.detection_level, "forbidden_knowledge");
        result
    } else {
        let mut result = CommandResult::with_output(vec![
            verifying,
            OutputLine::system("Authentication accepted."),
            OutputLine::blank(),
            OutputLine::warning("WARNING: Legacy security bypass detected"),
            OutputLine::blank(),
            OutputLine::notice("NOTICE: Administrative archive access granted"),
            OutputLine::notice("NOTICE: Elevated clearance applied"),
            OutputLine::blank(),
            OutputLine::warning("WARNING: Session heavily monitored"),
        ]);
        result.patch.override_failed_attempts = Some(0);
        result.patch.detection_level = Some(state.detection_plus(15));
        result.patch.session_stability = Some(state.session_stability.saturating_sub(15));
        result.patch.system_hostility_level = Some(state.hostility_plus(1));
        result.delay_ms = Some(2500);
        tracing::info!("admin_unlocked");
        result
    };
    result.patch.set_flag(flag::ADMIN_UNLOCKED);
    result.patch.access_level = Some(MAX_ACCESS);
    result.trigger_flicker = true;
    result
}

/// `wait`: lie low to shed detection.
pub(super) fn wait(state: &GameState) -> CommandResult {
    let remaining = state.wait_uses_remaining;
    if remaining == 0 {
        return CommandResult::with_output(vec![
            OutputLine::warning("Cannot wait any longer."),
            OutputLine::system("The system is too alert. Staying still would be suspicious."),
        ]);
    }
    if state.detection_level <= WAIT_FLOOR {
        return CommandResult::with_output(vec![
            OutputLine::system("Detection level already minimal."),
            OutputLine::system("No need to wait."),
        ]);
    }

    let reduction = if state.detection_level >= HIGH_WAIT_REDUCTION {
        WAIT_HIGH
    } else {
        WAIT_NORMAL
    };
    let hostility = state.hostility_plus(1);
    let left = remaining - 1;
    let mood = match hostility {
        3.. => OutputLine::warning("    The system grows impatient."),
        2 => OutputLine::system("    Something is still watching."),
        _ => OutputLine::system("    Attention drifts elsewhere."),
    };
    let mut result = CommandResult::with_output(vec![
        OutputLine::blank(),
        OutputLine::system("    . . ."),
        OutputLine::blank(),
        OutputLine::system("    [Holding position... monitoring suspended]"),
        OutputLine::blank(),
        mood,
        OutputLine::blank(),
        OutputLine::system(format!(
            "    Detection reduced. [{left} wait{} remaining]",
            if left == 1 { "" } else { "s" }
        )),
    ]);
    result.patch.detection_level = Some(state.detection_minus(reduction));
    result.patch.wait_uses_remaining = Some(left);
    result.patch.system_hostility_level = Some(hostility);
    result.streaming_mode = Some(StreamingMode::Slow);
    result.delay_ms = Some(2000);
    result
}

/// `hide`: one emergency reset of detection, only when detection is imminent.
pub(super) fn hide(state: &GameState) -> CommandResult {
    if state.detection_level < IMMINENT {
        return CommandResult::with_output(vec![
            OutputLine::error("Command not recognized: hide"),
            OutputLine::system("Type \"help\" for available commands"),
        ]);
    }
    if state.singular_events_triggered.contains(HIDE_USED) {
        return CommandResult::with_output(vec![
            OutputLine::error("Cannot hide again."),
            OutputLine::warning("They know your patterns now."),
            OutputLine::system("There is no second escape."),
        ]);
    }

    let mut result = CommandResult::with_output(vec![
        OutputLine::blank(),
        OutputLine::warning("▓▓▓ EMERGENCY PROTOCOL ENGAGED ▓▓▓"),
        OutputLine::blank(),
        OutputLine::system("    Routing through backup channels..."),
        OutputLine::system("    Fragmenting connection signature..."),
        OutputLine::system("    Deploying decoy packets..."),
        OutputLine::blank(),
        OutputLine::system("    [CONNECTION DESTABILIZED]"),
        OutputLine::blank(),
        OutputLine::output("    You slip back into the shadows."),
        OutputLine::warning("    Session stability compromised."),
        OutputLine::blank(),
        OutputLine::ufo74("    >> close call. dont push your luck. <<"),
    ]);
    result.patch.detection_level = Some(HIDE_RESET);
    result.patch.session_stability = Some(state.session_stability.saturating_sub(25).max(10));
    result.patch.singular_events.insert(HIDE_USED.to_string());
    result.patch.system_hostility_level = Some(state.hostility_plus(2));
    result.patch.hide_available = Some(false);
    result.streaming_mode = Some(StreamingMode::Glitchy);
    result.delay_ms = Some(3000);
    result.trigger_flicker = true;
    result
}

fn case_strength(truths: usize) -> &'static str {
    match truths {
        0 => "No case yet",
        1..=2 => "Circumstantial",
        3..=4 => "Compelling",
        _ => "Conclusive",
    }
}

/// `progress`: evidence files and session statistics.
pub(super) fn progress(state: &GameState) -> CommandResult {
    let mut output = vec![
        OutputLine::blank(),
        OutputLine::system("╔═══════════════════════════════════════════════════════╗"),
        OutputLine::system("║            INVESTIGATION PROGRESS                     ║"),
        OutputLine::system("╠═══════════════════════════════════════════════════════╣"),
        OutputLine::blank(),
        OutputLine::system("  EVIDENCE COLLECTED:"),
        OutputLine::blank(),
    ];

    let mut seen = BTreeSet::new();
    let files: Vec<&str> = TruthCategory::ALL
        .iter()
        .filter_map(|c| state.evidence_states.get(c))
        .flatten()
        .map(String::as_str)
        .filter(|p| seen.insert(*p))
        .collect();
    if files.is_empty() {
        output.extend([
            OutputLine::output("    No evidence files collected yet."),
            OutputLine::blank(),
            OutputLine::system("    Read files to discover evidence."),
        ]);
    } else {
        output.extend(files.iter().take(12).map(|p| OutputLine::output(format!("    ■ {}", file_name(p)))));
        if files.len() > 12 {
            output.push(OutputLine::system(format!("    ... and {} more", files.len() - 12)));
        }
    }

    output.extend([
        OutputLine::blank(),
        OutputLine::output(format!(
            "  CASE STATUS: {}/{TRUTH_COUNT} categories discovered",
            state.truth_count()
        )),
        OutputLine::system(format!("  STRENGTH: {}", case_strength(state.truth_count()))),
        OutputLine::blank(),
        OutputLine::system("  SESSION STATISTICS:"),
        OutputLine::output(format!("    Files examined: {}", state.files_read.len())),
        OutputLine::output(format!(
            "    Bookmarks: {}  |  Notes: {}",
            state.bookmarked_files.len(),
            state.player_notes.len()
        )),
        OutputLine::blank(),
    ]);
    if state.detection_level >= ALERT {
        output.push(OutputLine::error("  ⚠ CRITICAL: Detection level dangerously high"));
    } else if state.detection_level >= SUSPICIOUS {
        output.push(OutputLine::warning("  ⚠ WARNING: Detection level elevated"));
    }
    output.push(OutputLine::system("╚═══════════════════════════════════════════════════════╝"));
    CommandResult::with_output(output)
}

/// `save`: ask the host to persist the session.
pub(super) fn save() -> CommandResult {
    let mut result = CommandResult::with_output(vec![
        OutputLine::system("SESSION SAVE REQUESTED"),
        OutputLine::output("Snapshot will be written by the host."),
    ]);
    result.patch.set_flag(flag::SAVE_REQUESTED);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{args, playing, run};

    #[test]
    fn help_hides_locked_verbs() {
        let state = playing();
        let result = help(&[], &state);
        assert!(result.mentions("open <filename>"));
        assert!(!result.mentions("link [query]"));
        assert!(help(&args(&["link"]), &state).mentions("Unknown command: link"));

        let mut state = state;
        state.flags.set(flag::SCOUT_LINK_UNLOCKED, true);
        assert!(help(&[], &state).mentions("link [query]"));
        assert!(help(&args(&["decrypt"]), &state).mentions("cancel"));
    }

    #[test]
    fn status_costs_one_and_counts() {
        let state = playing();
        let result = status(&state);
        assert!(result.mentions("LOGGING: Nominal"));
        assert!(result.mentions("CURRENT PATH: /"));
        assert_eq!(result.patch.detection_level, Some(1));
        assert_eq!(result.patch.status_command_count, Some(1));
    }

    #[test]
    fn status_archives_victory() {
        let mut state = playing();
        state.truths_discovered.extend(TruthCategory::ALL);
        let next = status(&state).patch.apply_to(&state);
        assert!(next.is_game_over);
        assert_eq!(next.game_over_reason.as_deref(), Some("SESSION ARCHIVED"));
    }

    #[test]
    fn trace_raises_access_to_cap() {
        let mut state = playing();
        let first = run(&state, |s, c| trace(s, c));
        assert_eq!(first.patch.access_level, Some(2));
        state.access_level = 3;
        let capped = run(&state, |s, c| trace(s, c));
        assert_eq!(capped.patch.access_level, Some(3));
        assert!(capped.mentions("/admin/ - "));
        assert!(capped.mentions("Administrative access may be obtainable"));
    }

    #[test]
    fn override_requires_protocol_keyword() {
        let state = playing();
        let result = run(&state, |s, c| override_protocol(&args(&["colheita"]), s, c));
        assert_eq!(result.patch.legacy_alert_counter, Some(1));
        let bare = run(&state, |s, c| override_protocol(&args(&["protocol"]), s, c));
        assert!(bare.mentions("requires authentication code"));
    }

    #[test]
    fn override_correct_code_unlocks_admin() {
        let state = playing();
        let result = run(&state, |s, c| override_protocol(&args(&["protocol", "colheita"]), s, c));
        let next = result.patch.apply_to(&state);
        assert!(next.flag(flag::ADMIN_UNLOCKED));
        assert_eq!(next.access_level, MAX_ACCESS);
        assert!(!next.terrible_mistake_triggered);
        assert_eq!(next.detection_level, 15);
    }

    #[test]
    fn third_wrong_code_locks_down() {
        let mut state = playing();
        state.override_failed_attempts = 2;
        let result = run(&state, |s, c| override_protocol(&args(&["protocol", "roswell"]), s, c));
        let next = result.patch.apply_to(&state);
        assert!(next.is_game_over);
        assert_eq!(
            next.game_over_reason.as_deref(),
            Some("SECURITY LOCKDOWN - AUTHENTICATION FAILURE")
        );
        assert_eq!(next.override_failed_attempts, 3);
    }

    #[test]
    fn forbidden_branch_is_deterministic() {
        let mut state = playing();
        state.detection_level = 92;
        state.truths_discovered.insert(TruthCategory::DebrisRelocation);
        state.truths_discovered.insert(TruthCategory::BeingContainment);
        let a = run(&state, |s, c| override_protocol(&args(&["protocol", "COLHEITA"]), s, c));
        let b = run(&state, |s, c| override_protocol(&args(&["protocol", "COLHEITA"]), s, c));
        assert_eq!(a.patch, b.patch);
        if a.patch.terrible_mistake_triggered == Some(true) {
            assert_eq!(a.patch.session_doom_countdown, Some(DOOM_COUNTDOWN));
            assert_eq!(a.patch.detection_level, Some(99));
        }
    }

    #[test]
    fn forbidden_branch_reachable_for_some_seed() {
        let hit = (1..200u32).any(|seed| {
            let mut state = GameState::without_tutorial(seed);
            state.detection_level = 92;
            state.truths_discovered.insert(TruthCategory::DebrisRelocation);
            state.truths_discovered.insert(TruthCategory::BeingContainment);
            let result = run(&state, |s, c| override_protocol(&args(&["protocol", "COLHEITA"]), s, c));
            result.patch.terrible_mistake_triggered == Some(true)
        });
        assert!(hit);
    }

    #[test]
    fn wait_sheds_detection_and_uses() {
        let mut state = playing();
        state.detection_level = 40;
        let result = wait(&state);
        assert_eq!(result.patch.detection_level, Some(35));
        assert_eq!(result.patch.wait_uses_remaining, Some(2));
        state.detection_level = 75;
        assert_eq!(wait(&state).patch.detection_level, Some(67));
        state.wait_uses_remaining = 0;
        assert!(wait(&state).mentions("Cannot wait any longer."));
        state.wait_uses_remaining = 3;
        state.detection_level = 5;
        assert!(wait(&state).patch.is_empty());
    }

    #[test]
    fn hide_only_once_and_only_when_imminent() {
        let mut state = playing();
        state.detection_level = 80;
        assert!(hide(&state).mentions("Command not recognized: hide"));
        state.detection_level = 95;
        let result = hide(&state);
        assert_eq!(result.patch.detection_level, Some(HIDE_RESET));
        let mut next = result.patch.apply_to(&state);
        next.detection_level = 95;
        assert!(hide(&next).mentions("Cannot hide again."));
    }

    #[test]
    fn progress_lists_evidence_files() {
        let mut state = playing();
        state.evidence_states.insert(
            TruthCategory::DebrisRelocation,
            vec!["/storage/assets/transport_log_96.txt".into()],
        );
        state.truths_discovered.insert(TruthCategory::DebrisRelocation);
        let result = progress(&state);
        assert!(result.mentions("■ transport_log_96.txt"));
        assert!(result.mentions("CASE STATUS: 1/5"));
        assert!(result.mentions("Circumstantial"));
    }

    #[test]
    fn save_sets_flag() {
        assert!(save().patch.flags.contains_key(flag::SAVE_REQUESTED));
    }
}
