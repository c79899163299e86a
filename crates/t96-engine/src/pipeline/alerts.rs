//! Countdown banner, detection status banners and the endings the
//! pipeline can force.

use t96_core::GameState;
use t96_core::state::{MAX_DETECTION, MAX_INVALID_ATTEMPTS};

use super::{Stage, Turn};
use crate::detection::{ALERT, CRITICAL, IMMINENT, SUSPICIOUS};
use crate::output::OutputLine;

/// Coarse detection status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DetectionBand {
    /// Below every threshold.
    Quiet,
    /// Monitoring increased.
    Suspicious,
    /// Countermeasures online.
    Alert,
    /// Trace protocols active.
    Critical,
    /// About to be caught.
    Imminent,
}

/// Band for a detection level.
pub fn band(detection: u32) -> DetectionBand {
    match detection {
        d if d >= IMMINENT => DetectionBand::Imminent,
        d if d >= CRITICAL => DetectionBand::Critical,
        d if d >= ALERT => DetectionBand::Alert,
        d if d >= SUSPICIOUS => DetectionBand::Suspicious,
        _ => DetectionBand::Quiet,
    }
}

/// Countdown banner for `remaining` operations.
pub fn doom_banner(remaining: u32) -> Vec<OutputLine> {
    if remaining <= 3 {
        vec![
            OutputLine::error(""),
            OutputLine::error(format!("▓▓▓ PURGE IN {remaining} ▓▓▓")),
            OutputLine::error(""),
        ]
    } else {
        vec![
            OutputLine::warning(""),
            OutputLine::warning(format!("[PURGE COUNTDOWN: {remaining}]")),
        ]
    }
}

#[derive(Debug)]
pub(super) struct DoomBanner;

impl Stage for DoomBanner {
    fn name(&self) -> &'static str {
        "doom_banner"
    }

    fn run(&self, turn: &mut Turn<'_, '_>) {
        if !turn.before.terrible_mistake_triggered {
            return;
        }
        let after = turn.after();
        if after.is_game_over || after.session_doom_countdown == 0 {
            return;
        }
        turn.result.output.extend(doom_banner(after.session_doom_countdown));
    }
}

fn band_banner(band: DetectionBand) -> Vec<OutputLine> {
    match band {
        DetectionBand::Quiet => Vec::new(),
        DetectionBand::Suspicious => vec![
            OutputLine::system(""),
            OutputLine::warning("────────────────────────────────────────"),
            OutputLine::warning("  STATUS: SUSPICIOUS"),
            OutputLine::warning("  System monitoring increased."),
            OutputLine::warning("────────────────────────────────────────"),
        ],
        DetectionBand::Alert => vec![
            OutputLine::system(""),
            OutputLine::error("════════════════════════════════════════"),
            OutputLine::error("  STATUS: ALERT"),
            OutputLine::warning("  Active countermeasures online."),
            OutputLine::error("════════════════════════════════════════"),
            OutputLine::system(""),
            OutputLine::ufo74(">> careful. theyre paying attention now. <<"),
        ],
        DetectionBand::Critical => vec![
            OutputLine::system(""),
            OutputLine::error("▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓"),
            OutputLine::error("  STATUS: CRITICAL"),
            OutputLine::error("  Trace protocols active."),
            OutputLine::error("▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓"),
            OutputLine::system(""),
            OutputLine::ufo74(">> STOP. youre about to get burned. <<"),
            OutputLine::ufo74(">> use \"wait\" to lay low. you have limited uses. <<"),
        ],
        DetectionBand::Imminent => vec![
            OutputLine::system(""),
            OutputLine::error("▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓"),
            OutputLine::error("  STATUS: IMMINENT DETECTION"),
            OutputLine::error("  Countermeasures locking on."),
            OutputLine::error("▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓"),
            OutputLine::system(""),
            OutputLine::ufo74(">> EMERGENCY. type \"hide\" NOW. one chance. <<"),
        ],
    }
}

#[derive(Debug)]
pub(super) struct DetectionBanners;

impl Stage for DetectionBanners {
    fn name(&self) -> &'static str {
        "detection_banners"
    }

    fn run(&self, turn: &mut Turn<'_, '_>) {
        let after = turn.after();
        let (from, to) = (band(turn.before.detection_level), band(after.detection_level));
        if to <= from || after.detection_level >= MAX_DETECTION {
            return;
        }
        tracing::info!(?to, detection = after.detection_level, "detection_band_crossed");
        turn.result.output.extend(band_banner(to));
        if to >= DetectionBand::Critical {
            turn.result.trigger_flicker = true;
        }
        if to == DetectionBand::Imminent {
            turn.result.patch.hide_available = Some(true);
        }
    }
}

fn terminal_block(headline: &str, body: &[&str]) -> Vec<OutputLine> {
    let bar = "▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓";
    let mut out = vec![
        OutputLine::error(""),
        OutputLine::error(bar),
        OutputLine::error(""),
        OutputLine::error(format!("  {headline}")),
        OutputLine::error(""),
    ];
    out.extend(body.iter().map(|l| OutputLine::error(format!("  {l}"))));
    out.extend([OutputLine::error(""), OutputLine::error(bar), OutputLine::error("")]);
    out
}

fn force_ending(turn: &mut Turn<'_, '_>, reason: &str, block: Vec<OutputLine>) {
    tracing::warn!(reason, command = turn.command, "game_over");
    turn.result.output = block;
    turn.result.patch.game_over(reason);
    turn.result.trigger_flicker = true;
}

#[derive(Debug)]
pub(super) struct DetectionCeiling;

impl Stage for DetectionCeiling {
    fn name(&self) -> &'static str {
        "detection_ceiling"
    }

    fn run(&self, turn: &mut Turn<'_, '_>) {
        let after = turn.after();
        if after.detection_level < MAX_DETECTION || after.is_game_over {
            return;
        }
        let block = terminal_block(
            "INTRUSION DETECTED",
            &[
                "Your connection has been traced.",
                "Security protocols have been dispatched.",
                "",
                ">> SESSION TERMINATED <<",
            ],
        );
        force_ending(turn, "INTRUSION DETECTED - TRACED", block);
    }
}

#[derive(Debug)]
pub(super) struct WrongAttempts;

impl Stage for WrongAttempts {
    fn name(&self) -> &'static str {
        "wrong_attempts"
    }

    fn run(&self, turn: &mut Turn<'_, '_>) {
        let after: GameState = turn.after();
        if after.wrong_attempts < MAX_INVALID_ATTEMPTS || after.is_game_over {
            return;
        }
        let block = terminal_block(
            "TERMINAL LOCKOUT",
            &[
                "Too many failed authentication attempts.",
                "Session terminated by security protocol.",
            ],
        );
        force_ending(turn, "TERMINAL LOCKOUT - AUTHENTICATION FAILURE", block);
    }
}

/// Reason recorded when the invalid-attempt counter reaches its threshold.
pub const ALERT_THRESHOLD_REASON: &str = "INVALID ATTEMPT THRESHOLD";

#[derive(Debug)]
pub(super) struct AlertThreshold;

impl Stage for AlertThreshold {
    fn name(&self) -> &'static str {
        "alert_threshold"
    }

    fn run(&self, turn: &mut Turn<'_, '_>) {
        let after = turn.after();
        if after.legacy_alert_counter < MAX_INVALID_ATTEMPTS || after.is_game_over {
            return;
        }
        let block = terminal_block(
            "INVALID ATTEMPT THRESHOLD EXCEEDED",
            &["SYSTEM LOCKDOWN INITIATED", "", ">> SESSION TERMINATED <<"],
        );
        force_ending(turn, ALERT_THRESHOLD_REASON, block);
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::turn_through;
    use super::*;
    use crate::output::CommandResult;
    use crate::testing::playing;

    fn raised_to(detection: u32) -> CommandResult {
        let mut result = CommandResult::default();
        result.patch.detection_level = Some(detection);
        result
    }

    #[test]
    fn bands() {
        assert_eq!(band(49), DetectionBand::Quiet);
        assert_eq!(band(50), DetectionBand::Suspicious);
        assert_eq!(band(84), DetectionBand::Alert);
        assert_eq!(band(85), DetectionBand::Critical);
        assert_eq!(band(99), DetectionBand::Imminent);
    }

    #[test]
    fn banner_only_on_crossing() {
        let mut state = playing();
        state.detection_level = 45;
        let crossed = turn_through(&DetectionBanners, "ls", &[], &state, raised_to(52), 0);
        assert!(crossed.mentions("STATUS: SUSPICIOUS"));

        state.detection_level = 55;
        let inside = turn_through(&DetectionBanners, "ls", &[], &state, raised_to(60), 0);
        assert!(inside.output.is_empty());
    }

    #[test]
    fn jump_shows_highest_band_and_offers_hide() {
        let mut state = playing();
        state.detection_level = 40;
        let result = turn_through(&DetectionBanners, "ls", &[], &state, raised_to(93), 0);
        assert!(result.mentions("IMMINENT DETECTION"));
        assert!(!result.mentions("SUSPICIOUS"));
        assert_eq!(result.patch.hide_available, Some(true));
        assert!(result.trigger_flicker);
    }

    #[test]
    fn ceiling_ends_the_run() {
        let state = playing();
        let mut handler = raised_to(100);
        handler.output.push(OutputLine::output("file text"));
        let result = turn_through(&DetectionCeiling, "open", &[], &state, handler, 0);
        assert!(result.mentions("INTRUSION DETECTED"));
        assert!(!result.mentions("file text"));
        let next = result.patch.apply_to(&state);
        assert_eq!(next.game_over_reason.as_deref(), Some("INTRUSION DETECTED - TRACED"));
    }

    #[test]
    fn earlier_ending_keeps_its_reason() {
        let state = playing();
        let mut handler = raised_to(100);
        handler.patch.game_over("SECURITY LOCKDOWN");
        handler.patch.wrong_attempts = Some(9);
        let after_ceiling = turn_through(&DetectionCeiling, "override", &[], &state, handler, 0);
        let after_lockout = turn_through(&WrongAttempts, "override", &[], &state, after_ceiling, 0);
        let next = after_lockout.patch.apply_to(&state);
        assert_eq!(next.game_over_reason.as_deref(), Some("SECURITY LOCKDOWN"));
    }

    #[test]
    fn countdown_banner_styles() {
        assert!(doom_banner(5)[1].content.contains("[PURGE COUNTDOWN: 5]"));
        assert!(doom_banner(2)[1].content.contains("PURGE IN 2"));
    }

    #[test]
    fn countdown_banner_needs_running_countdown() {
        let mut state = playing();
        state.terrible_mistake_triggered = true;
        state.session_doom_countdown = 4;
        let result = turn_through(&DoomBanner, "ls", &[], &state, CommandResult::default(), 0);
        assert!(result.mentions("[PURGE COUNTDOWN: 4]"));

        let fresh = turn_through(&DoomBanner, "ls", &[], &playing(), CommandResult::default(), 0);
        assert!(fresh.output.is_empty());
    }

    #[test]
    fn alert_threshold_ends_the_run_from_any_handler() {
        let mut state = playing();
        state.legacy_alert_counter = 7;
        let mut handler = CommandResult::with_output(vec![OutputLine::error("ERROR: FILE NOT FOUND")]);
        handler.patch.legacy_alert_counter = Some(8);
        let result = turn_through(&AlertThreshold, "open", &[], &state, handler, 0);
        assert!(result.mentions("INVALID ATTEMPT THRESHOLD EXCEEDED"));
        let next = result.patch.apply_to(&state);
        assert!(next.is_game_over);
        assert_eq!(next.game_over_reason.as_deref(), Some(ALERT_THRESHOLD_REASON));
    }

    #[test]
    fn alert_threshold_keeps_earlier_reason() {
        let state = playing();
        let mut handler = CommandResult::default();
        handler.patch.legacy_alert_counter = Some(8);
        handler.patch.game_over("SECURITY LOCKDOWN - AUTHENTICATION FAILURE");
        let result = turn_through(&AlertThreshold, "override", &[], &state, handler, 0);
        let next = result.patch.apply_to(&state);
        assert_eq!(next.game_over_reason.as_deref(), Some("SECURITY LOCKDOWN - AUTHENTICATION FAILURE"));
    }
}
