//! Tips and penalties for unrecognised input.
//!
//! Tips are an ordered table of `(predicate, lines)` rules; the first rule
//! whose predicate matches the command word wins.

use t96_core::GameState;
use t96_core::state::MAX_INVALID_ATTEMPTS;

use crate::output::{CommandResult, OutputLine};

const NAV_WORDS: &[&str] = &[
    "storage", "ops", "comms", "admin", "tmp", "assets", "quarantine", "prato", "exo", "psi",
    "internal",
];

struct TipRule {
    matches: fn(&str) -> bool,
    lines: fn(&str, &[String]) -> Vec<String>,
}

const TIP_RULES: &[TipRule] = &[
    TipRule {
        matches: |c| matches!(c, "dir" | "list" | "show"),
        lines: |_, _| vec!["To list directory contents, use: ls".into()],
    },
    TipRule {
        matches: |c| c.contains('/') || NAV_WORDS.contains(&c),
        lines: |c, _| {
            vec![
                "Navigation requires an explicit directory change.".into(),
                format!("Use: cd {c}"),
            ]
        },
    },
    TipRule {
        matches: |c| c.contains('.'),
        lines: |c, _| {
            vec![
                "To read a file, use the open command.".into(),
                format!("Use: open {c}"),
            ]
        },
    },
    TipRule {
        matches: |c| matches!(c, "read" | "view" | "cat" | "type" | "more"),
        lines: |_, args| {
            let target = args.first().map_or("<filename>", String::as_str);
            vec![format!("Use: open {target}")]
        },
    },
    TipRule {
        matches: |c| matches!(c, "quit" | "exit" | "logout" | "bye"),
        lines: |_, _| {
            vec![
                "There is no clean way out of this terminal.".into(),
                "Use: save to preserve your session.".into(),
            ]
        },
    },
    TipRule {
        matches: |c| matches!(c, "unlock" | "access" | "sudo" | "admin"),
        lines: |_, _| {
            vec![
                "Elevated access requires protocol override.".into(),
                "Use: override protocol <CODE>".into(),
                "WARNING: High risk operation.".into(),
            ]
        },
    },
    TipRule {
        matches: |c| matches!(c, "back" | "up" | ".."),
        lines: |_, _| vec!["Use: cd ..".into()],
    },
    TipRule {
        matches: |c| matches!(c, "info" | "about" | "whoami" | "who"),
        lines: |_, _| {
            vec![
                "Use: status to view session information.".into(),
                "Use: help to list available commands.".into(),
            ]
        },
    },
];

/// Contextual tip for an unrecognised command word.
pub fn command_tip(command: &str, args: &[String]) -> Vec<OutputLine> {
    let body = TIP_RULES
        .iter()
        .find(|rule| (rule.matches)(command))
        .map(|rule| (rule.lines)(command, args))
        .unwrap_or_else(|| {
            vec![
                format!("Command not recognized: {command}"),
                "Use: help to list available commands.".into(),
                "Use: ls to list files. Use: cd to change directory.".into(),
            ]
        });
    let mut out = vec![OutputLine::blank(), OutputLine::system("TIP:")];
    out.extend(body.into_iter().map(OutputLine::system));
    out.push(OutputLine::blank());
    out
}

fn lockdown(alerts: u32) -> CommandResult {
    let mut result = CommandResult::with_output(vec![
        OutputLine::blank(),
        OutputLine::error("CRITICAL: INVALID ATTEMPT THRESHOLD EXCEEDED"),
        OutputLine::error("SYSTEM LOCKDOWN INITIATED"),
        OutputLine::blank(),
        OutputLine::error("SESSION TERMINATED"),
        OutputLine::blank(),
    ]);
    result.patch.legacy_alert_counter = Some(alerts);
    result.patch.game_over("INVALID ATTEMPT THRESHOLD");
    tracing::warn!(alerts, "invalid_attempt_lockdown");
    result
}

fn risk_lines(alerts: u32) -> Vec<OutputLine> {
    let mut out = vec![
        OutputLine::warning("⚠ RISK INCREASED: Invalid commands draw system attention."),
        OutputLine::warning(format!("   [Invalid attempts: {alerts}/{MAX_INVALID_ATTEMPTS}]")),
    ];
    if alerts == 3 {
        out.extend([
            OutputLine::blank(),
            OutputLine::ufo74("UFO74: hey kid, youre fumbling. let me help."),
            OutputLine::ufo74("       ls lists files. cd changes directory. open reads."),
            OutputLine::ufo74("       type help if youre lost."),
        ]);
    } else if alerts >= 5 {
        out.extend([
            OutputLine::blank(),
            OutputLine::ufo74("UFO74: careful. too many mistakes and theyll lock you out."),
        ]);
    }
    out
}

/// Penalty for a command word that names no handler.
pub fn unknown_command(command: &str, args: &[String], state: &GameState) -> CommandResult {
    let alerts = state.legacy_alert_counter + 1;
    if alerts >= MAX_INVALID_ATTEMPTS {
        return lockdown(alerts);
    }
    let mut output = command_tip(command, args);
    output.extend(risk_lines(alerts));
    let mut result = CommandResult::with_output(output);
    result.patch.legacy_alert_counter = Some(alerts);
    result.patch.detection_level = Some(state.detection_plus(2));
    result
}

/// Penalty for a recognised command used in an invalid form.
pub fn invalid_command(name: &str, state: &GameState) -> CommandResult {
    let alerts = state.legacy_alert_counter + 1;
    if alerts >= MAX_INVALID_ATTEMPTS {
        return lockdown(alerts);
    }
    let headline = if name.is_empty() {
        "ERROR: Unknown command".to_string()
    } else {
        format!("Unknown command: {name}")
    };
    let mut output = vec![OutputLine::error(headline), OutputLine::blank()];
    output.extend(risk_lines(alerts));
    let mut result = CommandResult::with_output(output);
    result.patch.legacy_alert_counter = Some(alerts);
    result.patch.detection_level = Some(state.detection_plus(2));
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tip_text(command: &str) -> String {
        command_tip(command, &[])
            .into_iter()
            .map(|l| l.content)
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn tips_follow_rule_order() {
        assert!(tip_text("dir").contains("use: ls"));
        assert!(tip_text("storage").contains("Use: cd storage"));
        assert!(tip_text("/ops").contains("Use: cd /ops"));
        assert!(tip_text("readme.txt").contains("Use: open readme.txt"));
        assert!(tip_text("sudo").contains("override protocol"));
        assert!(tip_text("xyzzy").contains("Command not recognized: xyzzy"));
    }

    #[test]
    fn read_tip_uses_argument() {
        let tip = command_tip("cat", &["memo.txt".to_string()]);
        assert!(tip.iter().any(|l| l.content == "Use: open memo.txt"));
    }

    #[test]
    fn unknown_command_increments_alerts() {
        let state = GameState::new(1);
        let result = unknown_command("xyzzy", &[], &state);
        assert_eq!(result.patch.legacy_alert_counter, Some(1));
        assert_eq!(result.patch.detection_level, Some(2));
        assert!(result.mentions("[Invalid attempts: 1/8]"));
        assert_eq!(result.patch.is_game_over, None);
    }

    #[test]
    fn eighth_invalid_attempt_locks_down() {
        let mut state = GameState::new(1);
        state.legacy_alert_counter = 7;
        let result = invalid_command("", &state);
        assert_eq!(result.patch.is_game_over, Some(true));
        assert!(
            result
                .patch
                .game_over_reason
                .clone()
                .flatten()
                .is_some_and(|r| r.contains("THRESHOLD"))
        );
    }
}
