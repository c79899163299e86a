//! System hostility: risky commands and high detection make the terminal
//! colder, and a cold terminal stops offering help. Players who switched
//! tips off with `tutorial off` lose the tip lines at any level.

use t96_core::{GameState, flag};

use super::{Stage, Turn};
use crate::output::{EntryKind, OutputLine};

/// Level at which hint lines are filtered.
pub const FILTER_LEVEL: u8 = 3;
/// Level at which usage lines are dropped and long lines cut.
pub const TERSE_LEVEL: u8 = 4;

const TRUNCATE_OVER: usize = 40;
const TRUNCATE_TO: usize = 35;

/// Hostility gained by `command`, given the state before it ran and the
/// hostility it already reached this turn.
pub fn increase(command: &str, before: &GameState, current: u8) -> u8 {
    match command {
        "trace" | "recover" => return 1,
        "override" => return 2,
        "decrypt" => return u8::from(before.detection_level > 50),
        _ => {}
    }
    let detection = before.detection_level;
    let climbs = (detection >= 80 && current < 4) || (detection >= 60 && current < 3) || (detection >= 40 && current < 2);
    u8::from(climbs)
}

fn cold(content: &str, level: u8) -> Option<String> {
    let lowered = content.to_lowercase();
    if lowered.contains("tip:") || lowered.contains("hint:") {
        return None;
    }
    if level >= TERSE_LEVEL {
        if lowered.contains("use:") {
            return None;
        }
        if content.chars().count() > TRUNCATE_OVER {
            let cut: String = content.chars().take(TRUNCATE_TO).collect();
            return Some(format!("{cut}..."));
        }
        return Some(content.to_string());
    }
    match content.strip_suffix('.') {
        Some(rest) if !rest.ends_with('.') => Some(rest.to_string()),
        _ => Some(content.to_string()),
    }
}

/// Strip helpful text from `lines` at hostility `level`.
///
/// File content and input echoes pass through untouched, and blank lines
/// are kept for spacing.
pub fn filter_hints(lines: Vec<OutputLine>, level: u8) -> Vec<OutputLine> {
    if level < FILTER_LEVEL {
        return lines;
    }
    lines
        .into_iter()
        .filter_map(|line| {
            if line.content.is_empty() || matches!(line.kind, EntryKind::File | EntryKind::Input) {
                return Some(line);
            }
            cold(&line.content, level).map(|content| OutputLine { content, ..line })
        })
        .collect()
}

/// Drop `TIP:` lines, keeping file content.
pub fn drop_tips(lines: Vec<OutputLine>) -> Vec<OutputLine> {
    lines
        .into_iter()
        .filter(|line| line.kind == EntryKind::File || !line.content.trim_start().starts_with("TIP:"))
        .collect()
}

#[derive(Debug)]
pub(super) struct Hostility;

impl Stage for Hostility {
    fn name(&self) -> &'static str {
        "hostility"
    }

    fn run(&self, turn: &mut Turn<'_, '_>) {
        let current = turn.after().system_hostility_level;
        let gained = increase(turn.command, turn.before, current);
        let level = if gained > 0 {
            let level = current.saturating_add(gained).min(t96_core::state::MAX_HOSTILITY);
            turn.result.patch.system_hostility_level = Some(level);
            tracing::debug!(level, command = turn.command, "hostility_raised");
            level
        } else {
            current
        };
        let mut output = std::mem::take(&mut turn.result.output);
        if turn.after().flag(flag::TIPS_DISABLED) {
            output = drop_tips(output);
        }
        turn.result.output = filter_hints(output, level);
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::turn_through;
    use super::*;
    use crate::lines;
    use crate::output::CommandResult;
    use crate::testing::playing;

    fn contents(lines: &[OutputLine]) -> Vec<&str> {
        lines.iter().map(|l| l.content.as_str()).collect()
    }

    #[test]
    fn risky_commands_raise_hostility() {
        let mut state = playing();
        assert_eq!(increase("trace", &state, 0), 1);
        assert_eq!(increase("override", &state, 0), 2);
        assert_eq!(increase("decrypt", &state, 0), 0);
        assert_eq!(increase("ls", &state, 0), 0);
        state.detection_level = 51;
        assert_eq!(increase("decrypt", &state, 0), 1);
    }

    #[test]
    fn detection_raises_hostility_up_to_a_band() {
        let mut state = playing();
        state.detection_level = 45;
        assert_eq!(increase("ls", &state, 1), 1);
        assert_eq!(increase("ls", &state, 2), 0);
        state.detection_level = 85;
        assert_eq!(increase("ls", &state, 3), 1);
        assert_eq!(increase("ls", &state, 4), 0);
    }

    #[test]
    fn low_hostility_leaves_output_alone() {
        let out = lines![system => "TIP:", system => "Use: ls."];
        assert_eq!(filter_hints(out.clone(), 2), out);
    }

    #[test]
    fn level_three_drops_tips_and_periods() {
        let out = lines![
            system => "TIP:",
            output => "",
            system => "Use: cd storage.",
            ufo74 => "UFO74: hint: look closer",
            file => "Content line.",
            output => "wait...",
        ];
        assert_eq!(
            contents(&filter_hints(out, 3)),
            ["", "Use: cd storage", "Content line.", "wait..."]
        );
    }

    #[test]
    fn level_four_is_terse() {
        let out = lines![
            system => "Use: help to list available commands.",
            output => "This line is definitely longer than forty characters.",
            output => "short.",
        ];
        assert_eq!(
            contents(&filter_hints(out, 4)),
            ["This line is definitely longer than...", "short."]
        );
    }

    #[test]
    fn stage_filters_with_new_level() {
        let mut state = playing();
        state.system_hostility_level = 2;
        let handler = CommandResult::with_output(lines![system => "TIP:", output => "Tracing."]);
        let result = turn_through(&Hostility, "trace", &[], &state, handler, 0);
        assert_eq!(result.patch.system_hostility_level, Some(3));
        assert_eq!(contents(&result.output), ["Tracing"]);
    }

    #[test]
    fn raise_uses_detection_before_the_command() {
        let mut state = playing();
        state.detection_level = 30;
        let mut handler = CommandResult::default();
        handler.patch.detection_level = Some(45);
        let result = turn_through(&Hostility, "ls", &[], &state, handler, 0);
        assert_eq!(result.patch.system_hostility_level, None);

        state.detection_level = 45;
        let result = turn_through(&Hostility, "ls", &[], &state, CommandResult::default(), 0);
        assert_eq!(result.patch.system_hostility_level, Some(1));
    }

    #[test]
    fn switched_off_tips_are_dropped_at_any_level() {
        let mut state = playing();
        state.flags.set(flag::TIPS_DISABLED, true);
        let handler = CommandResult::with_output(lines![
            system => "TIP: Use \"ls\" to list files.",
            file => "TIP: printed on the memo",
            output => "Directory: /",
        ]);
        let result = turn_through(&Hostility, "ls", &[], &state, handler, 0);
        assert_eq!(contents(&result.output), ["TIP: printed on the memo", "Directory: /"]);
    }
}
