//! Commentary from the hacker contact after a file is read or decrypted.
//!
//! At most one block per command, queued in `pending_ufo74` so the host
//! shows it once the file has finished printing. The contact speaks a
//! limited number of times per run, never twice within a short window,
//! and says goodbye on the last appearance.

use t96_core::{FileStatus, GameState, TruthCategory, flag};

use super::{Stage, Turn};
use crate::context::Rolls;
use crate::output::{EntryKind, OutputLine};

/// Blocks per run.
pub const MAX_COMMENTS: u32 = 12;
/// Minimum wall-clock gap between blocks, in milliseconds.
pub const COMMENT_GAP_MS: u64 = 15_000;
/// Chance to speak after an ordinary read.
const ROUTINE_CHANCE: f64 = 0.2;
/// Chance to react to an ordinary file once speaking.
const REACT_CHANCE: f64 = 0.7;
/// Chance to remark on the order of discoveries.
const ORDER_CHANCE: f64 = 0.6;

fn ufo(lines: &[&str]) -> Vec<OutputLine> {
    lines.iter().map(|l| OutputLine::ufo74(*l)).collect()
}

fn explain(category: TruthCategory) -> &'static str {
    match category {
        TruthCategory::DebrisRelocation => "UFO74: physical debris confirmed.",
        TruthCategory::BeingContainment => "UFO74: bio specimens confirmed.",
        TruthCategory::TelepathicScouts => "UFO74: communication evidence.",
        TruthCategory::InternationalActors => "UFO74: international involvement.",
        TruthCategory::Transition2026 => "UFO74: 2026 timeline.",
    }
}

fn notice_line(notice: &str) -> Option<&'static str> {
    if let Some(cat) = TruthCategory::ALL.into_iter().find(|c| notice.contains(c.label())) {
        return Some(explain(cat));
    }
    if notice.contains("verification") {
        return Some("UFO74: two pieces confirm each other.");
    }
    if notice.contains("threshold") {
        return Some("UFO74: almost there.");
    }
    None
}

/// Explanation of the first notice the contact recognises.
pub fn explain_notices(notices: &[&str]) -> Option<Vec<OutputLine>> {
    let line = notices.iter().find_map(|n| notice_line(n))?;
    Some(vec![
        OutputLine::system(""),
        OutputLine::warning(">> UFO74 <<"),
        OutputLine::system(""),
        OutputLine::ufo74(line),
        OutputLine::system(""),
    ])
}

struct PathRule {
    needles: &'static [&'static str],
    lines: &'static [&'static str],
}

const PATH_RULES: &[PathRule] = &[
    PathRule {
        needles: &["autopsy", "medical"],
        lines: &["UFO74: autopsy report. not human."],
    },
    PathRule {
        needles: &["transport", "logistics", "manifest"],
        lines: &["UFO74: transport log. they split up the evidence."],
    },
    PathRule {
        needles: &["morse_intercept"],
        lines: &["UFO74: morse code. decipher it.", "       use: message <answer>"],
    },
    PathRule {
        needles: &["transcript", "psi", "comm"],
        lines: &["UFO74: they were communicating. telepathically."],
    },
    PathRule {
        needles: &["foreign", "liaison", "international"],
        lines: &["UFO74: other countries involved. coordinated cover-up."],
    },
    PathRule {
        needles: &["2026", "window", "transition", "threat"],
        lines: &["UFO74: 2026. something coming. thats why they buried it."],
    },
    PathRule {
        needles: &["bio", "containment", "quarantine"],
        lines: &["UFO74: containment. they captured them."],
    },
    PathRule {
        needles: &["crash", "debris", "material", "sample"],
        lines: &["UFO74: physical evidence. smoking gun."],
    },
    PathRule {
        needles: &["balloon", "drone", "aircraft_incident"],
        lines: &["UFO74: cover story. real stuff is encrypted."],
    },
];

struct OrderRule {
    found: TruthCategory,
    missing: TruthCategory,
    needles: &'static [&'static str],
    line: &'static str,
}

const ORDER_RULES: &[OrderRule] = &[
    OrderRule {
        found: TruthCategory::TelepathicScouts,
        missing: TruthCategory::BeingContainment,
        needles: &["bio", "containment", "quarantine"],
        line: "UFO74: telepathy + captured... did they CHOOSE this?",
    },
    OrderRule {
        found: TruthCategory::InternationalActors,
        missing: TruthCategory::Transition2026,
        needles: &["2026", "window", "transition"],
        line: "UFO74: all countries agreed on 2026? bigger than politics.",
    },
    OrderRule {
        found: TruthCategory::DebrisRelocation,
        missing: TruthCategory::BeingContainment,
        needles: &["autopsy", "specimen", "bio"],
        line: "UFO74: ship pieces first, now the CREW. someone survived.",
    },
    OrderRule {
        found: TruthCategory::BeingContainment,
        missing: TruthCategory::InternationalActors,
        needles: &["liaison", "diplomatic", "foreign"],
        line: "UFO74: captured alive, then SHARED? whos coordinating this?",
    },
    OrderRule {
        found: TruthCategory::Transition2026,
        missing: TruthCategory::TelepathicScouts,
        needles: &["psi", "telepat", "neural"],
        line: "UFO74: knew about 2026 before reading minds? or did THEY tell us?",
    },
];

fn order_remark(path: &str, state: &GameState) -> Option<&'static str> {
    ORDER_RULES
        .iter()
        .find(|r| {
            state.truths_discovered.contains(&r.found)
                && !state.truths_discovered.contains(&r.missing)
                && r.needles.iter().any(|n| path.contains(n))
        })
        .map(|r| r.line)
}

const LOCKED_LINES: &[&[&str]] = &[
    &["UFO74: encrypted. use decrypt <filename>.", "       password is probably in another file."],
    &["UFO74: locked. find the password in other docs."],
    &["UFO74: encrypted. important stuff. crack it."],
];
const FLEEING_LINES: &[&[&str]] = &[
    &["UFO74: hearing noises. stay alert."],
    &["UFO74: my connection dropped. footsteps upstairs.", "       i live alone."],
    &["UFO74: van outside. finish fast."],
];
const NERVOUS_LINES: &[&[&str]] = &[&["UFO74: youre deep now. its real."], &["UFO74: be careful with this info."]];
const ROUTINE_LINES: &[&[&str]] = &[
    &["UFO74: interesting. keep digging."],
    &["UFO74: good. every file matters."],
    &["UFO74: noted. try /ops, /storage, /comms."],
];
const GOODBYE: &[&str] = &[
    "UFO74: someones at my door.",
    "       not police. they dont knock like that.",
    "UFO74: tell everyone what you found.",
    "       goodbye hackerkid.",
];

fn pick_block(rolls: &mut Rolls, blocks: &[&[&str]]) -> Vec<OutputLine> {
    rolls.pick(blocks).map(|b| ufo(b)).unwrap_or_default()
}

/// What the contact knows about the file just read.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadFacts {
    /// First unstable file of the run.
    pub first_unstable: bool,
    /// Still encrypted and opened without decrypting.
    pub locked: bool,
}

/// Reaction to `path`: a remark on the order of discoveries, then the
/// unstable and locked special cases, then the file's subject, then mood.
pub fn file_reaction(path: &str, facts: ReadFacts, state: &GameState, rolls: &mut Rolls) -> Vec<OutputLine> {
    let lowered = path.to_lowercase();
    if let Some(line) = order_remark(&lowered, state).filter(|_| rolls.roll() < ORDER_CHANCE) {
        return ufo(&[line]);
    }
    if facts.first_unstable {
        return ufo(&["UFO74: UNSTABLE file. increases risk but worth it."]);
    }
    if facts.locked {
        return pick_block(rolls, LOCKED_LINES);
    }
    if let Some(rule) = PATH_RULES.iter().find(|r| r.needles.iter().any(|n| lowered.contains(n))) {
        return ufo(rule.lines);
    }
    let count = state.incognito_message_count;
    if state.truth_count() >= 4 || count >= 9 {
        return pick_block(rolls, FLEEING_LINES);
    }
    if state.truth_count() >= 3 || count >= 6 {
        return pick_block(rolls, NERVOUS_LINES);
    }
    pick_block(rolls, ROUTINE_LINES)
}

#[derive(Debug)]
pub(super) struct Commentary;

impl Stage for Commentary {
    fn name(&self) -> &'static str {
        "commentary"
    }

    fn run(&self, turn: &mut Turn<'_, '_>) {
        if !turn.is(&["open", "decrypt"]) || turn.failed() {
            return;
        }
        let Some(path) = turn.result.target_file.clone() else {
            return;
        };
        let before = turn.before;
        let fs = turn.ctx.fs;
        let Some(file) = fs.get_file(&path, before) else {
            return;
        };
        let after = turn.after();
        if after.is_game_over {
            return;
        }

        let facts = ReadFacts {
            first_unstable: file.status == FileStatus::Unstable && !before.flag(flag::SEEN_UNSTABLE_WARNING),
            locked: file.status == FileStatus::Encrypted && !after.mutation(&path).is_some_and(|m| m.decrypted),
        };
        if facts.first_unstable {
            turn.result.patch.set_flag(flag::SEEN_UNSTABLE_WARNING);
        }

        let count = before.incognito_message_count;
        if count >= MAX_COMMENTS {
            return;
        }
        let now = turn.ctx.now_ms;
        if before.last_incognito_trigger != 0 && now.saturating_sub(before.last_incognito_trigger) < COMMENT_GAP_MS {
            return;
        }

        let discovery = turn.result.mentions("EVIDENCE FOUND");
        if !discovery && !facts.first_unstable && turn.ctx.rolls.roll() > ROUTINE_CHANCE {
            return;
        }

        let notices: Vec<&str> = if facts.locked {
            Vec::new()
        } else {
            turn.result
                .output
                .iter()
                .filter(|l| l.kind == EntryKind::Notice)
                .map(|l| l.content.as_str())
                .filter(|c| ["NOTICE:", "MEMO FLAG:", "SYSTEM:", "Category:"].iter().any(|m| c.contains(m)))
                .collect()
        };

        let block = if count + 1 == MAX_COMMENTS {
            Some(ufo(GOODBYE))
        } else if let Some(explained) = (!facts.first_unstable).then(|| explain_notices(&notices)).flatten() {
            Some(explained)
        } else if facts.locked || facts.first_unstable || turn.ctx.rolls.roll() < REACT_CHANCE {
            Some(file_reaction(&path, facts, before, &mut turn.ctx.rolls))
        } else {
            None
        };
        let Some(block) = block.filter(|b| !b.is_empty()) else {
            return;
        };

        tracing::debug!(path, count = count + 1, "commentary");
        turn.result.pending_ufo74.extend(block);
        turn.result.patch.incognito_message_count = Some(count + 1);
        turn.result.patch.last_incognito_trigger = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::turn_through;
    use super::*;
    use crate::output::CommandResult;
    use crate::testing::playing;

    fn read_of(path: &str, extra: Vec<OutputLine>) -> CommandResult {
        let mut result = CommandResult::with_output(extra);
        result.target_file = Some(path.to_string());
        result
    }

    fn discovery() -> Vec<OutputLine> {
        vec![
            OutputLine::notice("║           EVIDENCE FOUND                  ║"),
            OutputLine::notice("  Category: DEBRIS TRANSFER"),
        ]
    }

    #[test]
    fn discovery_is_explained() {
        let result = turn_through(
            &Commentary,
            "open",
            &["x"],
            &playing(),
            read_of("/storage/assets/transport_log_96.txt", discovery()),
            100_000,
        );
        assert!(result.pending_ufo74.iter().any(|l| l.content == "UFO74: physical debris confirmed."));
        assert_eq!(result.patch.incognito_message_count, Some(1));
        assert_eq!(result.patch.last_incognito_trigger, Some(100_000));
        assert_eq!(result.output.len(), 2);
    }

    #[test]
    fn rate_limited_by_wall_clock() {
        let mut state = playing();
        state.incognito_message_count = 1;
        state.last_incognito_trigger = 100_000;
        let soon = turn_through(&Commentary, "open", &[], &state, read_of("/storage/assets/transport_log_96.txt", discovery()), 110_000);
        assert!(soon.pending_ufo74.is_empty());
        let later = turn_through(&Commentary, "open", &[], &state, read_of("/storage/assets/transport_log_96.txt", discovery()), 115_000);
        assert!(!later.pending_ufo74.is_empty());
    }

    #[test]
    fn last_appearance_says_goodbye_then_silence() {
        let mut state = playing();
        state.incognito_message_count = MAX_COMMENTS - 1;
        let bye = turn_through(&Commentary, "open", &[], &state, read_of("/storage/assets/transport_log_96.txt", discovery()), 1);
        assert!(bye.pending_ufo74.iter().any(|l| l.content.contains("goodbye hackerkid")));

        state.incognito_message_count = MAX_COMMENTS;
        let gone = turn_through(&Commentary, "open", &[], &state, read_of("/storage/assets/transport_log_96.txt", discovery()), 1);
        assert!(gone.pending_ufo74.is_empty());
        assert!(gone.patch.incognito_message_count.is_none());
    }

    #[test]
    fn failed_reads_and_other_commands_are_ignored() {
        let failed = read_of("/storage/assets/transport_log_96.txt", vec![OutputLine::error("ERROR: x")]);
        assert!(turn_through(&Commentary, "open", &[], &playing(), failed, 1).pending_ufo74.is_empty());
        let other = read_of("/storage/assets/transport_log_96.txt", discovery());
        assert!(turn_through(&Commentary, "ls", &[], &playing(), other, 1).pending_ufo74.is_empty());
    }

    #[test]
    fn path_reactions_and_special_cases() {
        let state = playing();
        let mut rolls = Rolls::new(3);
        let plain = ReadFacts::default();
        let autopsy = file_reaction("/ops/autopsy_notes.txt", plain, &state, &mut rolls);
        assert_eq!(autopsy[0].content, "UFO74: autopsy report. not human.");

        let unstable = ReadFacts {
            first_unstable: true,
            locked: false,
        };
        let warned = file_reaction("/ops/autopsy_notes.txt", unstable, &state, &mut rolls);
        assert!(warned[0].content.contains("UNSTABLE"));

        let locked = ReadFacts {
            first_unstable: false,
            locked: true,
        };
        let lines = file_reaction("/storage/x.enc", locked, &state, &mut rolls);
        assert!(lines.iter().any(|l| l.content.contains("encrypted") || l.content.contains("locked")));
    }

    #[test]
    fn notice_explanations() {
        assert!(explain_notices(&["SYSTEM: Independent verification detected."]).is_some());
        assert!(explain_notices(&["nothing here"]).is_none());
    }
}
