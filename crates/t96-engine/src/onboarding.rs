//! Guided onboarding: a linear chain of steps, each waiting for one exact
//! command inside a small sandbox before free play begins.

use t96_core::{GameState, StatePatch, TutorialState, TutorialStep};

use crate::output::{CommandResult, OutputLine};

/// Longest input the onboarding accepts.
pub const MAX_INPUT: usize = 64;
/// Failures in one step before its nudge appears.
pub const NUDGE_AFTER: u32 = 3;

const MENU: &str = "cafeteria_menu";

/// Sandbox root listing.
pub const ROOT_LISTING: [&str; 5] = ["/", "├── files/", "├── logs/", "├── system/", "└── admin/"];

/// Sandbox `/files` listing.
pub const FILES_LISTING: [&str; 3] = ["/files", "├── cafeteria_menu", "└── shift_schedule"];

const MENU_CONTENT: [&str; 11] = [
    "┌─────────────────────────────────────┐",
    "│  CAFETERIA MENU - WEEK 42          │",
    "├─────────────────────────────────────┤",
    "│  MON: Salisbury steak, mashed pot. │",
    "│  TUE: Fish sticks, coleslaw        │",
    "│  WED: Chicken fried rice           │",
    "│  THU: Beef tacos                   │",
    "│  FRI: Pizza day                    │",
    "├─────────────────────────────────────┤",
    "│  * Vegan options available daily   │",
    "└─────────────────────────────────────┘",
];

fn dialogue(step: TutorialStep) -> &'static [&'static str] {
    match step {
        TutorialStep::Intro => &[
            "[UFO74]: Connection established.",
            "[UFO74]: Listen carefully. I don't repeat myself.",
            "[UFO74]: You're inside their system. Don't panic.",
            "[UFO74]: I'll walk you through the basics.",
        ],
        TutorialStep::LsPrompt => &["[UFO74]: First, see what's here.", "[UFO74]: Type ls"],
        TutorialStep::CdPrompt => &[
            "[UFO74]: Good.",
            "[UFO74]: Now move into a folder.",
            "[UFO74]: Type cd files",
        ],
        TutorialStep::OpenPrompt => &[
            "[UFO74]: Two files. Neither matters, but let's look anyway.",
            "[UFO74]: Type open cafeteria_menu",
            "[UFO74]: Or type open c and press TAB to autocomplete.",
        ],
        TutorialStep::FileDisplay => &[
            "[UFO74]: Riveting.",
            "[UFO74]: Not everything you find will matter.",
            "[UFO74]: Learn to recognize what does.",
        ],
        TutorialStep::CdBackPrompt => &["[UFO74]: Now go back up.", "[UFO74]: Type cd .."],
        TutorialStep::LsReinforce => &["[UFO74]: Check where you are.", "[UFO74]: Run ls again."],
        TutorialStep::TutorialEnd => &[
            "[UFO74]: Good. You know enough.",
            "[UFO74]: Now the real thing.",
            "",
            "[UFO74]: Your mission: find 5 pieces of evidence.",
            "[UFO74]: Once you have them, leak everything.",
            "",
            "[UFO74]: But understand the risks.",
            "[UFO74]: Every action you take... they might notice.",
            "[UFO74]: Detection hits 100%, you're done. They'll find you.",
            "",
            "[UFO74]: And you only get 8 attempts.",
            "[UFO74]: Fail 8 times, the window closes. Permanently.",
            "",
            "[UFO74]: Some files are bait. Opening them spikes detection.",
            "[UFO74]: Some actions are loud. Others are quiet.",
            "[UFO74]: Curiosity has a cost here.",
            "",
            "[UFO74]: I've done what I can.",
            "[UFO74]: Good luck, kid.",
            "",
            "[UFO74]: ...",
        ],
        TutorialStep::GameActive => &[],
    }
}

/// The nudge shown once a step has failed [`NUDGE_AFTER`] times.
pub fn nudge(step: TutorialStep) -> Option<&'static str> {
    match step {
        TutorialStep::LsPrompt => Some("[UFO74]: Two letters. Lowercase. ls"),
        TutorialStep::CdPrompt => Some("[UFO74]: cd means change directory. cd files"),
        TutorialStep::OpenPrompt => Some("[UFO74]: open followed by the filename. Try the tab key."),
        TutorialStep::CdBackPrompt => Some("[UFO74]: Two dots. cd space dot dot."),
        TutorialStep::LsReinforce => Some("[UFO74]: Same command as before. ls"),
        _ => None,
    }
}

type Guess = (fn(&str) -> bool, &'static str);

/// Common wrong guesses per step, checked in order.
const CORRECTIONS: &[(TutorialStep, Guess)] = &[
    (TutorialStep::LsPrompt, (|n| n == "dir" || n == "list", "[UFO74]: Not DOS. ls.")),
    (TutorialStep::LsPrompt, (|n| n.starts_with("ls "), "[UFO74]: Just ls. Nothing after it.")),
    (TutorialStep::CdPrompt, (|n| n == "cd", "[UFO74]: cd where? Name the folder.")),
    (TutorialStep::CdPrompt, (|n| n == "files" || n == "files/", "[UFO74]: Folder names need cd in front.")),
    (TutorialStep::CdPrompt, (|n| n.starts_with("cd "), "[UFO74]: Wrong folder. files.")),
    (TutorialStep::CdPrompt, (|n| n == "ls", "[UFO74]: You already looked. Now move.")),
    (TutorialStep::OpenPrompt, (|n| n.starts_with("cat ") || n.starts_with("type ") || n.starts_with("read "), "[UFO74]: Here it's open.")),
    (TutorialStep::OpenPrompt, (|n| n == "open", "[UFO74]: open what?")),
    (TutorialStep::OpenPrompt, (|n| n.starts_with("open shift"), "[UFO74]: The other one. cafeteria_menu.")),
    (TutorialStep::OpenPrompt, (|n| n.starts_with("cd "), "[UFO74]: Stay here. Open the file.")),
    (TutorialStep::CdBackPrompt, (|n| n == "cd..", "[UFO74]: Space between cd and the dots.")),
    (TutorialStep::CdBackPrompt, (|n| n == "cd" || n == "cd /", "[UFO74]: Up one level. Two dots.")),
    (TutorialStep::LsReinforce, (|n| n == "dir" || n == "list", "[UFO74]: Not DOS. ls.")),
];

fn normalize(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

fn open_target(normalized: &str) -> Option<&str> {
    normalized.strip_prefix("open ").map(str::trim)
}

/// Whether `input` is the exact form the step is waiting for.
pub fn accepts(step: TutorialStep, input: &str, tab_pressed: bool) -> bool {
    let normalized = normalize(input);
    match step {
        TutorialStep::LsPrompt | TutorialStep::LsReinforce => normalized == "ls",
        TutorialStep::CdPrompt => normalized == "cd files",
        TutorialStep::OpenPrompt => match open_target(&normalized) {
            Some(MENU) => true,
            Some(prefix) => tab_pressed && !prefix.is_empty() && MENU.starts_with(prefix),
            None => false,
        },
        TutorialStep::CdBackPrompt => normalized == "cd ..",
        _ => false,
    }
}

/// Completion the host offers when tab is pressed during the open step.
pub fn autocomplete(step: TutorialStep, input: &str) -> Option<String> {
    if step != TutorialStep::OpenPrompt {
        return None;
    }
    let normalized = normalize(input);
    let prefix = open_target(&normalized)?;
    (!prefix.is_empty() && MENU.starts_with(prefix)).then(|| format!("open {MENU}"))
}

fn spoken(lines: &[&str]) -> Vec<OutputLine> {
    let mut out = vec![OutputLine::system("")];
    for line in lines {
        out.push(match *line {
            "" => OutputLine::system(""),
            l if l.starts_with("[UFO74]") => OutputLine::ufo74(l),
            l => OutputLine::system(l),
        });
    }
    out.push(OutputLine::system(""));
    out
}

fn listing(lines: &[&str]) -> Vec<OutputLine> {
    let mut out = vec![OutputLine::system("")];
    out.extend(lines.iter().map(|l| OutputLine::output(*l)));
    out.push(OutputLine::system(""));
    out
}

fn channel_banner(label: &str) -> [OutputLine; 3] {
    [
        OutputLine::ufo74("┌─────────────────────────────────────────────────────────┐"),
        OutputLine::ufo74(format!("│         >> ENCRYPTED CHANNEL {label:<27}│")),
        OutputLine::ufo74("└─────────────────────────────────────────────────────────┘"),
    ]
}

fn step_patch(next: TutorialStep) -> StatePatch {
    let mut patch = StatePatch::new();
    patch.tutorial = Some(TutorialState {
        current: next,
        fail_count: 0,
        nudge_shown: false,
        input_locked: !next.accepts_input() && next != TutorialStep::GameActive,
        dialogue_complete: true,
    });
    patch
}

/// Boot screen and the first prompt. Unlocks input at the `ls` step.
pub fn begin() -> CommandResult {
    let rule = "═══════════════════════════════════════════════════════════";
    let mut output = vec![
        OutputLine::system(""),
        OutputLine::system(rule),
        OutputLine::system("BRAZILIAN INTELLIGENCE LEGACY SYSTEM"),
        OutputLine::system("TERMINAL ACCESS POINT — NODE 7"),
        OutputLine::system(rule),
        OutputLine::system(""),
        OutputLine::system("SYSTEM DATE: JANUARY 1996"),
        OutputLine::system(""),
        OutputLine::system(""),
    ];
    output.extend(channel_banner("OPEN <<"));
    output.push(OutputLine::system(""));
    output.extend(dialogue(TutorialStep::Intro).iter().map(|l| OutputLine::ufo74(*l)));
    output.push(OutputLine::system(""));
    output.extend(spoken(dialogue(TutorialStep::LsPrompt)));

    let mut patch = step_patch(TutorialStep::LsPrompt);
    patch.current_path = Some("/".to_string());
    CommandResult::with_patch(output, patch)
}

fn closing_briefing() -> Vec<OutputLine> {
    let mut out = spoken(dialogue(TutorialStep::TutorialEnd));
    out.extend(channel_banner("CLOSED <<"));
    out.extend([
        OutputLine::system(""),
        OutputLine::system("[UFO74 has disconnected]"),
        OutputLine::system(""),
    ]);
    out
}

fn advance(step: TutorialStep) -> CommandResult {
    let (output, next, path) = match step {
        TutorialStep::LsPrompt => {
            let mut out = listing(&ROOT_LISTING);
            out.extend(spoken(dialogue(TutorialStep::CdPrompt)));
            (out, TutorialStep::CdPrompt, None)
        }
        TutorialStep::CdPrompt => {
            let mut out = listing(&FILES_LISTING);
            out.extend(spoken(dialogue(TutorialStep::OpenPrompt)));
            (out, TutorialStep::OpenPrompt, Some("/files"))
        }
        TutorialStep::OpenPrompt => {
            let mut out = vec![OutputLine::system("")];
            out.extend(MENU_CONTENT.iter().map(|l| OutputLine::file(*l)));
            out.push(OutputLine::system(""));
            out.extend(spoken(dialogue(TutorialStep::FileDisplay)));
            out.extend(spoken(dialogue(TutorialStep::CdBackPrompt)));
            (out, TutorialStep::CdBackPrompt, None)
        }
        TutorialStep::CdBackPrompt => {
            let mut out = listing(&["/>"]);
            out.extend(spoken(dialogue(TutorialStep::LsReinforce)));
            (out, TutorialStep::LsReinforce, Some("/"))
        }
        _ => {
            let mut out = listing(&ROOT_LISTING);
            out.extend(closing_briefing());
            (out, TutorialStep::GameActive, Some("/"))
        }
    };

    tracing::info!(from = ?step, to = ?next, "onboarding_step");
    let mut patch = step_patch(next);
    if let Some(path) = path {
        patch.current_path = Some(path.to_string());
    }
    if next == TutorialStep::GameActive {
        patch.tutorial_complete = Some(true);
    }
    CommandResult::with_patch(output, patch)
}

fn reject(input: &str, tutorial: &TutorialState) -> CommandResult {
    let step = tutorial.current;
    let normalized = normalize(input);
    let mut output = vec![OutputLine::error("INVALID INPUT")];
    if let Some((_, (_, hint))) = CORRECTIONS
        .iter()
        .find(|(s, (guess, _))| *s == step && guess(&normalized))
    {
        output.push(OutputLine::ufo74(*hint));
    }
    output.push(OutputLine::system(""));

    let fail_count = tutorial.fail_count + 1;
    let mut nudge_shown = tutorial.nudge_shown;
    let due = fail_count >= NUDGE_AFTER && !nudge_shown;
    if let Some(text) = nudge(step).filter(|_| due) {
        output.extend([OutputLine::ufo74(text), OutputLine::system("")]);
        nudge_shown = true;
    }
    tracing::debug!(?step, fail_count, "onboarding_rejected");

    let mut patch = StatePatch::new();
    patch.tutorial = Some(TutorialState {
        fail_count,
        nudge_shown,
        ..tutorial.clone()
    });
    CommandResult::with_patch(output, patch)
}

/// Feed one raw input line to the onboarding.
///
/// Locked steps and blank input are ignored. `tab_pressed` credits a
/// prefix of the menu file name during the open step.
pub fn handle_input(input: &str, state: &GameState, tab_pressed: bool) -> CommandResult {
    let tutorial = &state.tutorial;
    if !tutorial.current.accepts_input() || input.trim().is_empty() {
        return CommandResult::default();
    }
    if input.chars().count() > MAX_INPUT {
        return CommandResult::with_output(vec![OutputLine::error("INPUT TOO LONG"), OutputLine::system("")]);
    }
    if accepts(tutorial.current, input, tab_pressed) {
        advance(tutorial.current)
    } else {
        reject(input, tutorial)
    }
}
