//! Ending variants of a successful leak.
//!
//! Three choices made during a run pick one of eight endings: whether the
//! wider conspiracy files went out with the evidence, whether the
//! surviving subject was released, and whether the player authenticated
//! against the neural link. Neural endings carry an extra personal
//! aftermath block.

use t96_core::{GameState, flag};

use crate::output::OutputLine;

const RULE: &str = "═══════════════════════════════════════════════════════════";

/// The choices that select an [`Ending`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EndingFlags {
    /// The conspiracy files were leaked along with the evidence.
    pub conspiracy_files_leaked: bool,
    /// The surviving subject was released.
    pub prisoner46_released: bool,
    /// The neural link accepted the player.
    pub neural_link_authenticated: bool,
}

impl EndingFlags {
    /// Read the choices recorded in `state`.
    pub fn from_state(state: &GameState) -> Self {
        Self {
            conspiracy_files_leaked: state.flag(flag::CONSPIRACY_FILES_LEAKED),
            prisoner46_released: state.flag(flag::PRISONER46_RELEASED),
            neural_link_authenticated: state.flag(flag::NEURAL_LINK_AUTHENTICATED),
        }
    }
}

/// One of the eight ways a leak can end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ending {
    /// Clean leak; the world argues and moves on.
    ControlledDisclosure,
    /// Everything leaked; institutions fall.
    GlobalPanic,
    /// The released subject speaks for itself.
    UndeniableConfirmation,
    /// Everything leaked and the subject released.
    TotalCollapse,
    /// Clean leak, but the link left something behind.
    PersonalContamination,
    /// Everything leaked, seen through the link.
    ParanoidAwakening,
    /// The subject released, understood through the link.
    WitnessedTruth,
    /// All three.
    CompleteRevelation,
}

impl Ending {
    /// Every variant.
    pub const ALL: [Ending; 8] = [
        Ending::ControlledDisclosure,
        Ending::GlobalPanic,
        Ending::UndeniableConfirmation,
        Ending::TotalCollapse,
        Ending::PersonalContamination,
        Ending::ParanoidAwakening,
        Ending::WitnessedTruth,
        Ending::CompleteRevelation,
    ];

    /// Pick the variant for a set of choices.
    pub fn determine(flags: EndingFlags) -> Self {
        let EndingFlags {
            conspiracy_files_leaked: leaked,
            prisoner46_released: released,
            neural_link_authenticated: linked,
        } = flags;
        match (leaked, released, linked) {
            (true, true, true) => Self::CompleteRevelation,
            (false, true, true) => Self::WitnessedTruth,
            (true, false, true) => Self::ParanoidAwakening,
            (false, false, true) => Self::PersonalContamination,
            (true, true, false) => Self::TotalCollapse,
            (false, true, false) => Self::UndeniableConfirmation,
            (true, false, false) => Self::GlobalPanic,
            (false, false, false) => Self::ControlledDisclosure,
        }
    }

    /// Display title.
    pub fn title(self) -> &'static str {
        match self {
            Self::ControlledDisclosure => "CONTROLLED DISCLOSURE",
            Self::GlobalPanic => "GLOBAL PANIC",
            Self::UndeniableConfirmation => "UNDENIABLE CONFIRMATION",
            Self::TotalCollapse => "TOTAL COLLAPSE",
            Self::PersonalContamination => "PERSONAL CONTAMINATION",
            Self::ParanoidAwakening => "PARANOID AWAKENING",
            Self::WitnessedTruth => "WITNESSED TRUTH",
            Self::CompleteRevelation => "COMPLETE REVELATION",
        }
    }

    /// Game-over reason recorded for the variant.
    pub fn reason(self) -> String {
        format!("ENDING: {}", self.title())
    }

    fn world(self) -> &'static [&'static str] {
        match self {
            Self::ControlledDisclosure => &[
                "The leak held the headlines for two weeks.",
                "Anchors debated. Experts argued. Officials deflected.",
                "Brasilia asked for \"historical context\". The embassy said nothing.",
                "By the third week another scandal had the front pages.",
                "But the files are still out there. Archived. Waiting.",
            ],
            Self::GlobalPanic => &[
                "You leaked everything, not only Varginha.",
                "The memos, the surveillance programs, the experiments.",
                "The world did not debate. It erupted.",
                "Governments fell within months. Markets followed.",
                "Six months later, martial law in twelve countries.",
            ],
            Self::UndeniableConfirmation => &[
                "Three days later the surviving subject appeared on live television.",
                "No debate. No denial. It stood there, alive.",
                "\"We were sent to observe. You were never alone.\"",
                "Governments could not deny what everyone could see.",
                "Contact protocols were drafted within weeks.",
            ],
            Self::TotalCollapse => &[
                "You gave them the files, the witness and every dark secret.",
                "The testimony confirmed the worst fears.",
                "The conspiracy files confirmed every suspicion.",
                "The subject spoke of preparation while the streets burned.",
                "The visitors withdrew. \"Not ready. Another thirty rotations.\"",
            ],
            Self::PersonalContamination => &[
                "The leak succeeded. The world debates. Business as usual.",
                "But you connected to it. You felt thoughts that were not yours.",
                "Sometimes, in quiet moments, you still hear it.",
                "You released the truth to the world.",
                "Something else was released into you.",
            ],
            Self::ParanoidAwakening => &[
                "The conspiracy files detonated. Varginha added fuel.",
                "Through the chaos you feel connected. You see the pattern.",
                "The thirty-year cycles. The preparation. The harvest.",
                "You try to warn people. Nobody listens to someone who hears voices.",
                "You know too much, and it is driving you mad.",
            ],
            Self::WitnessedTruth => &[
                "The released subject addressed the world. Contact was made.",
                "When it speaks you hear what the translators miss.",
                "You know what \"harvest\" really means.",
                "You know what happens in thirty rotations.",
                "The world celebrates. You carry the weight alone.",
            ],
            Self::CompleteRevelation => &[
                "Everything was revealed: the evidence, the witness, the files.",
                "Old institutions crumbled overnight. New ones rose.",
                "The subject spoke. Through the link, you understood it completely.",
                "The transition scheduled for 2026 came early.",
                "The harvest became a negotiation, and you are the one negotiating.",
            ],
        }
    }

    fn personal(self) -> Option<(&'static str, &'static [&'static str])> {
        match self {
            Self::PersonalContamination => Some((
                "▓▓▓ NEURAL ECHO DETECTED ▓▓▓",
                &["...your pattern is archived...", "...thirty rotations from now...", "...you will recognize us..."],
            )),
            Self::ParanoidAwakening => Some((
                "▓▓▓ NEURAL CONTAMINATION ACTIVE ▓▓▓",
                &["...the chaos is necessary...", "...they will call you insane...", "...but you see clearly now..."],
            )),
            Self::WitnessedTruth => Some((
                "▓▓▓ NEURAL RESONANCE ACTIVE ▓▓▓",
                &["...you alone understand...", "...you are the bridge now...", "...this is your burden..."],
            )),
            Self::CompleteRevelation => Some((
                "▓▓▓ FULL INTEGRATION ACHIEVED ▓▓▓",
                &["...you are no longer only human...", "...the bridge is permanent now...", "...welcome, hackerkid..."],
            )),
            _ => None,
        }
    }

    fn epilogue(self) -> &'static str {
        match self {
            Self::ControlledDisclosure => "The disclosure succeeded. Some believe. Most dismiss.",
            Self::GlobalPanic => "Truth without wisdom is just another weapon.",
            Self::UndeniableConfirmation => "The testimony silenced all doubt.",
            Self::TotalCollapse => "Humanity could not bear the weight.",
            Self::PersonalContamination => "The truth is out there. So is your passenger.",
            Self::ParanoidAwakening => "Now you see everything.",
            Self::WitnessedTruth => "You are humanity's first true ambassador.",
            Self::CompleteRevelation => "Everything exposed. Everything connected. Everything changed.",
        }
    }

    /// Aftermath screen for the variant.
    pub fn lines(self) -> Vec<OutputLine> {
        let mut out = vec![
            OutputLine::blank(),
            OutputLine::warning(RULE),
            OutputLine::notice("                  THE WORLD AFTER"),
            OutputLine::warning(RULE),
            OutputLine::blank(),
        ];
        out.extend(self.world().iter().map(|l| OutputLine::output(*l)));
        if let Some((header, whispers)) = self.personal() {
            out.extend([OutputLine::blank(), OutputLine::error(header), OutputLine::blank()]);
            out.extend(whispers.iter().map(|l| OutputLine::warning(*l)));
        }
        out.extend([
            OutputLine::blank(),
            OutputLine::warning(RULE),
            OutputLine::output(self.epilogue()),
            OutputLine::blank(),
            OutputLine::notice(format!(">> {} <<", self.reason())),
            OutputLine::blank(),
        ]);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::EntryKind;

    fn flags(leaked: bool, released: bool, linked: bool) -> EndingFlags {
        EndingFlags {
            conspiracy_files_leaked: leaked,
            prisoner46_released: released,
            neural_link_authenticated: linked,
        }
    }

    #[test]
    fn every_combination_has_its_own_ending() {
        let mut seen = Vec::new();
        for bits in 0..8u8 {
            let ending = Ending::determine(flags(bits & 1 != 0, bits & 2 != 0, bits & 4 != 0));
            assert!(!seen.contains(&ending), "{ending:?} reached twice");
            seen.push(ending);
        }
        assert_eq!(seen.len(), Ending::ALL.len());
    }

    #[test]
    fn choices_map_to_named_endings() {
        assert_eq!(Ending::determine(EndingFlags::default()), Ending::ControlledDisclosure);
        assert_eq!(Ending::determine(flags(true, false, false)), Ending::GlobalPanic);
        assert_eq!(Ending::determine(flags(false, false, true)), Ending::PersonalContamination);
        assert_eq!(Ending::determine(flags(true, true, true)), Ending::CompleteRevelation);
    }

    #[test]
    fn only_neural_endings_show_the_personal_aftermath() {
        for ending in Ending::ALL {
            let lines = ending.lines();
            let has_echo = lines.iter().any(|l| l.kind == EntryKind::Error && l.content.contains("▓▓▓"));
            let linked = matches!(
                ending,
                Ending::PersonalContamination | Ending::ParanoidAwakening | Ending::WitnessedTruth | Ending::CompleteRevelation
            );
            assert_eq!(has_echo, linked, "{ending:?}");
            assert!(lines.iter().any(|l| l.content == format!(">> ENDING: {} <<", ending.title())));
        }
    }

    #[test]
    fn flags_are_read_from_state() {
        let mut state = GameState::without_tutorial(1);
        state.flags.set(flag::NEURAL_LINK_AUTHENTICATED, true);
        state.flags.set(flag::PRISONER46_RELEASED, true);
        assert_eq!(Ending::determine(EndingFlags::from_state(&state)), Ending::WitnessedTruth);
    }
}
