//! Truth-progress bookkeeping after a file is read.

use std::collections::BTreeSet;

use t96_core::{GameState, StatePatch, TRUTH_COUNT, TruthCategory, flag};

use crate::output::OutputLine;

/// Notices and state changes produced by newly revealed categories.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TruthProgress {
    /// Lines announcing the discoveries.
    pub notices: Vec<OutputLine>,
    /// State changes for the discoveries.
    pub patch: StatePatch,
}

impl TruthProgress {
    /// Whether any category was newly documented.
    pub fn is_discovery(&self) -> bool {
        !self.notices.is_empty()
    }
}

/// Merge the categories revealed by `path` into the documented set.
///
/// Already-documented categories are ignored, so reading a file twice
/// never announces anything.
pub fn check_truth_progress(state: &GameState, reveals: &[TruthCategory], path: &str) -> TruthProgress {
    let mut progress = TruthProgress::default();
    if reveals.is_empty() {
        return progress;
    }

    let mut evidence = state.evidence_states.clone();
    for cat in reveals {
        let linked = evidence.entry(*cat).or_default();
        if !linked.iter().any(|p| p == path) {
            linked.push(path.to_string());
        }
    }
    progress.patch.evidence_states = Some(evidence);

    let fresh: Vec<TruthCategory> = reveals
        .iter()
        .copied()
        .filter(|c| !state.truths_discovered.contains(c))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    if fresh.is_empty() {
        return progress;
    }

    let mut truths = state.truths_discovered.clone();
    truths.extend(fresh.iter().copied());
    let before = state.truth_count();
    let after = truths.len();
    tracing::info!(before, after, path, "evidence_documented");

    for cat in &fresh {
        progress.notices.extend([
            OutputLine::blank(),
            OutputLine::notice("╔═══════════════════════════════════════════╗"),
            OutputLine::notice("║           EVIDENCE FOUND                  ║"),
            OutputLine::notice("╠═══════════════════════════════════════════╣"),
            OutputLine::blank(),
            OutputLine::notice(format!("  Category: {}", cat.label())),
            OutputLine::blank(),
            OutputLine::ufo74("  HINT: Keep searching for more evidence"),
            OutputLine::blank(),
            OutputLine::notice("╚═══════════════════════════════════════════╝"),
        ]);
    }
    progress.notices.extend([
        OutputLine::blank(),
        OutputLine::system("[System recalibrating... attention momentarily diverted]"),
    ]);

    match after {
        1 if before == 0 => progress
            .notices
            .push(OutputLine::ufo74("UFO74: nice find! keep digging.")),
        2 => progress
            .notices
            .push(OutputLine::notice("SYSTEM: Independent verification detected.")),
        4 => progress
            .notices
            .push(OutputLine::notice("NOTICE: Documentation threshold approaching.")),
        TRUTH_COUNT => progress.notices.extend([
            OutputLine::notice("▓▓▓ ALL EVIDENCE CATEGORIES DOCUMENTED ▓▓▓"),
            OutputLine::ufo74("UFO74: all five confirmed. save the session NOW."),
        ]),
        _ => {}
    }

    if after >= 4 {
        progress.patch.set_flag(flag::NEAR_VICTORY);
    }
    if after >= TRUTH_COUNT {
        progress.patch.set_flag(flag::ALL_EVIDENCE_COLLECTED);
    }
    progress.patch.truths_discovered = Some(truths);
    progress
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_discovery_announced() {
        let state = GameState::new(1);
        let progress = check_truth_progress(&state, &[TruthCategory::DebrisRelocation], "/a");
        assert!(progress.is_discovery());
        assert!(progress.notices.iter().any(|l| l.content.contains("DEBRIS TRANSFER")));
        assert!(progress.notices.iter().any(|l| l.content.contains("nice find")));
        assert_eq!(progress.patch.truths_discovered.as_ref().map(|t| t.len()), Some(1));
    }

    #[test]
    fn repeat_reveal_is_silent() {
        let mut state = GameState::new(1);
        state.truths_discovered.insert(TruthCategory::DebrisRelocation);
        let progress = check_truth_progress(&state, &[TruthCategory::DebrisRelocation], "/a");
        assert!(!progress.is_discovery());
        assert!(progress.patch.truths_discovered.is_none());
    }

    #[test]
    fn fifth_category_sets_flags() {
        let mut state = GameState::new(1);
        for cat in TruthCategory::ALL.into_iter().take(4) {
            state.truths_discovered.insert(cat);
        }
        let progress = check_truth_progress(&state, &[TruthCategory::Transition2026], "/b");
        assert!(progress.notices.iter().any(|l| l.content.contains("ALL EVIDENCE")));
        let next = progress.patch.apply_to(&state);
        assert!(next.is_victory());
        assert!(next.flag(flag::ALL_EVIDENCE_COLLECTED));
        assert!(next.flag(flag::NEAR_VICTORY));
    }
}
