//! The per-run game state record.
//!
//! [`GameState`] is owned by the host and replaced wholesale after every
//! command. The engine never mutates it in place: handlers describe their
//! changes as a [`crate::StatePatch`].

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::truth::{TRUTH_COUNT, TruthCategory};

/// Upper bound of the detection scale; reaching it ends the run.
pub const MAX_DETECTION: u32 = 100;
/// Upper bound of the hostility scale.
pub const MAX_HOSTILITY: u8 = 5;
/// Access level granted by a successful override.
pub const MAX_ACCESS: u32 = 5;
/// Invalid attempts before lockdown.
pub const MAX_INVALID_ATTEMPTS: u32 = 8;
/// Invalid attempts after which no command is accepted at all.
pub const HARD_STOP_ATTEMPTS: u32 = 10;

/// Well-known keys of the [`Flags`] bag.
pub mod flag {
    /// Administrative archive unlocked through the override.
    pub const ADMIN_UNLOCKED: &str = "adminUnlocked";
    /// The forbidden-knowledge branch was taken.
    pub const FORBIDDEN_KNOWLEDGE: &str = "forbiddenKnowledge";
    /// The neural link command is available.
    pub const SCOUT_LINK_UNLOCKED: &str = "scoutLinkUnlocked";
    /// The neural link accepted its authentication phrase.
    pub const NEURAL_LINK_AUTHENTICATED: &str = "neuralLinkAuthenticated";
    /// The neural link has no queries left.
    pub const SCOUT_LINK_EXHAUSTED: &str = "scoutLinkExhausted";
    /// The first `cd` tip was shown.
    pub const FIRST_CD_DONE: &str = "firstCdDone";
    /// The unstable-file warning was shown.
    pub const SEEN_UNSTABLE_WARNING: &str = "seenUnstableWarning";
    /// Thirty commands have been issued.
    pub const EARLY_WINDOW_PASSED: &str = "earlyWindowPassed";
    /// The override suggestion was shown.
    pub const OVERRIDE_SUGGESTED: &str = "overrideSuggested";
    /// Files from three or more archive categories were read.
    pub const READ_MULTIPLE_CATEGORIES: &str = "readMultipleCategories";
    /// Four truth categories are documented.
    pub const NEAR_VICTORY: &str = "nearVictory";
    /// All truth categories are documented.
    pub const ALL_EVIDENCE_COLLECTED: &str = "allEvidenceCollected";
    /// The player read the official cover story.
    pub const DISINFORMATION_DISCOVERED: &str = "disinformationDiscovered";
    /// The morse intercept was opened.
    pub const MORSE_FILE_READ: &str = "morseFileRead";
    /// The morse message was solved.
    pub const MORSE_DECIPHERED: &str = "morseDeciphered";
    /// The reconstruction script ran successfully.
    pub const SCRIPT_EXECUTED: &str = "scriptExecuted";
    /// A save was requested through the `save` command.
    pub const SAVE_REQUESTED: &str = "saveRequested";
    /// The session ended by archiving a complete case.
    pub const SESSION_ARCHIVED: &str = "sessionArchived";
    /// The evidence bundle was sealed and copied off-site.
    pub const EVIDENCES_SAVED: &str = "evidencesSaved";
    /// The `leak` command ran with a complete evidence set.
    pub const LEAK_ATTEMPTED: &str = "leakAttempted";
    /// The leak included the wider conspiracy files.
    pub const CONSPIRACY_FILES_LEAKED: &str = "conspiracyFilesLeaked";
    /// The surviving subject was released (set by the host).
    pub const PRISONER46_RELEASED: &str = "prisoner46Released";
    /// The trace purge script has run.
    pub const TRACE_PURGE_USED: &str = "tracePurgeUsed";
    /// The encoded transmission was decoded.
    pub const CIPHER_DECODED: &str = "cipherDecoded";
    /// Extra exploration tips are switched off.
    pub const TIPS_DISABLED: &str = "tipsDisabled";
}

/// Open-ended bag of narrative and unlock booleans.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Flags(BTreeMap<String, bool>);

impl Flags {
    /// Whether `key` is set to `true`.
    pub fn has(&self, key: &str) -> bool {
        self.0.get(key).copied().unwrap_or(false)
    }

    /// Whether every key in `keys` is set.
    pub fn has_all<S: AsRef<str>>(&self, keys: &[S]) -> bool {
        keys.iter().all(|k| self.has(k.as_ref()))
    }

    /// Set `key` to `value`.
    pub fn set(&mut self, key: impl Into<String>, value: bool) {
        self.0.insert(key.into(), value);
    }

    /// Iterate over all recorded flags.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &bool)> {
        self.0.iter()
    }
}

/// Per-file overlay on top of the authored filesystem.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileMutation {
    /// Line indices replaced with a data-loss marker.
    pub corrupted_lines: Vec<usize>,
    /// Whether the decrypted fragment is available.
    pub decrypted: bool,
    /// Whether the file refuses to open.
    pub locked: bool,
    /// Whether the file is gone from listings.
    pub deleted: bool,
    /// Line index cut short with a corruption marker.
    pub truncated_line: Option<usize>,
}

/// A timestamped player note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerNote {
    /// Note text.
    pub note: String,
    /// Creation time, milliseconds since the Unix epoch.
    pub timestamp: i64,
}

/// Steps of the guided onboarding sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TutorialStep {
    /// Boot banner; input locked.
    #[default]
    Intro,
    /// Waiting for `ls`.
    LsPrompt,
    /// Waiting for `cd files`.
    CdPrompt,
    /// Waiting for `open cafeteria_menu`.
    OpenPrompt,
    /// Showing the opened file; input locked.
    FileDisplay,
    /// Waiting for `cd ..`.
    CdBackPrompt,
    /// Waiting for `ls` again.
    LsReinforce,
    /// Closing briefing; input locked.
    TutorialEnd,
    /// Onboarding finished; normal dispatch.
    GameActive,
}

impl TutorialStep {
    /// Whether this step accepts player input.
    pub fn accepts_input(self) -> bool {
        matches!(
            self,
            Self::LsPrompt | Self::CdPrompt | Self::OpenPrompt | Self::CdBackPrompt | Self::LsReinforce
        )
    }
}

/// Onboarding progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TutorialState {
    /// Current step.
    pub current: TutorialStep,
    /// Invalid inputs in the current step.
    pub fail_count: u32,
    /// Whether the step's nudge was shown.
    pub nudge_shown: bool,
    /// Whether input is ignored.
    pub input_locked: bool,
    /// Whether the step's dialogue finished printing.
    pub dialogue_complete: bool,
}

impl Default for TutorialState {
    fn default() -> Self {
        Self {
            current: TutorialStep::Intro,
            fail_count: 0,
            nudge_shown: false,
            input_locked: true,
            dialogue_complete: false,
        }
    }
}

/// Complete state of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameState {
    /// Absolute working directory.
    pub current_path: String,
    /// Clearance level gating nodes.
    pub access_level: u32,
    /// Risk score in `[0, 100]`.
    pub detection_level: u32,
    /// Archive integrity.
    pub data_integrity: u32,
    /// Connection stability.
    pub session_stability: u32,
    /// Invalid commands and failed authentications.
    pub legacy_alert_counter: u32,
    /// Failed authentications of any kind.
    pub wrong_attempts: u32,
    /// Documented evidence categories.
    pub truths_discovered: BTreeSet<TruthCategory>,
    /// Per-file overlay keyed by absolute path.
    pub file_mutations: BTreeMap<String, FileMutation>,
    /// Narrative and unlock booleans.
    pub flags: Flags,
    /// One-shot events that already fired.
    pub singular_events_triggered: BTreeSet<String>,
    /// System personality degradation, 0-5.
    pub system_hostility_level: u8,
    /// Seed fixed at run creation.
    pub seed: u32,
    /// Threaded state for sequential rolls.
    pub rng_state: u32,
    /// Whether the run has ended.
    pub is_game_over: bool,
    /// Why the run ended.
    pub game_over_reason: Option<String>,
    /// Commands dispatched this run.
    pub session_command_count: u32,
    /// Command count at the last meaningful action.
    pub last_meaningful_action: u32,
    /// Wandering nudges shown.
    pub wandering_notice_count: u32,
    /// Commentary blocks shown.
    pub incognito_message_count: u32,
    /// Wall-clock time of the last commentary block, in milliseconds.
    pub last_incognito_trigger: u64,
    /// Wrong override codes.
    pub override_failed_attempts: u32,
    /// Whether the forbidden-knowledge branch was taken.
    pub terrible_mistake_triggered: bool,
    /// Operations left before the purge.
    pub session_doom_countdown: u32,
    /// File awaiting a security answer.
    pub pending_decrypt_file: Option<String>,
    /// Whether the Turing evaluation is waiting for an answer.
    pub turing_evaluation_active: bool,
    /// Whether the Turing evaluation was passed.
    pub turing_evaluation_completed: bool,
    /// Index of the current Turing question.
    pub turing_evaluation_index: usize,
    /// Files opened at least once.
    pub files_read: BTreeSet<String>,
    /// Most recently opened file.
    pub last_opened_file: Option<String>,
    /// Archive categories read.
    pub categories_read: BTreeSet<String>,
    /// Images already displayed.
    pub images_shown: BTreeSet<String>,
    /// Videos already displayed.
    pub videos_shown: BTreeSet<String>,
    /// Previous directories for `back`.
    pub navigation_history: Vec<String>,
    /// Remaining uses of `wait`.
    pub wait_uses_remaining: u32,
    /// Whether `hide` is offered.
    pub hide_available: bool,
    /// Player notes.
    pub player_notes: Vec<PlayerNote>,
    /// Bookmarked file paths.
    pub bookmarked_files: BTreeSet<String>,
    /// Questions asked to Prisoner 45.
    pub prisoner45_questions_asked: u32,
    /// Whether Prisoner 45 is gone.
    pub prisoner45_disconnected: bool,
    /// Prisoner 45 responses already given.
    pub prisoner45_used_responses: BTreeSet<String>,
    /// Queries sent through the neural link.
    pub scout_links_used: u32,
    /// Neural link responses already given.
    pub scout_link_used_responses: BTreeSet<String>,
    /// Whether the firewall threat is active (driven by the host).
    pub firewall_active: bool,
    /// Whether the firewall threat was disarmed.
    pub firewall_disarmed: bool,
    /// Watching firewall eyes (driven by the host).
    pub firewall_eyes: u32,
    /// Wrong morse answers.
    pub morse_message_attempts: u32,
    /// Hidden commands mentioned in read files.
    pub hidden_commands_discovered: BTreeSet<String>,
    /// Wrong `decode` attempts.
    pub cipher_attempts: u32,
    /// Whether an active trace is running against the session.
    pub trace_spike_active: bool,
    /// Passwords mentioned in read files.
    pub passwords_found: BTreeSet<String>,
    /// Decoy files opened.
    pub traps_triggered: BTreeSet<String>,
    /// Whether the decoy warning was shown.
    pub trap_warning_given: bool,
    /// Files that supplied each evidence category.
    pub evidence_states: BTreeMap<TruthCategory, Vec<String>>,
    /// Evidence links the host reports the player drew.
    pub evidence_links: u32,
    /// Narrative paranoia.
    pub paranoia_level: u32,
    /// Whether a rival investigator was noticed.
    pub rival_investigator_active: bool,
    /// `status` invocations.
    pub status_command_count: u32,
    /// Onboarding progress.
    pub tutorial: TutorialState,
    /// Whether onboarding finished.
    pub tutorial_complete: bool,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(1)
    }
}

impl GameState {
    /// Fresh state for a new run with the given seed.
    pub fn new(seed: u32) -> Self {
        Self {
            current_path: "/".to_string(),
            access_level: 1,
            detection_level: 0,
            data_integrity: 100,
            session_stability: 100,
            legacy_alert_counter: 0,
            wrong_attempts: 0,
            truths_discovered: BTreeSet::new(),
            file_mutations: BTreeMap::new(),
            flags: Flags::default(),
            singular_events_triggered: BTreeSet::new(),
            system_hostility_level: 0,
            seed,
            rng_state: seed,
            is_game_over: false,
            game_over_reason: None,
            session_command_count: 0,
            last_meaningful_action: 0,
            wandering_notice_count: 0,
            incognito_message_count: 0,
            last_incognito_trigger: 0,
            override_failed_attempts: 0,
            terrible_mistake_triggered: false,
            session_doom_countdown: 0,
            pending_decrypt_file: None,
            turing_evaluation_active: false,
            turing_evaluation_completed: false,
            turing_evaluation_index: 0,
            files_read: BTreeSet::new(),
            last_opened_file: None,
            categories_read: BTreeSet::new(),
            images_shown: BTreeSet::new(),
            videos_shown: BTreeSet::new(),
            navigation_history: Vec::new(),
            wait_uses_remaining: 3,
            hide_available: false,
            player_notes: Vec::new(),
            bookmarked_files: BTreeSet::new(),
            prisoner45_questions_asked: 0,
            prisoner45_disconnected: false,
            prisoner45_used_responses: BTreeSet::new(),
            scout_links_used: 0,
            scout_link_used_responses: BTreeSet::new(),
            firewall_active: false,
            firewall_disarmed: false,
            firewall_eyes: 0,
            morse_message_attempts: 0,
            hidden_commands_discovered: BTreeSet::new(),
            cipher_attempts: 0,
            trace_spike_active: false,
            passwords_found: BTreeSet::new(),
            traps_triggered: BTreeSet::new(),
            trap_warning_given: false,
            evidence_states: BTreeMap::new(),
            evidence_links: 0,
            paranoia_level: 0,
            rival_investigator_active: false,
            status_command_count: 0,
            tutorial: TutorialState::default(),
            tutorial_complete: false,
        }
    }

    /// Fresh state that skips onboarding.
    pub fn without_tutorial(seed: u32) -> Self {
        let mut state = Self::new(seed);
        state.tutorial = TutorialState {
            current: TutorialStep::GameActive,
            input_locked: false,
            dialogue_complete: true,
            ..TutorialState::default()
        };
        state.tutorial_complete = true;
        state
    }

    /// Number of documented categories.
    pub fn truth_count(&self) -> usize {
        self.truths_discovered.len()
    }

    /// Whether every category is documented.
    pub fn is_victory(&self) -> bool {
        self.truth_count() == TRUTH_COUNT
    }

    /// Shorthand for `self.flags.has(key)`.
    pub fn flag(&self, key: &str) -> bool {
        self.flags.has(key)
    }

    /// Mutation record for `path`, if any.
    pub fn mutation(&self, path: &str) -> Option<&FileMutation> {
        self.file_mutations.get(path)
    }

    /// Whether onboarding still owns input.
    pub fn in_onboarding(&self) -> bool {
        !self.tutorial_complete && self.tutorial.current != TutorialStep::GameActive
    }

    /// Detection raised by `amount`, clamped at the ceiling.
    pub fn detection_plus(&self, amount: u32) -> u32 {
        self.detection_level.saturating_add(amount).min(MAX_DETECTION)
    }

    /// Detection lowered by `amount`, clamped at zero.
    pub fn detection_minus(&self, amount: u32) -> u32 {
        self.detection_level.saturating_sub(amount)
    }

    /// Hostility raised by `amount`, clamped at the ceiling.
    pub fn hostility_plus(&self, amount: u8) -> u8 {
        self.system_hostility_level.saturating_add(amount).min(MAX_HOSTILITY)
    }

    /// Clamp bounded fields into range.
    pub fn clamp(&mut self) {
        self.detection_level = self.detection_level.min(MAX_DETECTION);
        self.system_hostility_level = self.system_hostility_level.min(MAX_HOSTILITY);
    }
}
