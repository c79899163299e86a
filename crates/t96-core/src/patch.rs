//! Partial state updates produced by handlers and pipeline stages.

use std::collections::{BTreeMap, BTreeSet};

use crate::state::{FileMutation, GameState, MAX_DETECTION, MAX_HOSTILITY, PlayerNote, TutorialState};
use crate::truth::TruthCategory;

macro_rules! state_patch {
    ($( $(#[doc = $doc:literal])* $field:ident : $ty:ty ),* $(,)?) => {
        /// A partial update to [`GameState`].
        ///
        /// Scalar fields replace the state's value when `Some`. Flags,
        /// singular events and file mutations are layered on top of the
        /// existing collections instead.
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct StatePatch {
            $( $(#[doc = $doc])* pub $field: Option<$ty>, )*
            /// Flags to set, layered over the current bag.
            pub flags: BTreeMap<String, bool>,
            /// Singular events to mark as fired.
            pub singular_events: BTreeSet<String>,
            /// Replacement mutation records, per path.
            pub file_mutations: BTreeMap<String, FileMutation>,
        }

        impl StatePatch {
            /// Fold a later patch into this one; the later patch wins.
            pub fn merge(&mut self, later: StatePatch) {
                let StatePatch { $($field,)* flags, singular_events, file_mutations } = later;
                $( if $field.is_some() { self.$field = $field; } )*
                self.flags.extend(flags);
                self.singular_events.extend(singular_events);
                self.file_mutations.extend(file_mutations);
            }

            /// Whether the patch changes nothing.
            pub fn is_empty(&self) -> bool {
                $( self.$field.is_none() && )*
                    self.flags.is_empty()
                    && self.singular_events.is_empty()
                    && self.file_mutations.is_empty()
            }

            fn assign_fields(&self, next: &mut GameState) {
                $( if let Some(value) = &self.$field { next.$field = value.clone(); } )*
            }
        }
    };
}

state_patch! {
    /// New working directory.
    current_path: String,
    /// New clearance.
    access_level: u32,
    /// New detection level.
    detection_level: u32,
    /// New integrity.
    data_integrity: u32,
    /// New stability.
    session_stability: u32,
    /// New invalid-attempt count.
    legacy_alert_counter: u32,
    /// New wrong-attempt count.
    wrong_attempts: u32,
    /// Documented categories; merged as a union.
    truths_discovered: BTreeSet<TruthCategory>,
    /// New hostility; never lowers the current level.
    system_hostility_level: u8,
    /// Next threaded RNG state.
    rng_state: u32,
    /// Game-over marker.
    is_game_over: bool,
    /// Game-over reason.
    game_over_reason: Option<String>,
    /// Command counter.
    session_command_count: u32,
    /// Last meaningful action marker.
    last_meaningful_action: u32,
    /// Wandering nudges shown.
    wandering_notice_count: u32,
    /// Commentary blocks shown.
    incognito_message_count: u32,
    /// Time of the last commentary block.
    last_incognito_trigger: u64,
    /// Wrong override codes.
    override_failed_attempts: u32,
    /// Forbidden-knowledge marker.
    terrible_mistake_triggered: bool,
    /// Purge countdown.
    session_doom_countdown: u32,
    /// Pending decrypt slot.
    pending_decrypt_file: Option<String>,
    /// Turing evaluation running.
    turing_evaluation_active: bool,
    /// Turing evaluation passed.
    turing_evaluation_completed: bool,
    /// Current Turing question.
    turing_evaluation_index: usize,
    /// Files opened.
    files_read: BTreeSet<String>,
    /// Most recent file.
    last_opened_file: Option<String>,
    /// Archive categories read.
    categories_read: BTreeSet<String>,
    /// Images displayed.
    images_shown: BTreeSet<String>,
    /// Videos displayed.
    videos_shown: BTreeSet<String>,
    /// Directory history.
    navigation_history: Vec<String>,
    /// Remaining waits.
    wait_uses_remaining: u32,
    /// `hide` offered.
    hide_available: bool,
    /// Player notes.
    player_notes: Vec<PlayerNote>,
    /// Bookmarks.
    bookmarked_files: BTreeSet<String>,
    /// Prisoner 45 question count.
    prisoner45_questions_asked: u32,
    /// Prisoner 45 disconnected.
    prisoner45_disconnected: bool,
    /// Prisoner 45 responses used.
    prisoner45_used_responses: BTreeSet<String>,
    /// Neural link query count.
    scout_links_used: u32,
    /// Neural link responses used.
    scout_link_used_responses: BTreeSet<String>,
    /// Firewall active.
    firewall_active: bool,
    /// Firewall disarmed.
    firewall_disarmed: bool,
    /// Firewall eyes.
    firewall_eyes: u32,
    /// Wrong morse answers.
    morse_message_attempts: u32,
    /// Hidden commands found.
    hidden_commands_discovered: BTreeSet<String>,
    /// Wrong decode attempts.
    cipher_attempts: u32,
    /// Active trace running.
    trace_spike_active: bool,
    /// Passwords found.
    passwords_found: BTreeSet<String>,
    /// Decoys opened.
    traps_triggered: BTreeSet<String>,
    /// Decoy warning shown.
    trap_warning_given: bool,
    /// Evidence sources.
    evidence_states: BTreeMap<TruthCategory, Vec<String>>,
    /// Paranoia.
    paranoia_level: u32,
    /// Rival investigator noticed.
    rival_investigator_active: bool,
    /// `status` count.
    status_command_count: u32,
    /// Onboarding progress.
    tutorial: TutorialState,
    /// Onboarding finished.
    tutorial_complete: bool,
}

impl StatePatch {
    /// Empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a flag.
    pub fn set_flag(&mut self, key: &str) {
        self.flags.insert(key.to_string(), true);
    }

    /// Mark the run as over with `reason`.
    pub fn game_over(&mut self, reason: &str) {
        self.is_game_over = Some(true);
        self.game_over_reason = Some(Some(reason.to_string()));
    }

    /// Produce the next state.
    ///
    /// Truths only grow, hostility never drops, and detection and
    /// hostility are clamped into range.
    pub fn apply_to(&self, state: &GameState) -> GameState {
        let mut next = state.clone();
        self.assign_fields(&mut next);
        next.truths_discovered.extend(state.truths_discovered.iter().copied());
        next.system_hostility_level = next
            .system_hostility_level
            .max(state.system_hostility_level)
            .min(MAX_HOSTILITY);
        for (key, value) in &self.flags {
            next.flags.set(key.clone(), *value);
        }
        next.singular_events_triggered
            .extend(self.singular_events.iter().cloned());
        for (path, mutation) in &self.file_mutations {
            next.file_mutations.insert(path.clone(), mutation.clone());
        }
        next.detection_level = next.detection_level.min(MAX_DETECTION);
        next
    }
}
