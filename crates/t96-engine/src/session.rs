//! Host-side session: owns the state between commands, the bounded output
//! history, recalled commands and in-memory save slots.
//!
//! The engine functions are pure; `Session` is the one place where a patch
//! is applied and where output lines get identities.

use std::collections::{BTreeMap, VecDeque};

use chrono::Utc;
use serde::Serialize;
use t96_core::{EngineConfig, FileSystem, GameState, SaveSnapshot, TutorialStep, flag, generate_seed};

use crate::error::{EngineError, EngineResult};
use crate::executor;
use crate::onboarding;
use crate::output::{CommandResult, EntryKind, OutputLine};

fn now_ms() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0)
}

/// A history line with its identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    /// Monotonic id, unique within the session.
    pub id: u64,
    /// Display category.
    pub kind: EntryKind,
    /// Text.
    pub content: String,
}

/// An interactive play session.
#[derive(Debug)]
pub struct Session {
    config: EngineConfig,
    fs: &'static FileSystem,
    state: GameState,
    history: VecDeque<HistoryEntry>,
    commands: VecDeque<String>,
    next_id: u64,
    slots: BTreeMap<String, SaveSnapshot>,
}

impl Session {
    /// Start a fresh run. The seed comes from the config or is drawn.
    pub fn new(config: EngineConfig) -> Self {
        let seed = config.seed.unwrap_or_else(generate_seed);
        let state = if config.skip_tutorial {
            GameState::without_tutorial(seed)
        } else {
            GameState::new(seed)
        };
        tracing::info!(seed, skip_tutorial = config.skip_tutorial, "session_started");
        Self::with_state(config, state)
    }

    /// Resume from a snapshot.
    pub fn from_snapshot(config: EngineConfig, snapshot: SaveSnapshot) -> Self {
        tracing::info!(seed = snapshot.state.seed, saved_at = %snapshot.saved_at, "session_resumed");
        Self::with_state(config, snapshot.state)
    }

    fn with_state(config: EngineConfig, state: GameState) -> Self {
        Self {
            config,
            fs: FileSystem::standard(),
            state,
            history: VecDeque::new(),
            commands: VecDeque::new(),
            next_id: 0,
            slots: BTreeMap::new(),
        }
    }

    /// Boot output. Starts the onboarding on a fresh run; otherwise empty.
    pub fn start(&mut self) -> CommandResult {
        if !self.state.in_onboarding() || self.state.tutorial.current != TutorialStep::Intro {
            return CommandResult::default();
        }
        let result = onboarding::begin();
        self.absorb(&result);
        result
    }

    /// Current state.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Session configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Output history, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.history.iter()
    }

    /// Submitted commands, oldest first.
    pub fn command_history(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().map(String::as_str)
    }

    /// Whether the run has ended.
    pub fn is_over(&self) -> bool {
        self.state.is_game_over
    }

    /// Submit one input line at the current wall-clock time.
    pub fn submit(&mut self, input: &str) -> CommandResult {
        self.submit_at(input, now_ms(), false)
    }

    /// Submit a line the player finished with the tab key, completing it
    /// first when a completion exists.
    pub fn submit_tab(&mut self, input: &str) -> CommandResult {
        let line = self.complete(input).unwrap_or_else(|| input.to_string());
        self.submit_at(&line, now_ms(), true)
    }

    /// Submit one input line at `now_ms`, noting tab completion.
    pub fn submit_at(&mut self, input: &str, now_ms: u64, tab_pressed: bool) -> CommandResult {
        let trimmed = input.trim();
        if !trimmed.is_empty() {
            self.commands.push_back(trimmed.to_string());
            while self.commands.len() > self.config.limits.max_command_history {
                self.commands.pop_front();
            }
            self.push(OutputLine::input(format!("> {trimmed}")));
        }

        let result = executor::execute_with_tab(input, &self.state, self.fs, &self.config.limits, now_ms, tab_pressed);
        self.absorb(&result);
        result
    }

    /// Tab completion for the current input, if the onboarding offers one.
    pub fn complete(&self, input: &str) -> Option<String> {
        if !self.state.in_onboarding() {
            return None;
        }
        onboarding::autocomplete(self.state.tutorial.current, input)
    }

    /// Whether the last command asked the host to save, clearing the request.
    pub fn take_save_request(&mut self) -> bool {
        let requested = self.state.flag(flag::SAVE_REQUESTED);
        if requested {
            self.state.flags.set(flag::SAVE_REQUESTED, false);
        }
        requested
    }

    fn absorb(&mut self, result: &CommandResult) {
        if result.clear_history {
            self.history.clear();
        }
        let was_over = self.state.is_game_over;
        self.state = result.patch.apply_to(&self.state);
        for line in result.output.iter().chain(&result.pending_ufo74) {
            self.push(line.clone());
        }
        if self.state.is_game_over && !was_over {
            tracing::warn!(reason = ?self.state.game_over_reason, "session_over");
        }
    }

    fn push(&mut self, line: OutputLine) {
        self.history.push_back(HistoryEntry {
            id: self.next_id,
            kind: line.kind,
            content: line.content,
        });
        self.next_id += 1;
        while self.history.len() > self.config.limits.max_history {
            self.history.pop_front();
        }
    }

    /// Snapshot of the current state.
    pub fn snapshot(&self, label: Option<&str>) -> SaveSnapshot {
        SaveSnapshot::capture(&self.state, label)
    }

    /// Store the current state under `name`, replacing a slot of that name.
    pub fn save_slot(&mut self, name: &str) -> EngineResult<()> {
        let limit = self.config.limits.max_save_slots;
        if !self.slots.contains_key(name) && self.slots.len() >= limit {
            return Err(EngineError::SaveSlotsFull(limit));
        }
        self.slots.insert(name.to_string(), self.snapshot(Some(name)));
        tracing::info!(slot = name, "slot_saved");
        Ok(())
    }

    /// Restore the state stored under `name`. History is kept.
    pub fn load_slot(&mut self, name: &str) -> EngineResult<()> {
        let snapshot = self
            .slots
            .get(name)
            .ok_or_else(|| EngineError::SlotNotFound(name.to_string()))?;
        self.state = snapshot.state.clone();
        tracing::info!(slot = name, "slot_loaded");
        Ok(())
    }

    /// Remove the slot `name`.
    pub fn delete_slot(&mut self, name: &str) -> EngineResult<()> {
        self.slots
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| EngineError::SlotNotFound(name.to_string()))
    }

    /// Slot names with their save times.
    pub fn slots(&self) -> impl Iterator<Item = (&str, &SaveSnapshot)> {
        self.slots.iter().map(|(name, snap)| (name.as_str(), snap))
    }

    /// Persist the current state to `path`.
    pub fn write_save(&self, path: &std::path::Path) -> EngineResult<()> {
        self.snapshot(None).write_to(path)?;
        tracing::info!(path = %path.display(), "save_written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use t96_core::Limits;

    fn free_play(limits: Limits) -> Session {
        Session::new(EngineConfig {
            limits,
            ..EngineConfig::default().with_seed(42).with_skip_tutorial(true)
        })
    }

    #[test]
    fn fresh_run_boots_into_onboarding() {
        let mut session = Session::new(EngineConfig::default().with_seed(5));
        let boot = session.start();
        assert!(boot.mentions("SYSTEM DATE: JANUARY 1996"));
        assert_eq!(session.state().tutorial.current, TutorialStep::LsPrompt);
        assert!(session.start().output.is_empty());
        assert_eq!(session.state().seed, 5);
    }

    #[test]
    fn history_ids_are_monotonic_and_bounded() {
        let mut session = free_play(Limits {
            max_history: 10,
            ..Limits::default()
        });
        for _ in 0..5 {
            session.submit_at("status", 0, false);
        }
        let ids: Vec<u64> = session.history().map(|e| e.id).collect();
        assert_eq!(ids.len(), 10);
        assert!(ids.windows(2).all(|w| w[1] == w[0] + 1));
        assert!(ids[0] > 0);
    }

    #[test]
    fn command_history_is_bounded() {
        let mut session = free_play(Limits {
            max_command_history: 3,
            ..Limits::default()
        });
        for cmd in ["ls", "status", "help", "progress", "  "] {
            session.submit_at(cmd, 0, false);
        }
        assert_eq!(session.command_history().collect::<Vec<_>>(), ["status", "help", "progress"]);
    }

    #[test]
    fn clear_empties_history() {
        let mut session = free_play(Limits::default());
        session.submit_at("help", 0, false);
        session.submit_at("clear", 0, false);
        assert!(session.history().all(|e| e.kind != EntryKind::Input || e.content == "> clear"));
        assert!(session.history().count() <= 1);
    }

    #[test]
    fn state_advances_between_commands() {
        let mut session = free_play(Limits::default());
        session.submit_at("cd /storage", 0, false);
        assert_eq!(session.state().current_path, "/storage");
        session.submit_at("xyzzy", 0, false);
        assert_eq!(session.state().legacy_alert_counter, 1);
    }

    #[test]
    fn tab_completes_during_onboarding() {
        let mut session = Session::new(EngineConfig::default().with_seed(8));
        session.start();
        session.submit("ls");
        session.submit("cd files");
        let result = session.submit_tab("open caf");
        assert!(result.mentions("CAFETERIA MENU - WEEK 42"));
        assert_eq!(session.command_history().last(), Some("open cafeteria_menu"));
    }

    #[test]
    fn save_slots_are_limited() {
        let mut session = free_play(Limits {
            max_save_slots: 2,
            ..Limits::default()
        });
        session.save_slot("a").unwrap();
        session.save_slot("b").unwrap();
        session.save_slot("a").unwrap();
        assert!(matches!(session.save_slot("c"), Err(EngineError::SaveSlotsFull(2))));
        assert!(matches!(session.load_slot("zzz"), Err(EngineError::SlotNotFound(_))));
        session.delete_slot("b").unwrap();
        session.save_slot("c").unwrap();
        assert_eq!(session.slots().map(|(n, _)| n).collect::<Vec<_>>(), ["a", "c"]);
    }

    #[test]
    fn load_slot_restores_state() {
        let mut session = free_play(Limits::default());
        session.save_slot("start").unwrap();
        session.submit_at("cd /storage", 0, false);
        session.load_slot("start").unwrap();
        assert_eq!(session.state().current_path, "/");
    }

    #[test]
    fn save_command_raises_request_once() {
        let mut session = free_play(Limits::default());
        session.submit_at("save", 0, false);
        assert!(session.take_save_request());
        assert!(!session.take_save_request());
    }

    #[test]
    fn snapshot_file_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        let mut session = free_play(Limits::default());
        session.submit_at("cd /storage", 0, false);
        session.write_save(&path).unwrap();
        let restored = Session::from_snapshot(EngineConfig::default(), SaveSnapshot::read_from(&path).unwrap());
        assert_eq!(restored.state(), session.state());
    }

    #[test]
    fn history_serializes_for_hosts() {
        let mut session = free_play(Limits::default());
        session.submit_at("status", 0, false);
        let entries: Vec<&HistoryEntry> = session.history().collect();
        let json = serde_json::to_value(&entries).unwrap();
        assert_eq!(json[0]["kind"], "input");
        assert_eq!(json[0]["content"], "> status");
    }
}
