//! Save snapshots: a versioned JSON envelope around [`GameState`].

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::SAVE_VERSION;
use crate::error::{CoreError, CoreResult};
use crate::fs::FileSystem;
use crate::state::GameState;

/// A persisted run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveSnapshot {
    /// Format version.
    pub version: u32,
    /// When the snapshot was taken.
    pub saved_at: DateTime<Utc>,
    /// Optional slot label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// The captured state.
    pub state: GameState,
}

impl SaveSnapshot {
    /// Capture `state` now.
    pub fn capture(state: &GameState, label: Option<&str>) -> Self {
        Self {
            version: SAVE_VERSION,
            saved_at: Utc::now(),
            label: label.map(str::to_string),
            state: state.clone(),
        }
    }

    /// Serialize as pretty JSON.
    pub fn to_json(&self) -> CoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse and validate against the standard archive.
    pub fn from_json(text: &str) -> CoreResult<Self> {
        Self::from_json_with(text, FileSystem::standard())
    }

    /// Parse and validate against `fs`.
    pub fn from_json_with(text: &str, fs: &FileSystem) -> CoreResult<Self> {
        let raw: serde_json::Value = serde_json::from_str(text)?;
        let found = raw
            .get("version")
            .and_then(serde_json::Value::as_u64)
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or(0);
        if found != SAVE_VERSION {
            return Err(CoreError::UnsupportedSaveVersion {
                found,
                expected: SAVE_VERSION,
            });
        }
        let mut snapshot: Self = serde_json::from_value(raw)?;
        snapshot.state.clamp();
        validate_state(&snapshot.state, fs)?;
        tracing::debug!(
            truths = snapshot.state.truth_count(),
            detection = snapshot.state.detection_level,
            "snapshot_loaded"
        );
        Ok(snapshot)
    }

    /// Write to `path`.
    pub fn write_to(&self, path: &Path) -> CoreResult<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Read from `path`.
    pub fn read_from(path: &Path) -> CoreResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

/// Check that a state refers only to things that exist in `fs`.
///
/// Onboarding runs in a sandbox, so its working directory is not checked.
pub fn validate_state(state: &GameState, fs: &FileSystem) -> CoreResult<()> {
    if let Some(path) = state.file_mutations.keys().find(|p| !fs.file_exists(p)) {
        return Err(CoreError::DanglingMutation(path.clone()));
    }
    if !state.in_onboarding() && !fs.is_dir(&state.current_path, state) {
        return Err(CoreError::InvalidPath(state.current_path.clone()));
    }
    Ok(())
}
