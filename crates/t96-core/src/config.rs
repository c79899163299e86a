//! Limits and engine configuration.

use std::path::Path;

use serde::Deserialize;

use crate::error::{CoreError, CoreResult};

/// Version written into save snapshots.
pub const SAVE_VERSION: u32 = 1;

/// Fixed ceilings on growing structures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct Limits {
    /// Output history entries kept by the host.
    pub max_history: usize,
    /// Submitted commands kept for recall.
    pub max_command_history: usize,
    /// Characters accepted per input line.
    pub max_input_length: usize,
    /// Player notes kept.
    pub max_player_notes: usize,
    /// Named save slots.
    pub max_save_slots: usize,
    /// Directories remembered for `back`.
    pub max_navigation_history: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_history: 500,
            max_command_history: 100,
            max_input_length: 256,
            max_player_notes: 50,
            max_save_slots: 10,
            max_navigation_history: 20,
        }
    }
}

/// Configuration for a play session.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Fixed run seed; a fresh one is drawn when absent.
    pub seed: Option<u32>,
    /// Structure ceilings.
    pub limits: Limits,
    /// Start in free play.
    pub skip_tutorial: bool,
    /// Print output without pacing.
    pub instant_output: bool,
    /// Shortest pause between streamed lines, in milliseconds.
    pub min_line_delay_ms: u64,
    /// Longest pause between streamed lines, in milliseconds.
    pub max_line_delay_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: None,
            limits: Limits::default(),
            skip_tutorial: false,
            instant_output: false,
            min_line_delay_ms: 15,
            max_line_delay_ms: 60,
        }
    }
}

impl EngineConfig {
    /// Load from a JSON file.
    pub fn from_json_file(path: &Path) -> CoreResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Parse from JSON text and validate.
    pub fn from_json(text: &str) -> CoreResult<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject inconsistent values.
    pub fn validate(&self) -> CoreResult<()> {
        if self.min_line_delay_ms > self.max_line_delay_ms {
            return Err(CoreError::InvalidConfig(format!(
                "minLineDelayMs ({}) exceeds maxLineDelayMs ({})",
                self.min_line_delay_ms, self.max_line_delay_ms
            )));
        }
        if self.limits.max_input_length == 0 {
            return Err(CoreError::InvalidConfig("maxInputLength must be positive".into()));
        }
        if self.seed == Some(0) {
            return Err(CoreError::InvalidConfig("seed must be non-zero".into()));
        }
        Ok(())
    }

    /// Set the run seed (zero becomes one).
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = Some(seed.max(1));
        self
    }

    /// Start in free play.
    pub fn with_skip_tutorial(mut self, skip: bool) -> Self {
        self.skip_tutorial = skip;
        self
    }

    /// Print output without pacing.
    pub fn with_instant_output(mut self, instant: bool) -> Self {
        self.instant_output = instant;
        self
    }

    /// Set the per-line pacing window (bounds are ordered).
    pub fn with_line_delay(mut self, min_ms: u64, max_ms: u64) -> Self {
        self.min_line_delay_ms = min_ms.min(max_ms);
        self.max_line_delay_ms = max_ms.max(min_ms);
        self
    }

    /// Set the input length ceiling (at least one character).
    pub fn with_max_input_length(mut self, len: usize) -> Self {
        self.limits.max_input_length = len.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.seed, None);
        assert_eq!(cfg.limits.max_history, 500);
        assert_eq!(cfg.limits.max_command_history, 100);
        assert_eq!(cfg.limits.max_input_length, 256);
        assert_eq!(cfg.limits.max_player_notes, 50);
        assert_eq!(cfg.limits.max_save_slots, 10);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn builder_methods() {
        let cfg = EngineConfig::default()
            .with_seed(123)
            .with_skip_tutorial(true)
            .with_instant_output(true)
            .with_line_delay(90, 10);
        assert_eq!(cfg.seed, Some(123));
        assert!(cfg.skip_tutorial);
        assert!(cfg.instant_output);
        assert_eq!((cfg.min_line_delay_ms, cfg.max_line_delay_ms), (10, 90));
    }

    #[test]
    fn values_clamped() {
        assert_eq!(EngineConfig::default().with_seed(0).seed, Some(1));
        assert_eq!(EngineConfig::default().with_max_input_length(0).limits.max_input_length, 1);
    }

    #[test]
    fn json_overrides_defaults() {
        let cfg = EngineConfig::from_json(r#"{"seed": 7, "limits": {"maxPlayerNotes": 3}}"#).unwrap();
        assert_eq!(cfg.seed, Some(7));
        assert_eq!(cfg.limits.max_player_notes, 3);
        assert_eq!(cfg.limits.max_history, 500);
    }

    #[test]
    fn json_rejects_bad_values() {
        assert!(EngineConfig::from_json(r#"{"colour": true}"#).is_err());
        assert!(matches!(
            EngineConfig::from_json(r#"{"minLineDelayMs": 100, "maxLineDelayMs": 5}"#),
            Err(CoreError::InvalidConfig(_))
        ));
    }
}
