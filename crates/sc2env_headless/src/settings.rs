//! Environment settings loading.
//!
//! Settings describe how to launch the game and how strictly to keep the
//! agents in step with it. They are usually loaded from a RON file and then
//! adjusted from the command line.

use std::path::Path;

use sc2env_core::error::LaunchError;
use sc2env_core::names::crop_and_deduplicate_names;
use sc2env_core::run_config::{set_extra_args, set_window_config};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default number of game loops per environment step.
pub const DEFAULT_STEP_MUL: u32 = 8;

/// Error type for settings operations.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// File not found.
    #[error("Settings file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read settings file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse settings: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// Settings parsed but are not usable.
    #[error("Invalid settings: {0}")]
    Invalid(String),
    /// Launch overrides were rejected.
    #[error(transparent)]
    Launch(#[from] LaunchError),
}

/// Complete environment settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvSettings {
    /// Run config to launch with; the highest-priority one when `None`.
    pub run_config: Option<String>,
    /// Game version; the newest installed when `None`.
    pub version: Option<String>,
    /// Extra binary arguments applied to every launch.
    pub extra_args: Vec<String>,
    /// Window position `[x, y]`.
    pub window_location: Option<Vec<i32>>,
    /// Window dimensions `[width, height]`.
    pub window_size: Option<Vec<i32>>,
    /// Game loops per environment step.
    pub step_mul: u32,
    /// Game loops an agent may trail the target by mid-episode.
    pub game_loop_lag_tolerance: u64,
    /// Raw agent names, one per agent.
    pub agent_names: Vec<String>,
}

impl Default for EnvSettings {
    fn default() -> Self {
        Self {
            run_config: None,
            version: None,
            extra_args: Vec::new(),
            window_location: None,
            window_size: None,
            step_mul: DEFAULT_STEP_MUL,
            game_loop_lag_tolerance: 0,
            agent_names: Vec::new(),
        }
    }
}

impl EnvSettings {
    /// Load settings from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Load from a RON string.
    pub fn from_ron_str(ron: &str) -> Result<Self, SettingsError> {
        let settings: EnvSettings = ron::from_str(ron)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check values that serde cannot.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.step_mul == 0 {
            return Err(SettingsError::Invalid("step_mul must be positive".to_string()));
        }
        for (label, value) in [
            ("window_location", &self.window_location),
            ("window_size", &self.window_size),
        ] {
            if let Some(v) = value {
                if v.len() != 2 {
                    return Err(SettingsError::Invalid(format!(
                        "{label} must contain exactly two integers, got {}",
                        v.len()
                    )));
                }
            }
        }
        Ok(())
    }

    /// Number of agents to launch.
    ///
    /// A requested count wins when no names are configured; otherwise it
    /// must agree with `agent_names`. With neither, one agent is launched.
    pub fn agent_count(&self, requested: Option<usize>) -> Result<usize, SettingsError> {
        let named = self.agent_names.len();
        match requested {
            Some(0) => Err(SettingsError::Invalid(
                "at least one agent is required".to_string(),
            )),
            Some(n) if named == 0 || n == named => Ok(n),
            Some(n) => Err(SettingsError::Invalid(format!(
                "requested {n} agents but agent_names lists {named}"
            ))),
            None => Ok(named.max(1)),
        }
    }

    /// Display names for `agents` agents.
    ///
    /// Uses `agent_names` when configured, else `agent_1`, `agent_2`, ...
    pub fn display_names(&self, agents: usize) -> Vec<String> {
        if self.agent_names.is_empty() {
            let defaults: Vec<String> = (1..=agents).map(|i| format!("agent_{i}")).collect();
            crop_and_deduplicate_names(&defaults)
        } else {
            crop_and_deduplicate_names(&self.agent_names)
        }
    }

    /// Publish the launch overrides process-wide.
    ///
    /// Call before creating environments on other threads.
    pub fn apply_launch_overrides(&self) -> Result<(), SettingsError> {
        set_window_config(self.window_location.as_deref(), self.window_size.as_deref())?;
        set_extra_args(self.extra_args.iter().cloned());
        tracing::debug!(
            extra_args = ?self.extra_args,
            window_location = ?self.window_location,
            window_size = ?self.window_size,
            "Applied launch overrides"
        );
        Ok(())
    }
}
