//! Error types for launching and synchronizing the simulation.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using [`EnvError`].
pub type Result<T> = std::result::Result<T, EnvError>;

/// Failures while choosing or starting a launch configuration.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// No registered variant reported a positive priority.
    #[error("No valid run_configs found.")]
    NoValidRunConfigs,

    /// An explicitly requested variant is not among the eligible ones.
    #[error("Invalid run_config '{requested}'. Valid configs are: {}", valid.join(", "))]
    InvalidRunConfig {
        /// Name that was asked for.
        requested: String,
        /// Eligible names, sorted.
        valid: Vec<String>,
    },

    /// A window override did not have exactly two components.
    #[error("{label} must contain exactly two integers, got {len}")]
    InvalidWindowTuple {
        /// Which override was rejected (`window_loc` or `window_size`).
        label: &'static str,
        /// Number of components supplied.
        len: usize,
    },

    /// The requested game version is not installed.
    #[error("Unknown game version '{version}'. Installed builds: {}", installed.join(", "))]
    VersionNotFound {
        /// Version that was asked for.
        version: String,
        /// Builds found under the versions directory.
        installed: Vec<String>,
    },

    /// The simulation binary could not be located.
    #[error("Simulation binary not found: {}", .0.display())]
    ExecutableNotFound(PathBuf),

    /// The operating system refused to start the process.
    #[error("Failed to start '{}': {source}", path.display())]
    Spawn {
        /// Binary that was being started.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Consecutive ports for several agents would run past `u16::MAX`.
    #[error("Cannot assign {count} consecutive ports starting at {start}")]
    PortRange {
        /// Port requested for the first agent.
        start: u16,
        /// Number of agents.
        count: usize,
    },

    /// Process management failed after launch.
    #[error("Process error: {0}")]
    Process(#[from] std::io::Error),
}

/// The simulation clock failed to reach the expected game loop.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// The episode finished while the clock was still behind its target.
    #[error(
        "The game didn't advance to the expected game loop before the episode ended. \
         Expected: {target_game_loop}, got: {game_loop}"
    )]
    EpisodeEnded {
        /// Last observed game loop.
        game_loop: u64,
        /// Game loop the step should have reached.
        target_game_loop: u64,
    },

    /// The clock fell further behind than the configured tolerance.
    #[error(
        "The game didn't advance to the expected game loop. \
         Expected: {target_game_loop}, got: {game_loop} (lag {lag} exceeds tolerance {tolerance})"
    )]
    LagExceeded {
        /// Last observed game loop.
        game_loop: u64,
        /// Game loop the step should have reached.
        target_game_loop: u64,
        /// `target_game_loop - game_loop`.
        lag: u64,
        /// Allowed slack.
        tolerance: u64,
    },
}

impl SyncError {
    /// How many game loops the clock was behind.
    #[must_use]
    pub fn lag(&self) -> u64 {
        match self {
            Self::EpisodeEnded {
                game_loop,
                target_game_loop,
            } => target_game_loop.saturating_sub(*game_loop),
            Self::LagExceeded { lag, .. } => *lag,
        }
    }

    /// Whether the failure was caused by the episode ending early.
    #[must_use]
    pub fn episode_ended(&self) -> bool {
        matches!(self, Self::EpisodeEnded { .. })
    }
}

/// Top-level error type for the environment.
#[derive(Debug, Error)]
pub enum EnvError {
    /// Launch configuration could not be resolved or started.
    #[error(transparent)]
    Launch(#[from] LaunchError),

    /// Simulation clock desynchronized.
    #[error(transparent)]
    Sync(#[from] SyncError),

    /// The number of agent names does not match the game-loop source.
    #[error("Expected {expected} agent names, got {actual}")]
    AgentCountMismatch {
        /// Agents served by the source.
        expected: usize,
        /// Names supplied.
        actual: usize,
    },

    /// `step` was called before `reset` or after the episode ended.
    #[error("Episode is not running; call reset() first")]
    EpisodeNotRunning,

    /// The game-loop source reported a failure.
    #[error("Game loop source error: {0}")]
    Source(String),
}

impl EnvError {
    /// Creates a source error.
    pub fn source_error(msg: impl Into<String>) -> Self {
        Self::Source(msg.into())
    }
}
