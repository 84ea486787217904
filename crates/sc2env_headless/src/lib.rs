//! Headless environment runner.
//!
//! Glues the launch-configuration and synchronization pieces of
//! `sc2env_core` into something an agent loop can drive:
//!
//! - **Settings**: RON files describing how to launch and how strict to be
//! - **Launcher**: resolve a run config and start one game per agent
//! - **Environment**: the per-step game-loop check across all agents
//!
//! # Example
//!
//! ```bash
//! # Show which run configs this host can use
//! cargo run -p sc2env_headless -- configs
//!
//! # Print the command lines for a two-agent game without starting it
//! cargo run -p sc2env_headless -- launch --agents 2 --extra-arg -norender --dry-run
//! ```

pub mod environment;
pub mod launcher;
pub mod settings;

pub use environment::{EpisodeState, SC2Environment, StepOutcome};
pub use launcher::{
    agent_options, launch_game, plan_launch, resolve_run_config, resolve_run_config_with,
    LaunchedGame,
};
pub use settings::{EnvSettings, SettingsError};
