//! # sc2env core
//!
//! Launching and synchronizing an external game simulation for agents.
//!
//! This crate contains the pieces of the environment that do not depend on
//! the wire protocol to the game:
//! - choosing how to launch the game binary on this host
//! - injecting process-wide launch overrides without touching configs
//! - giving concurrent agents stable, unique, display-safe names
//! - detecting when the game clock stops keeping up with the step loop
//!
//! ## Crate Structure
//!
//! - [`run_config`] - Run config variants, registry, overrides and proxy
//! - [`process`] - Launch commands and running process handles
//! - [`names`] - Agent name cropping and de-duplication
//! - [`clock`] - Game-loop counters as seen by each agent
//! - [`lag`] - Game-loop lag checks
//! - [`error`] - Error types

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod clock;
pub mod error;
pub mod lag;
pub mod names;
pub mod process;
pub mod run_config;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::clock::{GameLoopSource, LoopObservation};
    pub use crate::error::{EnvError, LaunchError, Result, SyncError};
    pub use crate::lag::{check_game_loop_lag, LagMonitor};
    pub use crate::names::{crop_and_deduplicate_names, MAX_NAME_LENGTH};
    pub use crate::process::{LaunchCommand, ProcessHandle, SimProcess};
    pub use crate::run_config::{
        global_overrides, set_extra_args, set_window_config, LaunchOverrides, Platform,
        RunConfig, RunConfigProxy, RunConfigRegistry, RunConfigVariant, StartOptions, WindowPair,
    };
}
