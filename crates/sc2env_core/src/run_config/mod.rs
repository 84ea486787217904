//! Ways of locating and launching the simulation binary.
//!
//! A [`RunConfigVariant`] is registered with the [`RunConfigRegistry`] and
//! reports a priority for the current host. Resolving the registry picks a
//! variant, builds a [`RunConfig`] for the requested game version and wraps
//! it in a [`RunConfigProxy`] that layers the process-wide
//! [`LaunchOverrides`] onto every launch.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::LaunchError;
use crate::process::{LaunchCommand, ProcessHandle};

mod local;
mod overrides;
mod proxy;
mod registry;

pub use local::{LocalRunConfig, LocalVariant, Platform};
pub use overrides::{
    global_overrides, reset_global_overrides, set_extra_args, set_window_config, LaunchOverrides,
};
pub use proxy::RunConfigProxy;
pub use registry::RunConfigRegistry;

/// `(x, y)` for window locations, `(width, height)` for window sizes.
pub type WindowPair = (i32, i32);

/// Per-call launch arguments.
///
/// `None` fields mean the caller left the choice to the run config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartOptions {
    /// Address the simulation listens on.
    pub host: String,
    /// Port to listen on; an unused port is picked when `None`.
    pub port: Option<u16>,
    /// Launch full screen instead of windowed.
    pub full_screen: bool,
    /// Additional binary arguments, appended after the generated ones.
    pub extra_args: Option<Vec<String>>,
    /// Window position.
    pub window_location: Option<WindowPair>,
    /// Window dimensions.
    pub window_size: Option<WindowPair>,
}

impl Default for StartOptions {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: None,
            full_screen: false,
            extra_args: None,
            window_location: None,
            window_size: None,
        }
    }
}

/// A constructed configuration able to launch the simulation.
pub trait RunConfig: fmt::Debug + Send + Sync {
    /// Name of the variant this config was built from.
    fn name(&self) -> &str;

    /// Requested game version, if any.
    fn version(&self) -> Option<&str>;

    /// Root of the game installation.
    fn data_dir(&self) -> &Path;

    /// Directory replays are saved to.
    fn replay_dir(&self) -> PathBuf {
        self.data_dir().join("Replays")
    }

    /// Directory maps are loaded from.
    fn map_dir(&self) -> PathBuf {
        self.data_dir().join("Maps")
    }

    /// Build the command line `start` would run.
    fn launch_command(&self, options: &StartOptions) -> Result<LaunchCommand, LaunchError>;

    /// Launch a simulation process.
    fn start(&self, options: StartOptions) -> Result<Box<dyn ProcessHandle>, LaunchError> {
        let process = self.launch_command(&options)?.spawn()?;
        Ok(Box::new(process))
    }
}

/// A registrable kind of run config.
pub trait RunConfigVariant: Send + Sync {
    /// Unique variant name, used for explicit selection.
    fn name(&self) -> &str;

    /// Selection priority on this host; only positive values are eligible.
    fn priority(&self) -> i32;

    /// Construct a run config for `version` (`None` for the newest).
    fn build(&self, version: Option<&str>) -> Result<Box<dyn RunConfig>, LaunchError>;
}
