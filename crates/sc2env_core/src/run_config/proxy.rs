//! Run config wrapper that injects launch overrides.

use std::path::{Path, PathBuf};

use super::{LaunchOverrides, RunConfig, StartOptions};
use crate::error::LaunchError;
use crate::process::{LaunchCommand, ProcessHandle};

/// Wraps a [`RunConfig`], adding captured [`LaunchOverrides`] to launches.
///
/// Everything except [`RunConfig::start`] and [`RunConfig::launch_command`]
/// is forwarded unchanged. Overrides never replace what the caller passed:
/// extra args are appended after the caller's, and window settings are only
/// filled in when the caller left them unset.
#[derive(Debug)]
pub struct RunConfigProxy {
    inner: Box<dyn RunConfig>,
    overrides: LaunchOverrides,
}

impl RunConfigProxy {
    /// Wrap `inner` with a snapshot of `overrides`.
    pub fn new(inner: Box<dyn RunConfig>, overrides: LaunchOverrides) -> Self {
        Self { inner, overrides }
    }

    /// The wrapped config.
    pub fn inner(&self) -> &dyn RunConfig {
        self.inner.as_ref()
    }

    /// Overrides captured when the proxy was built.
    pub fn overrides(&self) -> &LaunchOverrides {
        &self.overrides
    }

    /// Unwrap, discarding the overrides.
    pub fn into_inner(self) -> Box<dyn RunConfig> {
        self.inner
    }

    /// Apply the captured overrides to one call's options.
    pub fn merge_options(&self, mut options: StartOptions) -> StartOptions {
        let mut extra_args = options.extra_args.take().unwrap_or_default();
        extra_args.extend(self.overrides.extra_args.iter().cloned());
        options.extra_args = Some(extra_args);

        if options.window_location.is_none() {
            options.window_location = self.overrides.window_location;
        }
        if options.window_size.is_none() {
            options.window_size = self.overrides.window_size;
        }
        options
    }
}

impl RunConfig for RunConfigProxy {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn version(&self) -> Option<&str> {
        self.inner.version()
    }

    fn data_dir(&self) -> &Path {
        self.inner.data_dir()
    }

    fn replay_dir(&self) -> PathBuf {
        self.inner.replay_dir()
    }

    fn map_dir(&self) -> PathBuf {
        self.inner.map_dir()
    }

    fn launch_command(&self, options: &StartOptions) -> Result<LaunchCommand, LaunchError> {
        self.inner
            .launch_command(&self.merge_options(options.clone()))
    }

    fn start(&self, options: StartOptions) -> Result<Box<dyn ProcessHandle>, LaunchError> {
        self.inner.start(self.merge_options(options))
    }
}
