//! Test fixtures and helpers.
//!
//! Fake run configs that never touch the filesystem or spawn processes,
//! recording every launch so tests can inspect the merged options.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use sc2env_core::error::LaunchError;
use sc2env_core::process::{LaunchCommand, ProcessHandle};
use sc2env_core::run_config::{RunConfig, RunConfigVariant, StartOptions};

static NEXT_FAKE_PID: AtomicU32 = AtomicU32::new(1000);

/// Shared record of every `start` call made through fake configs.
#[derive(Debug, Clone, Default)]
pub struct StartLog {
    calls: Arc<Mutex<Vec<StartOptions>>>,
}

impl StartLog {
    /// Every recorded call, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<StartOptions> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The most recent call.
    #[must_use]
    pub fn last(&self) -> Option<StartOptions> {
        self.calls().pop()
    }

    fn record(&self, options: StartOptions) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(options);
    }
}

/// A process handle that is alive until closed.
#[derive(Debug)]
pub struct FakeProcess {
    pid: u32,
    port: u16,
    running: bool,
}

impl FakeProcess {
    /// A running fake listening on `port`.
    #[must_use]
    pub fn new(port: u16) -> Self {
        Self {
            pid: NEXT_FAKE_PID.fetch_add(1, Ordering::Relaxed),
            port,
            running: true,
        }
    }
}

impl ProcessHandle for FakeProcess {
    fn pid(&self) -> Option<u32> {
        Some(self.pid)
    }

    fn port(&self) -> u16 {
        self.port
    }

    fn is_running(&mut self) -> bool {
        self.running
    }

    fn wait(&mut self) -> Result<Option<i32>, LaunchError> {
        self.running = false;
        Ok(Some(0))
    }

    fn close(&mut self) -> Result<(), LaunchError> {
        self.running = false;
        Ok(())
    }
}

/// Run config that records its launches instead of spawning anything.
#[derive(Debug, Clone)]
pub struct RecordingRunConfig {
    name: String,
    version: Option<String>,
    data_dir: PathBuf,
    log: StartLog,
}

impl RecordingRunConfig {
    /// A config named `name` for `version`, logging into `log`.
    pub fn new(name: impl Into<String>, version: Option<&str>, log: StartLog) -> Self {
        Self {
            name: name.into(),
            version: version.map(str::to_string),
            data_dir: PathBuf::from("/fake/StarCraftII"),
            log,
        }
    }
}

impl RunConfig for RecordingRunConfig {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn launch_command(&self, options: &StartOptions) -> Result<LaunchCommand, LaunchError> {
        let mut args = Vec::new();
        if let Some((x, y)) = options.window_location {
            args.extend(["-windowx".to_string(), x.to_string(), "-windowy".to_string(), y.to_string()]);
        }
        if let Some((w, h)) = options.window_size {
            args.extend([
                "-windowwidth".to_string(),
                w.to_string(),
                "-windowheight".to_string(),
                h.to_string(),
            ]);
        }
        args.extend(options.extra_args.iter().flatten().cloned());
        Ok(LaunchCommand {
            exec_path: self.data_dir.join("SC2_x64"),
            args,
            cwd: None,
            port: options.port.unwrap_or(5000),
        })
    }

    fn start(&self, options: StartOptions) -> Result<Box<dyn ProcessHandle>, LaunchError> {
        let port = options.port.unwrap_or(5000);
        tracing::debug!(run_config = %self.name, ?options, "Fake launch");
        self.log.record(options);
        Ok(Box::new(FakeProcess::new(port)))
    }
}

/// Registrable variant with a fixed priority that builds [`RecordingRunConfig`]s.
#[derive(Debug, Clone)]
pub struct FakeVariant {
    name: String,
    priority: i32,
    log: StartLog,
}

impl FakeVariant {
    /// A variant with its own start log.
    pub fn new(name: impl Into<String>, priority: i32) -> Self {
        Self::with_log(name, priority, StartLog::default())
    }

    /// A variant recording into a shared log.
    pub fn with_log(name: impl Into<String>, priority: i32, log: StartLog) -> Self {
        Self {
            name: name.into(),
            priority,
            log,
        }
    }

    /// Log of every start made by configs built from this variant.
    #[must_use]
    pub fn log(&self) -> StartLog {
        self.log.clone()
    }
}

impl RunConfigVariant for FakeVariant {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn build(&self, version: Option<&str>) -> Result<Box<dyn RunConfig>, LaunchError> {
        Ok(Box::new(RecordingRunConfig::new(
            self.name.clone(),
            version,
            self.log.clone(),
        )))
    }
}
