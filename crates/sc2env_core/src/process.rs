//! Running simulation processes.

use std::fmt;
use std::net::TcpListener;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};

use serde::Serialize;

use crate::error::LaunchError;

/// A running simulation, opaque to the step loop.
pub trait ProcessHandle: fmt::Debug + Send {
    /// OS process id, if the process was started by the OS.
    fn pid(&self) -> Option<u32>;

    /// Port the simulation listens on.
    fn port(&self) -> u16;

    /// Whether the process is still alive.
    fn is_running(&mut self) -> bool;

    /// Block until the process exits, returning its exit code.
    fn wait(&mut self) -> Result<Option<i32>, LaunchError>;

    /// Terminate the process. Closing an exited process is a no-op.
    fn close(&mut self) -> Result<(), LaunchError>;
}

/// A fully resolved command line for the simulation binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchCommand {
    /// Binary to execute.
    pub exec_path: PathBuf,
    /// Arguments, in order.
    pub args: Vec<String>,
    /// Working directory, if the platform needs one.
    pub cwd: Option<PathBuf>,
    /// Port passed with `-port`.
    pub port: u16,
}

impl LaunchCommand {
    /// Render the command for logs and dry runs.
    #[must_use]
    pub fn display(&self) -> String {
        std::iter::once(self.exec_path.display().to_string())
            .chain(self.args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Start the binary.
    pub fn spawn(&self) -> Result<SimProcess, LaunchError> {
        if !self.exec_path.exists() {
            return Err(LaunchError::ExecutableNotFound(self.exec_path.clone()));
        }

        let mut cmd = Command::new(&self.exec_path);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit());
        if let Some(cwd) = &self.cwd {
            cmd.current_dir(cwd);
        }

        tracing::info!(command = %self.display(), "Launching simulation");
        let child = cmd.spawn().map_err(|source| LaunchError::Spawn {
            path: self.exec_path.clone(),
            source,
        })?;

        Ok(SimProcess {
            child,
            port: self.port,
            exited: false,
        })
    }
}

/// A simulation process started from a [`LaunchCommand`].
///
/// The child is killed when the handle is dropped.
#[derive(Debug)]
pub struct SimProcess {
    child: Child,
    port: u16,
    exited: bool,
}

impl ProcessHandle for SimProcess {
    fn pid(&self) -> Option<u32> {
        Some(self.child.id())
    }

    fn port(&self) -> u16 {
        self.port
    }

    fn is_running(&mut self) -> bool {
        if self.exited {
            return false;
        }
        match self.child.try_wait() {
            Ok(None) => true,
            Ok(Some(_)) | Err(_) => {
                self.exited = true;
                false
            }
        }
    }

    fn wait(&mut self) -> Result<Option<i32>, LaunchError> {
        let status = self.child.wait()?;
        self.exited = true;
        Ok(status.code())
    }

    fn close(&mut self) -> Result<(), LaunchError> {
        if !self.is_running() {
            return Ok(());
        }
        tracing::debug!(pid = self.child.id(), "Killing simulation process");
        self.child.kill()?;
        self.child.wait()?;
        self.exited = true;
        Ok(())
    }
}

impl Drop for SimProcess {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!(error = %e, "Failed to shut down simulation process");
        }
    }
}

/// Ask the OS for a currently unused local TCP port.
pub fn pick_unused_port() -> Result<u16, LaunchError> {
    let listener = TcpListener::bind(("127.0.0.1", 0))?;
    Ok(listener.local_addr()?.port())
}

/// Ask the OS for `count` distinct unused local TCP ports.
///
/// Every port stays bound until all of them are picked, so no port is
/// handed out twice.
pub fn pick_unused_ports(count: usize) -> Result<Vec<u16>, LaunchError> {
    let listeners = (0..count)
        .map(|_| TcpListener::bind(("127.0.0.1", 0)))
        .collect::<std::io::Result<Vec<_>>>()?;
    listeners
        .iter()
        .map(|l| Ok(l.local_addr()?.port()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_joins_exec_and_args() {
        let cmd = LaunchCommand {
            exec_path: PathBuf::from("/opt/sc2/SC2_x64"),
            args: vec!["-listen".to_string(), "127.0.0.1".to_string()],
            cwd: None,
            port: 5000,
        };
        assert_eq!(cmd.display(), "/opt/sc2/SC2_x64 -listen 127.0.0.1");
    }

    #[test]
    fn test_spawn_missing_binary() {
        let cmd = LaunchCommand {
            exec_path: PathBuf::from("/definitely/not/here/SC2_x64"),
            args: Vec::new(),
            cwd: None,
            port: 5000,
        };
        assert!(matches!(
            cmd.spawn(),
            Err(LaunchError::ExecutableNotFound(_))
        ));
    }

    #[test]
    fn test_pick_unused_port_is_nonzero() {
        let port = pick_unused_port().expect("bind should succeed");
        assert_ne!(port, 0);
    }

    #[test]
    fn test_pick_unused_ports_are_distinct() {
        let ports = pick_unused_ports(8).expect("bind should succeed");
        assert_eq!(ports.len(), 8);
        let unique: std::collections::HashSet<u16> = ports.iter().copied().collect();
        assert_eq!(unique.len(), 8);
        assert!(pick_unused_ports(0).unwrap().is_empty());
    }
}
