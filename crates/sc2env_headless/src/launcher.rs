//! Starting the game processes for an environment.

use sc2env_core::error::{LaunchError, Result};
use sc2env_core::process::{pick_unused_ports, LaunchCommand, ProcessHandle};
use sc2env_core::run_config::{
    global_overrides, LaunchOverrides, RunConfig, RunConfigProxy, RunConfigRegistry, StartOptions,
};
use tracing::{info, warn};

use crate::settings::EnvSettings;

/// A resolved run config and one running game process per agent.
#[derive(Debug)]
pub struct LaunchedGame {
    run_config: RunConfigProxy,
    processes: Vec<Box<dyn ProcessHandle>>,
}

impl LaunchedGame {
    /// The run config the processes were started with.
    pub fn run_config(&self) -> &RunConfigProxy {
        &self.run_config
    }

    /// Running processes, in agent order.
    pub fn processes(&mut self) -> &mut [Box<dyn ProcessHandle>] {
        &mut self.processes
    }

    /// Ports of every process, in agent order.
    pub fn ports(&self) -> Vec<u16> {
        self.processes.iter().map(|p| p.port()).collect()
    }

    /// Block until every process exits, returning their exit codes.
    pub fn wait_all(&mut self) -> Result<Vec<Option<i32>>> {
        let mut codes = Vec::with_capacity(self.processes.len());
        for process in &mut self.processes {
            codes.push(process.wait()?);
        }
        Ok(codes)
    }

    /// Terminate every process, reporting the first failure.
    pub fn close_all(&mut self) -> Result<()> {
        let mut first_error: Option<LaunchError> = None;
        for process in &mut self.processes {
            if let Err(e) = process.close() {
                warn!(error = %e, pid = ?process.pid(), "Failed to close simulation process");
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }
}

/// Resolve the run config named by `settings` with explicit overrides.
pub fn resolve_run_config_with(
    registry: &RunConfigRegistry,
    settings: &EnvSettings,
    overrides: &LaunchOverrides,
) -> Result<RunConfigProxy> {
    let config = registry.resolve_with(
        settings.run_config.as_deref(),
        settings.version.as_deref(),
        overrides,
    )?;
    Ok(config)
}

/// Resolve the run config named by `settings` with the process-wide overrides.
pub fn resolve_run_config(
    registry: &RunConfigRegistry,
    settings: &EnvSettings,
) -> Result<RunConfigProxy> {
    resolve_run_config_with(registry, settings, &global_overrides())
}

/// One set of start options per agent, each with its own port.
///
/// Without a port in `options` every agent gets a distinct unused port;
/// with one, agents get consecutive ports starting there.
pub fn agent_options(options: &StartOptions, agents: usize) -> Result<Vec<StartOptions>> {
    let ports = match options.port {
        None => pick_unused_ports(agents)?,
        Some(start) => (0..agents)
            .map(|offset| {
                u16::try_from(offset)
                    .ok()
                    .and_then(|offset| start.checked_add(offset))
                    .ok_or(LaunchError::PortRange {
                        start,
                        count: agents,
                    })
            })
            .collect::<std::result::Result<Vec<_>, _>>()?,
    };
    Ok(ports
        .into_iter()
        .map(|port| StartOptions {
            port: Some(port),
            ..options.clone()
        })
        .collect())
}

/// Command lines that [`launch_game`] would run, without starting anything.
pub fn plan_launch(
    config: &RunConfigProxy,
    agents: usize,
    options: &StartOptions,
) -> Result<Vec<LaunchCommand>> {
    let mut commands = Vec::with_capacity(agents);
    for agent_options in agent_options(options, agents)? {
        commands.push(config.launch_command(&agent_options)?);
    }
    Ok(commands)
}

/// Start one game process per agent, each on its own port.
///
/// If any launch fails the processes already started are closed before the
/// error is returned.
pub fn launch_game(
    config: RunConfigProxy,
    agents: usize,
    options: &StartOptions,
) -> Result<LaunchedGame> {
    let per_agent = agent_options(options, agents)?;
    let mut game = LaunchedGame {
        run_config: config,
        processes: Vec::with_capacity(agents),
    };

    for (agent, agent_options) in per_agent.into_iter().enumerate() {
        match game.run_config.start(agent_options) {
            Ok(process) => {
                info!(
                    agent,
                    run_config = game.run_config.name(),
                    pid = ?process.pid(),
                    port = process.port(),
                    "Simulation started"
                );
                game.processes.push(process);
            }
            Err(e) => {
                if let Err(close_err) = game.close_all() {
                    warn!(error = %close_err, "Cleanup after failed launch was incomplete");
                }
                return Err(e.into());
            }
        }
    }

    Ok(game)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_uses_settings_selection() {
        let registry = RunConfigRegistry::new();
        let settings = EnvSettings {
            run_config: Some("Linux".to_string()),
            ..EnvSettings::default()
        };
        let err = resolve_run_config_with(&registry, &settings, &LaunchOverrides::default())
            .unwrap_err();
        assert!(err.to_string().contains("No valid run_configs"));
    }

    #[test]
    fn test_agent_options_reserve_distinct_ports() {
        let per_agent = agent_options(&StartOptions::default(), 4).unwrap();
        let mut ports: Vec<u16> = per_agent.iter().filter_map(|o| o.port).collect();
        ports.sort_unstable();
        ports.dedup();
        assert_eq!(ports.len(), 4);
    }

    #[test]
    fn test_agent_options_consecutive_from_explicit_port() {
        let options = StartOptions {
            port: Some(5000),
            full_screen: true,
            ..StartOptions::default()
        };
        let per_agent = agent_options(&options, 3).unwrap();
        let ports: Vec<Option<u16>> = per_agent.iter().map(|o| o.port).collect();
        assert_eq!(ports, vec![Some(5000), Some(5001), Some(5002)]);
        assert!(per_agent.iter().all(|o| o.full_screen));
    }

    #[test]
    fn test_agent_options_port_overflow() {
        let options = StartOptions {
            port: Some(u16::MAX),
            ..StartOptions::default()
        };
        assert!(agent_options(&options, 1).is_ok());
        let err = agent_options(&options, 2).unwrap_err();
        assert!(err.to_string().contains("consecutive ports"));
    }
}
