//! Step-loop environment.
//!
//! Keeps every agent's view of the simulation in step with a single target
//! game loop. Each step advances the game by `step_mul` loops, then checks
//! every agent's observed game loop against the new target.

use sc2env_core::clock::{GameLoopSource, LoopObservation};
use sc2env_core::error::{EnvError, Result};
use sc2env_core::lag::LagMonitor;
use sc2env_core::names::crop_and_deduplicate_names;
use tracing::{debug, info};

use crate::settings::EnvSettings;

/// Where the environment is in its episode lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodeState {
    /// `reset` has not been called yet.
    NotStarted,
    /// Steps are allowed.
    Running,
    /// The game reported the episode as over.
    Ended,
}

/// Result of one environment step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    /// One observation per agent, in agent order.
    pub observations: Vec<LoopObservation>,
    /// Game loop every agent was expected to reach.
    pub target_game_loop: u64,
    /// Whether the episode ended on this step.
    pub episode_complete: bool,
}

/// Multi-agent environment over a [`GameLoopSource`].
#[derive(Debug)]
pub struct SC2Environment<S: GameLoopSource> {
    source: S,
    display_names: Vec<String>,
    monitors: Vec<LagMonitor>,
    step_mul: u32,
    target_game_loop: u64,
    episode_count: u64,
    episode_steps: u64,
    state: EpisodeState,
}

impl<S: GameLoopSource> SC2Environment<S> {
    /// Create an environment with one agent per name.
    ///
    /// Names are cropped and de-duplicated once, here, so labels stay stable
    /// for the lifetime of the environment.
    pub fn new<N: AsRef<str>>(settings: &EnvSettings, agent_names: &[N], source: S) -> Result<Self> {
        let expected = source.agent_count();
        if expected == 0 || agent_names.len() != expected {
            return Err(EnvError::AgentCountMismatch {
                expected,
                actual: agent_names.len(),
            });
        }

        let display_names = crop_and_deduplicate_names(agent_names);
        let monitors = vec![LagMonitor::new(settings.game_loop_lag_tolerance); expected];

        info!(
            agents = expected,
            step_mul = settings.step_mul,
            tolerance = settings.game_loop_lag_tolerance,
            names = ?display_names,
            "Environment created"
        );

        Ok(Self {
            source,
            display_names,
            monitors,
            step_mul: settings.step_mul,
            target_game_loop: 0,
            episode_count: 0,
            episode_steps: 0,
            state: EpisodeState::NotStarted,
        })
    }

    /// Display names, in agent order.
    pub fn display_names(&self) -> &[String] {
        &self.display_names
    }

    /// Current lifecycle state.
    pub fn state(&self) -> EpisodeState {
        self.state
    }

    /// Game loop the last step targeted.
    pub fn target_game_loop(&self) -> u64 {
        self.target_game_loop
    }

    /// Steps taken in the current episode.
    pub fn episode_steps(&self) -> u64 {
        self.episode_steps
    }

    /// Episodes started so far.
    pub fn episode_count(&self) -> u64 {
        self.episode_count
    }

    /// The underlying source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Start a new episode.
    ///
    /// The target is set to the furthest game loop any agent observes.
    pub fn reset(&mut self) -> Result<Vec<LoopObservation>> {
        self.source.reset()?;
        let observations = self.observe_all()?;
        self.target_game_loop = observations
            .iter()
            .map(|o| o.game_loop)
            .max()
            .unwrap_or(0);
        self.episode_steps = 0;
        self.episode_count += 1;
        self.state = EpisodeState::Running;
        debug!(
            episode = self.episode_count,
            game_loop = self.target_game_loop,
            "Episode reset"
        );
        Ok(observations)
    }

    /// Advance the game by `step_mul` loops and validate every agent's clock.
    ///
    /// # Errors
    ///
    /// [`EnvError::EpisodeNotRunning`] outside a running episode,
    /// [`EnvError::Sync`] if any agent's clock failed to keep up, or the
    /// source's own failure. Sync and source failures end the episode.
    pub fn step(&mut self) -> Result<StepOutcome> {
        if self.state != EpisodeState::Running {
            return Err(EnvError::EpisodeNotRunning);
        }

        // The game's position is unknown once the source fails mid-step.
        let observations = match self
            .source
            .advance(self.step_mul)
            .and_then(|()| self.observe_all())
        {
            Ok(observations) => observations,
            Err(e) => {
                self.state = EpisodeState::Ended;
                return Err(e);
            }
        };
        self.target_game_loop += u64::from(self.step_mul);
        self.episode_steps += 1;

        let episode_complete = observations.iter().any(|o| o.episode_complete);

        for (agent, (obs, monitor)) in observations.iter().zip(&self.monitors).enumerate() {
            if let Err(e) = monitor.check(obs.game_loop, self.target_game_loop, episode_complete) {
                self.state = EpisodeState::Ended;
                debug!(
                    agent,
                    name = %self.display_names[agent],
                    lag = e.lag(),
                    "Agent clock desynchronized"
                );
                return Err(e.into());
            }
        }

        if episode_complete {
            self.state = EpisodeState::Ended;
            info!(
                episode = self.episode_count,
                steps = self.episode_steps,
                game_loop = self.target_game_loop,
                "Episode complete"
            );
        }

        Ok(StepOutcome {
            observations,
            target_game_loop: self.target_game_loop,
            episode_complete,
        })
    }

    fn observe_all(&mut self) -> Result<Vec<LoopObservation>> {
        (0..self.display_names.len())
            .map(|agent| self.source.observe(agent))
            .collect()
    }
}
