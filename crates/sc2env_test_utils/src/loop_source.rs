//! Scripted game-loop source.
//!
//! Simulates the clock of a running game without a game: every agent sees
//! the shared clock, optionally trailing it by a fixed amount or stalling at
//! a fixed loop, and the episode can be ended at a chosen loop.

use sc2env_core::clock::{GameLoopSource, LoopObservation};
use sc2env_core::error::{EnvError, Result};

#[derive(Debug, Clone, Copy, Default)]
struct AgentScript {
    trail: u64,
    stall_at: Option<u64>,
}

/// A deterministic [`GameLoopSource`] for tests.
#[derive(Debug, Clone)]
pub struct ScriptedLoopSource {
    clock: u64,
    start_loop: u64,
    episode_end: Option<u64>,
    agents: Vec<AgentScript>,
    advance_calls: Vec<u32>,
    fail_advance: Option<String>,
    fail_observe: Option<(usize, String)>,
}

impl ScriptedLoopSource {
    /// A source for `agents` agents whose clocks track the game exactly.
    #[must_use]
    pub fn new(agents: usize) -> Self {
        Self {
            clock: 0,
            start_loop: 0,
            episode_end: None,
            agents: vec![AgentScript::default(); agents],
            advance_calls: Vec::new(),
            fail_advance: None,
            fail_observe: None,
        }
    }

    /// Episodes start at `game_loop` instead of 0.
    #[must_use]
    pub fn starting_at(mut self, game_loop: u64) -> Self {
        self.start_loop = game_loop;
        self.clock = game_loop;
        self
    }

    /// The episode ends once the clock reaches `game_loop`.
    #[must_use]
    pub fn ending_at(mut self, game_loop: u64) -> Self {
        self.episode_end = Some(game_loop);
        self
    }

    /// `agent` always sees the clock `loops` behind.
    #[must_use]
    pub fn trailing(mut self, agent: usize, loops: u64) -> Self {
        self.agents[agent].trail = loops;
        self
    }

    /// `agent` never sees the clock past `game_loop`.
    #[must_use]
    pub fn stalling(mut self, agent: usize, game_loop: u64) -> Self {
        self.agents[agent].stall_at = Some(game_loop);
        self
    }

    /// Every `advance` fails with `message`.
    #[must_use]
    pub fn failing_advance(mut self, message: impl Into<String>) -> Self {
        self.fail_advance = Some(message.into());
        self
    }

    /// Observing `agent` fails with `message` once the game has advanced.
    #[must_use]
    pub fn failing_observe(mut self, agent: usize, message: impl Into<String>) -> Self {
        self.fail_observe = Some((agent, message.into()));
        self
    }

    /// Loop counts passed to `advance`, in order.
    #[must_use]
    pub fn advance_calls(&self) -> &[u32] {
        &self.advance_calls
    }

    /// Current authoritative clock.
    #[must_use]
    pub fn clock(&self) -> u64 {
        self.clock
    }
}

impl GameLoopSource for ScriptedLoopSource {
    fn agent_count(&self) -> usize {
        self.agents.len()
    }

    fn reset(&mut self) -> Result<()> {
        self.clock = self.start_loop;
        self.advance_calls.clear();
        Ok(())
    }

    fn advance(&mut self, loops: u32) -> Result<()> {
        if let Some(message) = &self.fail_advance {
            return Err(EnvError::source_error(message.clone()));
        }
        self.advance_calls.push(loops);
        self.clock += u64::from(loops);
        if let Some(end) = self.episode_end {
            self.clock = self.clock.min(end);
        }
        Ok(())
    }

    fn observe(&mut self, agent: usize) -> Result<LoopObservation> {
        let script = self
            .agents
            .get(agent)
            .ok_or_else(|| EnvError::source_error(format!("no agent {agent}")))?;
        if let Some((failing, message)) = &self.fail_observe {
            if *failing == agent && !self.advance_calls.is_empty() {
                return Err(EnvError::source_error(message.clone()));
            }
        }
        let mut game_loop = self.clock.saturating_sub(script.trail);
        if let Some(stall) = script.stall_at {
            game_loop = game_loop.min(stall);
        }
        let complete = self.episode_end.is_some_and(|end| self.clock >= end);
        Ok(LoopObservation {
            game_loop,
            episode_complete: complete,
        })
    }
}
