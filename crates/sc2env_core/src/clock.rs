//! Access to the simulation's game-loop counter.

use crate::error::Result;

/// One agent's view of the simulation clock after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopObservation {
    /// Game loop the observation was taken at.
    pub game_loop: u64,
    /// Whether the game reported the episode as over.
    pub episode_complete: bool,
}

impl LoopObservation {
    /// Observation of a running episode.
    #[must_use]
    pub const fn running(game_loop: u64) -> Self {
        Self {
            game_loop,
            episode_complete: false,
        }
    }

    /// Observation of a finished episode.
    #[must_use]
    pub const fn complete(game_loop: u64) -> Self {
        Self {
            game_loop,
            episode_complete: true,
        }
    }
}

/// Drives the simulation clock for every connected agent.
///
/// Implemented by whatever talks to the running game; the environment only
/// needs to advance the clock and read it back.
pub trait GameLoopSource {
    /// Number of agents connected to the simulation.
    fn agent_count(&self) -> usize;

    /// Start a new episode.
    fn reset(&mut self) -> Result<()>;

    /// Request that the simulation advance by `loops` game loops.
    fn advance(&mut self, loops: u32) -> Result<()>;

    /// Read the clock as seen by `agent`.
    fn observe(&mut self, agent: usize) -> Result<LoopObservation>;
}
