//! Game-loop lag detection.
//!
//! Each environment step asks the simulation to advance to a target game
//! loop. The simulation runs in its own process and may fall behind; a small
//! amount of lag is acceptable while the episode is still running because a
//! later step can catch up. Once the episode is over there is no later step,
//! so any remaining lag is fatal.

use crate::error::SyncError;

/// Validates observed game loops against the expected target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LagMonitor {
    tolerance: u64,
}

impl LagMonitor {
    /// Create a monitor allowing up to `tolerance` game loops of lag.
    #[must_use]
    pub const fn new(tolerance: u64) -> Self {
        Self { tolerance }
    }

    /// Configured tolerance in game loops.
    #[must_use]
    pub const fn tolerance(&self) -> u64 {
        self.tolerance
    }

    /// Check one observation.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::EpisodeEnded`] if the episode finished behind its
    /// target, or [`SyncError::LagExceeded`] if the clock is further behind
    /// than the tolerance allows.
    pub fn check(
        &self,
        game_loop: u64,
        target_game_loop: u64,
        episode_complete: bool,
    ) -> Result<(), SyncError> {
        check_game_loop_lag(game_loop, target_game_loop, episode_complete, self.tolerance)
    }
}

/// Stateless form of [`LagMonitor::check`].
///
/// Overshooting the target is not lag and is always accepted.
pub fn check_game_loop_lag(
    game_loop: u64,
    target_game_loop: u64,
    episode_complete: bool,
    tolerance: u64,
) -> Result<(), SyncError> {
    if game_loop >= target_game_loop {
        return Ok(());
    }

    if episode_complete {
        return Err(SyncError::EpisodeEnded {
            game_loop,
            target_game_loop,
        });
    }

    let lag = target_game_loop - game_loop;
    if lag <= tolerance {
        tracing::debug!(game_loop, target_game_loop, lag, "Game loop lagging within tolerance");
        return Ok(());
    }

    Err(SyncError::LagExceeded {
        game_loop,
        target_game_loop,
        lag,
        tolerance,
    })
}
