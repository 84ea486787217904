//! # sc2env Test Utilities
//!
//! Shared testing utilities for all crates:
//! - Fake run configs and variants that record launches
//! - A scripted game-loop source for step-loop tests
//! - Property-based testing strategies for agent names

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod loop_source;
pub mod strategies;

/// Re-export proptest for convenience.
pub use proptest;
