//! Board dimensions and engine parameters.
//!
//! Board size is a runtime parameter of [`BoardState`](crate::position::BoardState);
//! the values here are the defaults the front-ends start from.

// =============================================================================
// Board Geometry
// =============================================================================

/// Default board size (NxN).
pub const DEFAULT_SIZE: usize = 19;

/// Largest board GTP vertices can address (A-Z without I).
pub const MAX_GTP_SIZE: usize = 25;

/// Smallest board the front-ends accept.
pub const MIN_SIZE: usize = 2;

// =============================================================================
// MCTS Parameters
// =============================================================================

/// Default number of search iterations per engine move.
pub const DEFAULT_ITERATIONS: usize = 1000;

/// UCT exploration constant.
pub const EXPLORATION: f64 = std::f64::consts::SQRT_2;

/// Rollout safety cap, in move attempts per board cell.
pub const ROLLOUT_LIMIT_FACTOR: usize = 3;

/// Rollout safety cap for a board of the given size.
#[inline]
pub const fn rollout_limit(size: usize) -> usize {
    size * size * ROLLOUT_LIMIT_FACTOR
}

// =============================================================================
// Rewards
// =============================================================================

/// Playout reward when White finishes with more captures.
pub const REWARD_WHITE_WIN: f64 = 1.0;

/// Playout reward when Black finishes with more captures.
pub const REWARD_BLACK_WIN: f64 = 0.0;

/// Playout reward on equal captures.
pub const REWARD_DRAW: f64 = 0.5;
