//! Running a search off the interactive thread.
//!
//! The core search is synchronous. Front-ends that must stay responsive
//! hand a clone of the position to [`spawn_search`] and collect the move
//! from the returned [`PendingMove`]. There is no cancellation: a started
//! search always runs its full iteration budget.

use std::thread::{self, JoinHandle};

use log::debug;

use crate::board::Move;
use crate::mcts::{SearchConfig, SearchEngine, SearchError};
use crate::position::BoardState;

/// A search running on a background thread.
pub struct PendingMove {
    handle: JoinHandle<Option<Move>>,
}

impl PendingMove {
    /// Whether the search has completed.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Block until the search completes and return its move.
    ///
    /// # Errors
    /// - [`SearchError::NoLegalMove`] if the position had no move to offer
    /// - [`SearchError::WorkerPanicked`] if the search thread panicked
    pub fn wait(self) -> Result<Move, SearchError> {
        self.handle
            .join()
            .map_err(|_| SearchError::WorkerPanicked)?
            .ok_or(SearchError::NoLegalMove)
    }
}

/// Start choosing a move for `state` on a new thread.
///
/// The position is cloned before the thread starts; the caller keeps sole
/// ownership of its own board.
pub fn spawn_search(
    config: SearchConfig,
    seed: u64,
    state: &BoardState,
    iterations: usize,
) -> Result<PendingMove, SearchError> {
    let snapshot = state.clone();
    debug!("spawning search: {iterations} iterations, seed {seed}");

    let handle = thread::Builder::new()
        .name("mcts-search".into())
        .spawn(move || {
            let mut engine = SearchEngine::with_seed(config, seed);
            engine.choose_move(&snapshot, iterations)
        })?;

    Ok(PendingMove { handle })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_background_search_returns_move() {
        let mut pos = BoardState::new(3);
        pos.apply_move(1, 1).unwrap();
        let pending = spawn_search(SearchConfig::default(), 3, &pos, 30).unwrap();
        let mv = pending.wait().unwrap();
        match mv {
            Move::Place { row, col } => assert!(pos.cell(row, col).is_empty()),
            Move::Pass => {}
        }
    }

    #[test]
    fn test_background_search_finished_game() {
        let mut pos = BoardState::new(3);
        pos.pass_turn();
        pos.pass_turn();
        let pending = spawn_search(SearchConfig::default(), 3, &pos, 5).unwrap();
        assert_matches!(pending.wait(), Err(SearchError::NoLegalMove));
    }

    #[test]
    fn test_same_seed_same_move() {
        let pos = BoardState::new(4);
        let a = spawn_search(SearchConfig::default(), 99, &pos, 40).unwrap().wait().unwrap();
        let b = spawn_search(SearchConfig::default(), 99, &pos, 40).unwrap().wait().unwrap();
        assert_eq!(a, b);
    }
}
