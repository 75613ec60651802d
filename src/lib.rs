//! Capture-Go: a capture-count Go engine with Monte Carlo Tree Search.
//!
//! The rules are simplified Go: stones are captured when their group runs
//! out of liberties, suicide is illegal, two consecutive passes end the
//! game, and whoever captured more stones wins. There is no ko rule,
//! territory scoring or komi.
//!
//! ## Modules
//!
//! - [`constants`] - Default board size and engine parameters
//! - [`board`] - Colors, cells, moves and vertex strings
//! - [`position`] - Board state, captures and suicide checks
//! - [`mcts`] - Monte Carlo Tree Search with UCT
//! - [`playout`] - Random game simulation for position evaluation
//! - [`worker`] - Running a search on a background thread
//! - [`gtp`] - Go Text Protocol front-end
//!
//! ## Example
//!
//! ```
//! use capture_go::mcts::{SearchConfig, SearchEngine};
//! use capture_go::position::BoardState;
//!
//! // Create a new game and play a move
//! let mut pos = BoardState::new(9);
//! pos.apply_move(4, 4).unwrap();
//!
//! // Run MCTS to find White's reply
//! let mut engine = SearchEngine::new(SearchConfig::default());
//! let reply = engine.choose_move(&pos, 100);
//! assert!(reply.is_some());
//! ```

pub mod board;
pub mod constants;
pub mod gtp;
pub mod mcts;
pub mod playout;
pub mod position;
pub mod worker;
