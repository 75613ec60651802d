//! Monte Carlo playouts (random game simulation).
//!
//! A playout plays uniformly random moves, passes included, until two
//! consecutive passes end the game or the attempt cap is reached. The
//! result is scored on captures alone.

use crate::board::{Color, Move};
use crate::constants::{REWARD_BLACK_WIN, REWARD_DRAW, REWARD_WHITE_WIN};
use crate::position::BoardState;

/// Perform a random playout from `pos` and return the reward.
///
/// `pos` itself is untouched; the playout runs on a clone. Placements that
/// turn out to be suicide are skipped, and every attempt, failed or not,
/// counts toward `limit`.
///
/// The reward is from White's point of view, see [`reward`].
pub fn rollout(pos: &BoardState, rng: &mut fastrand::Rng, limit: usize) -> f64 {
    let mut sim = pos.clone();
    let mut moves: Vec<Move> = Vec::with_capacity(sim.size() * sim.size() + 1);
    let mut attempts = 0;

    while !sim.is_terminal() && attempts < limit {
        sim.legal_moves_into(&mut moves);
        let mv = moves[rng.usize(..moves.len())];
        // A failed placement leaves `sim` untouched; just draw again.
        let _ = sim.play(mv);
        attempts += 1;
    }

    reward(&sim)
}

/// Score a position on captures: 1.0 if White leads, 0.0 if Black leads,
/// 0.5 on a tie.
pub fn reward(pos: &BoardState) -> f64 {
    match pos.leader() {
        Some(Color::White) => REWARD_WHITE_WIN,
        Some(Color::Black) => REWARD_BLACK_WIN,
        None => REWARD_DRAW,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reward_on_fresh_board_is_draw() {
        let pos = BoardState::new(5);
        assert_eq!(reward(&pos), REWARD_DRAW);
    }

    #[test]
    fn test_reward_black_leads() {
        let mut pos = BoardState::new(5);
        // Black surrounds and takes the white stone at (1,1)
        for mv in [
            Move::place(0, 1),
            Move::place(1, 1),
            Move::place(1, 0),
            Move::Pass,
            Move::place(1, 2),
            Move::Pass,
            Move::place(2, 1),
        ] {
            pos.play(mv).unwrap();
        }
        assert_eq!(pos.captures(Color::Black), 1);
        assert_eq!(reward(&pos), REWARD_BLACK_WIN);
    }

    #[test]
    fn test_rollout_on_terminal_position_does_not_play() {
        let mut pos = BoardState::new(5);
        pos.pass_turn();
        pos.pass_turn();
        let mut rng = fastrand::Rng::with_seed(7);
        assert_eq!(rollout(&pos, &mut rng, 100), REWARD_DRAW);
    }

    #[test]
    fn test_rollout_leaves_input_untouched() {
        let pos = BoardState::new(5);
        let mut rng = fastrand::Rng::with_seed(42);
        for _ in 0..20 {
            let r = rollout(&pos, &mut rng, 75);
            assert!(r == REWARD_WHITE_WIN || r == REWARD_BLACK_WIN || r == REWARD_DRAW);
        }
        assert_eq!(pos, BoardState::new(5));
    }

    #[test]
    fn test_rollout_zero_limit_scores_start() {
        let pos = BoardState::new(3);
        let mut rng = fastrand::Rng::with_seed(1);
        assert_eq!(rollout(&pos, &mut rng, 0), REWARD_DRAW);
    }
}
