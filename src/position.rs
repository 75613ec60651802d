//! Board state and move execution.
//!
//! This module holds the game-of-record: an NxN grid of cells, the player
//! to move, the consecutive pass counter and per-color capture counts.
//! Moves are checked and applied here:
//! - Stone placement and capture of enemy groups left without liberties
//! - Suicide rejection, evaluated after captures are resolved
//! - Passing and two-pass game end
//!
//! There is no ko rule and no territory scoring. The game is decided by
//! capture count alone.

use std::fmt;

use thiserror::Error;

use crate::board::{column_label, CellState, Color, Move};

/// Result of attempting to place a stone.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    /// Coordinates lie outside the grid
    #[error("illegal move: ({row}, {col}) is outside the {size}x{size} board")]
    OutOfBounds { row: usize, col: usize, size: usize },
    /// Point is not empty
    #[error("illegal move: ({row}, {col}) is not empty")]
    CellOccupied { row: usize, col: usize },
    /// Placed group would have no liberties after capture resolution
    #[error("illegal move: ({row}, {col}) is suicide")]
    SuicideMove { row: usize, col: usize },
}

/// A capture-Go position.
///
/// Cells are stored row-major. Cloning produces a fully independent copy,
/// which is how the search engine explores moves without touching the
/// game-of-record.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BoardState {
    size: usize,
    grid: Vec<CellState>,
    to_move: Color,
    consecutive_passes: u32,
    /// Stones removed by each color, indexed by [`Color::index`]
    captures: [u32; 2],
}

impl BoardState {
    /// Create an empty board with Black to move.
    ///
    /// # Panics
    /// Panics if `size` is zero.
    pub fn new(size: usize) -> Self {
        assert!(size > 0, "board size must be positive");
        Self {
            size,
            grid: vec![CellState::Empty; size * size],
            to_move: Color::Black,
            consecutive_passes: 0,
            captures: [0; 2],
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    fn idx(&self, row: usize, col: usize) -> usize {
        row * self.size + col
    }

    #[inline]
    fn in_bounds(&self, row: usize, col: usize) -> bool {
        row < self.size && col < self.size
    }

    /// Contents of the cell at `(row, col)`.
    ///
    /// # Panics
    /// Panics if the coordinates are outside the board.
    pub fn cell(&self, row: usize, col: usize) -> CellState {
        assert!(
            self.in_bounds(row, col),
            "({row}, {col}) is outside the {0}x{0} board",
            self.size
        );
        self.grid[self.idx(row, col)]
    }

    /// The player to move.
    #[inline]
    pub fn current_player(&self) -> Color {
        self.to_move
    }

    /// Number of opposing stones `color` has captured so far.
    #[inline]
    pub fn captures(&self, color: Color) -> u32 {
        self.captures[color.index()]
    }

    #[inline]
    pub fn consecutive_passes(&self) -> u32 {
        self.consecutive_passes
    }

    /// The game ends after two consecutive passes.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.consecutive_passes >= 2
    }

    /// The color with strictly more captures, or `None` on a tie.
    pub fn leader(&self) -> Option<Color> {
        let black = self.captures(Color::Black);
        let white = self.captures(Color::White);
        match black.cmp(&white) {
            std::cmp::Ordering::Greater => Some(Color::Black),
            std::cmp::Ordering::Less => Some(Color::White),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Place a stone for the player to move at `(row, col)`.
    ///
    /// Enemy groups adjacent to the new stone that are left without
    /// liberties are removed first and credited to the mover. Only then is
    /// the new stone's own group checked: with no liberties the move is
    /// suicide, and the placement and any removals are undone.
    ///
    /// # Errors
    /// - [`MoveError::OutOfBounds`] if the coordinates are off the board
    /// - [`MoveError::CellOccupied`] if the point is not empty
    /// - [`MoveError::SuicideMove`] if the stone would have no liberties
    ///
    /// On error the position is left exactly as it was.
    pub fn apply_move(&mut self, row: usize, col: usize) -> Result<(), MoveError> {
        if !self.in_bounds(row, col) {
            return Err(MoveError::OutOfBounds {
                row,
                col,
                size: self.size,
            });
        }
        let pt = self.idx(row, col);
        if !self.grid[pt].is_empty() {
            return Err(MoveError::CellOccupied { row, col });
        }

        let mover = self.to_move;
        let enemy = CellState::from(mover.opponent());
        self.grid[pt] = mover.into();

        let mut visited = vec![false; self.grid.len()];
        let mut to_remove: Vec<usize> = Vec::new();
        let mut group = Vec::new();

        for n in neighbors(self.size, pt) {
            if self.grid[n] != enemy || visited[n] {
                continue;
            }
            group.clear();
            if self.flood_group(n, &mut visited, &mut group) == 0 {
                to_remove.extend_from_slice(&group);
            }
        }

        for &r in &to_remove {
            self.grid[r] = CellState::Empty;
        }

        if self.group_liberties(pt) == 0 {
            for &r in &to_remove {
                self.grid[r] = enemy;
            }
            self.grid[pt] = CellState::Empty;
            return Err(MoveError::SuicideMove { row, col });
        }

        self.captures[mover.index()] += to_remove.len() as u32;
        self.consecutive_passes = 0;
        self.to_move = mover.opponent();
        Ok(())
    }

    /// Pass the turn. Always succeeds.
    pub fn pass_turn(&mut self) {
        self.to_move = self.to_move.opponent();
        self.consecutive_passes += 1;
    }

    /// Play a placement or a pass.
    pub fn play(&mut self, mv: Move) -> Result<(), MoveError> {
        match mv {
            Move::Place { row, col } => self.apply_move(row, col),
            Move::Pass => {
                self.pass_turn();
                Ok(())
            }
        }
    }

    /// Every empty cell in row-major order, followed by a pass.
    ///
    /// Suicide placements are not filtered out; they fail when played.
    pub fn legal_moves(&self) -> Vec<Move> {
        let mut moves = Vec::with_capacity(self.grid.len() + 1);
        self.legal_moves_into(&mut moves);
        moves
    }

    /// Refill `moves` with the output of [`legal_moves`](Self::legal_moves).
    pub fn legal_moves_into(&self, moves: &mut Vec<Move>) {
        moves.clear();
        moves.extend(
            self.grid
                .iter()
                .enumerate()
                .filter(|(_, c)| c.is_empty())
                .map(|(pt, _)| Move::place(pt / self.size, pt % self.size)),
        );
        moves.push(Move::Pass);
    }

    /// Liberty count of the group containing the stone at `(row, col)`.
    ///
    /// Returns `None` for an empty or off-board point.
    pub fn liberties(&self, row: usize, col: usize) -> Option<usize> {
        if !self.in_bounds(row, col) {
            return None;
        }
        let pt = self.idx(row, col);
        if self.grid[pt].is_empty() {
            return None;
        }
        Some(self.group_liberties(pt))
    }

    /// Count the liberties of the group at `start`.
    fn group_liberties(&self, start: usize) -> usize {
        let mut visited = vec![false; self.grid.len()];
        let mut stones = Vec::new();
        self.flood_group(start, &mut visited, &mut stones)
    }

    /// Flood-fill the group containing `start`.
    ///
    /// Appends the group's stones to `stones`, marks them in `visited` and
    /// returns the number of distinct empty points adjacent to the group.
    fn flood_group(&self, start: usize, visited: &mut [bool], stones: &mut Vec<usize>) -> usize {
        let color = self.grid[start];
        let mut liberty_visited = vec![false; self.grid.len()];
        let mut libs = 0;
        let mut stack = vec![start];
        visited[start] = true;

        while let Some(pt) = stack.pop() {
            stones.push(pt);
            for n in neighbors(self.size, pt) {
                match self.grid[n] {
                    CellState::Empty => {
                        if !liberty_visited[n] {
                            liberty_visited[n] = true;
                            libs += 1;
                        }
                    }
                    c if c == color && !visited[n] => {
                        visited[n] = true;
                        stack.push(n);
                    }
                    _ => {}
                }
            }
        }
        libs
    }
}

/// The up-to-four orthogonal neighbors (N, E, S, W) of a point.
#[inline]
fn neighbors(size: usize, pt: usize) -> impl Iterator<Item = usize> {
    let (row, col) = (pt / size, pt % size);
    [
        (row > 0).then(|| pt - size),
        (col + 1 < size).then(|| pt + 1),
        (row + 1 < size).then(|| pt + size),
        (col > 0).then(|| pt - 1),
    ]
    .into_iter()
    .flatten()
}

impl fmt::Display for BoardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "   ")?;
        for col in 0..self.size {
            write!(f, " {}", column_label(col))?;
        }
        writeln!(f)?;
        for row in 0..self.size {
            write!(f, "{:>3}", self.size - row)?;
            for col in 0..self.size {
                let ch = match self.grid[self.idx(row, col)] {
                    CellState::Black => 'X',
                    CellState::White => 'O',
                    CellState::Empty => '.',
                };
                write!(f, " {ch}")?;
            }
            writeln!(f)?;
        }
        writeln!(
            f,
            "{} to move | Captures: Black={} White={}",
            self.to_move,
            self.captures(Color::Black),
            self.captures(Color::White)
        )
    }
}
