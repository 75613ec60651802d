//! Stone colors, cell contents, moves and GTP-style vertex strings.
//!
//! Rows are numbered from the top (row 0) and columns from the left
//! (column 0). Vertices use Go notation: a column letter A-Z skipping `I`
//! and a row number counted from the bottom, so on a 9x9 board `A9` is
//! `(0, 0)` and `J1` is `(8, 8)`.

use std::fmt;

use thiserror::Error;

/// A player color.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    White,
}

impl Color {
    /// The other player.
    #[inline]
    pub fn opponent(self) -> Self {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    /// Index into per-color arrays.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Color::Black => 0,
            Color::White => 1,
        }
    }

    /// Parse a GTP color argument (`b`, `black`, `w`, `white`).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "b" | "black" => Some(Color::Black),
            "w" | "white" => Some(Color::White),
            _ => None,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Black => write!(f, "Black"),
            Color::White => write!(f, "White"),
        }
    }
}

/// Contents of a single board cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum CellState {
    #[default]
    Empty,
    Black,
    White,
}

impl CellState {
    /// The stone color, or `None` for an empty cell.
    #[inline]
    pub fn color(self) -> Option<Color> {
        match self {
            CellState::Empty => None,
            CellState::Black => Some(Color::Black),
            CellState::White => Some(Color::White),
        }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self == CellState::Empty
    }
}

impl From<Color> for CellState {
    fn from(color: Color) -> Self {
        match color {
            Color::Black => CellState::Black,
            Color::White => CellState::White,
        }
    }
}

/// A move: a stone placement or a pass.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Move {
    Place { row: usize, col: usize },
    Pass,
}

impl Move {
    #[inline]
    pub fn place(row: usize, col: usize) -> Self {
        Move::Place { row, col }
    }
}

/// Failure to turn a vertex string into a [`Move`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordError {
    #[error("invalid vertex '{0}'")]
    Malformed(String),
    #[error("vertex '{vertex}' is outside a {size}x{size} board")]
    OutOfRange { vertex: String, size: usize },
}

/// Column letters in Go order (no `I`).
const COLUMNS: &[u8] = b"ABCDEFGHJKLMNOPQRSTUVWXYZ";

/// Parse a vertex string (e.g. `"D4"`, `"pass"`) for a board of `size`.
pub fn parse_vertex(s: &str, size: usize) -> Result<Move, CoordError> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("pass") {
        return Ok(Move::Pass);
    }

    let bytes = s.as_bytes();
    if bytes.len() < 2 {
        return Err(CoordError::Malformed(s.to_string()));
    }

    let col_char = bytes[0].to_ascii_uppercase();
    let col = COLUMNS
        .iter()
        .position(|&c| c == col_char)
        .ok_or_else(|| CoordError::Malformed(s.to_string()))?;

    let number: usize = s[1..]
        .parse()
        .map_err(|_| CoordError::Malformed(s.to_string()))?;

    if col >= size || number == 0 || number > size {
        return Err(CoordError::OutOfRange {
            vertex: s.to_string(),
            size,
        });
    }

    Ok(Move::place(size - number, col))
}

/// Format a move as a vertex string for a board of `size`.
///
/// Returns `"pass"` for [`Move::Pass`].
pub fn format_move(mv: Move, size: usize) -> String {
    match mv {
        Move::Pass => "pass".into(),
        Move::Place { row, col } => {
            let c = COLUMNS.get(col).map(|&b| b as char).unwrap_or('?');
            format!("{c}{}", size - row)
        }
    }
}

/// Column label for a rendered board.
pub(crate) fn column_label(col: usize) -> char {
    COLUMNS.get(col).map(|&b| b as char).unwrap_or('?')
}
