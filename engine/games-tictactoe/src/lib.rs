//! Tic-tac-toe family boards for the move-selection engine.
//!
//! Two variants share one [`Board`] type:
//!
//! - [`Variant::Basic`]: the classic 3x3 game.
//! - [`Variant::Ultimate`]: a 9x9 grid split into nine 3x3 sub-boards. Winning
//!   (or filling) a sub-board settles it, and three settled-and-won sub-boards in
//!   a row win the game. The cell you play inside a sub-board decides which
//!   sub-board your opponent must play in next, unless that sub-board is already
//!   settled, in which case they may play anywhere.
//!
//! # Usage
//!
//! ```rust
//! use games_tictactoe::{Board, Coord, Piece, Variant};
//!
//! let mut board = Board::new(Variant::Basic);
//! assert_eq!(board.legal_moves().len(), 9);
//!
//! board.apply_move(Coord::new(1, 1), Piece::First).unwrap();
//! assert!(!board.check_win().won);
//! ```

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

mod board;

pub use board::{check_three_in_a_row, Board, BoardError, WinCheck};

/// Contents of a cell, or the recorded outcome of a sub-board.
///
/// `Neither` only ever appears in the sub-board outcome grid, where it marks a
/// drawn sub-board. It is never placed on the board as a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Piece {
    First,
    Second,
    Neither,
}

impl Piece {
    /// The other player. `Neither` has no opponent and maps to itself.
    #[inline]
    pub fn opponent(self) -> Piece {
        match self {
            Piece::First => Piece::Second,
            Piece::Second => Piece::First,
            Piece::Neither => Piece::Neither,
        }
    }

    /// True for the two pieces that can actually be played.
    #[inline]
    pub fn is_player(self) -> bool {
        self != Piece::Neither
    }

    pub fn symbol(self) -> char {
        match self {
            Piece::First => 'X',
            Piece::Second => 'O',
            Piece::Neither => '-',
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Which member of the family is being played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    /// Plain 3x3 tic-tac-toe.
    Basic,
    /// 9x9 nested ("ultimate") tic-tac-toe.
    Ultimate,
}

impl Variant {
    /// Side length of the full grid.
    #[inline]
    pub fn board_size(self) -> usize {
        match self {
            Variant::Basic => 3,
            Variant::Ultimate => 9,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Variant::Basic => "basic",
            Variant::Ultimate => "ultimate",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown variant '{0}', expected 'basic' or 'ultimate'")]
pub struct ParseVariantError(pub String);

impl FromStr for Variant {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" | "classic" => Ok(Variant::Basic),
            "ultimate" | "nested" => Ok(Variant::Ultimate),
            other => Err(ParseVariantError(other.to_string())),
        }
    }
}

/// A cell coordinate: `x` is the column, `y` the row, both from the top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    pub x: usize,
    pub y: usize,
}

impl Coord {
    #[inline]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// The sub-board (column, row) that contains this cell.
    #[inline]
    pub fn subboard(self) -> (usize, usize) {
        (self.x / 3, self.y / 3)
    }

    /// The sub-board the next player is sent to after a move on this cell.
    #[inline]
    pub fn target_subboard(self) -> (usize, usize) {
        (self.x % 3, self.y % 3)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot parse '{0}' as a coordinate, expected 'x y' or 'x,y'")]
pub struct ParseCoordError(pub String);

impl FromStr for Coord {
    type Err = ParseCoordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|p| !p.is_empty())
            .collect();

        match parts.as_slice() {
            [x, y] => {
                let x = x.parse().map_err(|_| ParseCoordError(s.to_string()))?;
                let y = y.parse().map_err(|_| ParseCoordError(s.to_string()))?;
                Ok(Coord::new(x, y))
            }
            _ => Err(ParseCoordError(s.to_string())),
        }
    }
}

/// Result of examining one 3x3 grid for lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Some line holds three of the same playable piece.
    Won(Piece),
    /// No line, and all nine cells are filled.
    Drawn,
    Ongoing,
}
