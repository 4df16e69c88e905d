//! Board state, legal moves and win detection.

use std::fmt;

use thiserror::Error;

use crate::{Coord, Outcome, Piece, Variant};

/// Errors from the validated move mutator. The board is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("move ({x}, {y}) is not legal in this position")]
    IllegalMove { x: usize, y: usize },

    #[error("'Neither' cannot be played as a move")]
    InvalidPiece,

    #[error("the game is already finished")]
    GameFinished,
}

/// Game-over report from [`Board::check_win`].
///
/// `won` is set whenever the game has finished, including draws; `drawn`
/// tells the two apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WinCheck {
    pub won: bool,
    pub drawn: bool,
}

impl WinCheck {
    pub const ONGOING: WinCheck = WinCheck {
        won: false,
        drawn: false,
    };

    #[inline]
    pub fn is_over(self) -> bool {
        self.won
    }
}

impl From<Outcome> for WinCheck {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Won(_) => WinCheck {
                won: true,
                drawn: false,
            },
            Outcome::Drawn => WinCheck {
                won: true,
                drawn: true,
            },
            Outcome::Ongoing => WinCheck::ONGOING,
        }
    }
}

/// Line offsets inside a 3x3 grid: rows, columns, diagonals.
const LINES: [[(usize, usize); 3]; 8] = [
    [(0, 0), (1, 0), (2, 0)],
    [(0, 1), (1, 1), (2, 1)],
    [(0, 2), (1, 2), (2, 2)], // rows
    [(0, 0), (0, 1), (0, 2)],
    [(1, 0), (1, 1), (1, 2)],
    [(2, 0), (2, 1), (2, 2)], // columns
    [(0, 0), (1, 1), (2, 2)],
    [(2, 0), (1, 1), (0, 2)], // diagonals
];

/// Examine the 3x3 window of `grid` whose top-left corner is `origin`.
///
/// `grid` is row-major with rows `width` cells long. Used on the full basic
/// board, on each ultimate sub-board, and on the ultimate sub-board outcome
/// grid. Empty cells never match each other, and `Neither` counts as filled
/// but never forms a line.
pub fn check_three_in_a_row(origin: Coord, width: usize, grid: &[Option<Piece>]) -> Outcome {
    let at = |dx: usize, dy: usize| grid[(origin.y + dy) * width + origin.x + dx];

    for &line in &LINES {
        let [a, b, c] = line.map(|(dx, dy)| at(dx, dy));
        if let Some(piece) = a {
            if piece.is_player() && a == b && b == c {
                return Outcome::Won(piece);
            }
        }
    }

    let mut filled = 0;
    for dy in 0..3 {
        for dx in 0..3 {
            if at(dx, dy).is_some() {
                filled += 1;
            }
        }
    }

    if filled == 9 {
        Outcome::Drawn
    } else {
        Outcome::Ongoing
    }
}

/// A tic-tac-toe position, basic or ultimate.
///
/// Cloning is a deep copy; the search clones the authoritative board into a
/// fresh scratch board for every simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    variant: Variant,
    /// Row-major cell contents, never `Some(Piece::Neither)`.
    cells: Vec<Option<Piece>>,
    /// Sub-board outcomes (ultimate only), row-major 3x3. `Some` is final.
    settled: [Option<Piece>; 9],
    previous_move: Option<Coord>,
    moves_played: u32,
}

impl Board {
    /// Create an empty board.
    pub fn new(variant: Variant) -> Self {
        let size = variant.board_size();
        Self {
            variant,
            cells: vec![None; size * size],
            settled: [None; 9],
            previous_move: None,
            moves_played: 0,
        }
    }

    #[inline]
    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Side length of the grid (3 or 9).
    #[inline]
    pub fn size(&self) -> usize {
        self.variant.board_size()
    }

    #[inline]
    fn index(&self, coord: Coord) -> usize {
        coord.y * self.size() + coord.x
    }

    #[inline]
    fn in_bounds(&self, coord: Coord) -> bool {
        coord.x < self.size() && coord.y < self.size()
    }

    /// Piece on a cell, `None` if empty or out of range.
    pub fn cell(&self, coord: Coord) -> Option<Piece> {
        if !self.in_bounds(coord) {
            return None;
        }
        self.cells[self.index(coord)]
    }

    /// Recorded outcome of sub-board `(sx, sy)`: `None` while unsettled,
    /// `Some(Neither)` for a drawn sub-board. Always `None` in the basic variant.
    pub fn subboard_outcome(&self, sx: usize, sy: usize) -> Option<Piece> {
        if sx >= 3 || sy >= 3 {
            return None;
        }
        self.settled[sy * 3 + sx]
    }

    /// The 3x3 sub-board outcome grid, row-major.
    pub fn subboard_outcomes(&self) -> &[Option<Piece>; 9] {
        &self.settled
    }

    /// A cell is occupied if it holds a piece or its sub-board is settled.
    /// Cells off the grid count as occupied.
    pub fn is_occupied(&self, coord: Coord) -> bool {
        if !self.in_bounds(coord) {
            return true;
        }
        if self.cells[self.index(coord)].is_some() {
            return true;
        }
        if self.variant == Variant::Ultimate {
            let (sx, sy) = coord.subboard();
            return self.settled[sy * 3 + sx].is_some();
        }
        false
    }

    #[inline]
    pub fn previous_move(&self) -> Option<Coord> {
        self.previous_move
    }

    /// No move has been played yet, so no sub-board constraint applies.
    #[inline]
    pub fn is_first_move(&self) -> bool {
        self.previous_move.is_none()
    }

    #[inline]
    pub fn move_count(&self) -> u32 {
        self.moves_played
    }

    /// The sub-board the player to move is confined to, if any.
    ///
    /// `None` means the whole grid is open: basic variant, first move, or the
    /// previous move pointed into an already settled sub-board.
    pub fn constrained_subboard(&self) -> Option<(usize, usize)> {
        if self.variant != Variant::Ultimate {
            return None;
        }
        let (sx, sy) = self.previous_move?.target_subboard();
        if self.settled[sy * 3 + sx].is_none() {
            Some((sx, sy))
        } else {
            None
        }
    }

    /// Every legal move, scanning rows top to bottom and cells left to right.
    pub fn legal_moves(&self) -> Vec<Coord> {
        let mut moves = Vec::with_capacity(self.cells.len());

        match self.constrained_subboard() {
            Some((sx, sy)) => {
                for y in 3 * sy..3 * sy + 3 {
                    for x in 3 * sx..3 * sx + 3 {
                        let coord = Coord::new(x, y);
                        if !self.is_occupied(coord) {
                            moves.push(coord);
                        }
                    }
                }
            }
            None => {
                let size = self.size();
                for y in 0..size {
                    for x in 0..size {
                        let coord = Coord::new(x, y);
                        if !self.is_occupied(coord) {
                            moves.push(coord);
                        }
                    }
                }
            }
        }

        moves
    }

    /// Whether `coord` is currently a legal move.
    pub fn is_legal(&self, coord: Coord) -> bool {
        if !self.in_bounds(coord) || self.is_occupied(coord) {
            return false;
        }
        match self.constrained_subboard() {
            Some(target) => coord.subboard() == target,
            None => true,
        }
    }

    /// Settle sub-board `(sx, sy)` if it has just been won or filled.
    /// Returns the newly recorded outcome; already settled boards are skipped.
    fn settle_subboard(&mut self, sx: usize, sy: usize) -> Option<Piece> {
        let slot = sy * 3 + sx;
        if self.settled[slot].is_some() {
            return None;
        }

        let origin = Coord::new(3 * sx, 3 * sy);
        let outcome = match check_three_in_a_row(origin, self.size(), &self.cells) {
            Outcome::Won(piece) => piece,
            Outcome::Drawn => Piece::Neither,
            Outcome::Ongoing => return None,
        };
        self.settled[slot] = Some(outcome);
        Some(outcome)
    }

    /// Re-evaluate all nine sub-boards and record any newly won or drawn ones.
    ///
    /// Idempotent: settled sub-boards are never re-examined, so their outcome
    /// cannot change. Returns the sub-boards settled by this call. A no-op for
    /// the basic variant.
    pub fn check_finished_subboards(&mut self) -> Vec<(usize, usize)> {
        if self.variant != Variant::Ultimate {
            return Vec::new();
        }

        let mut newly_settled = Vec::new();
        for sy in 0..3 {
            for sx in 0..3 {
                if self.settle_subboard(sx, sy).is_some() {
                    newly_settled.push((sx, sy));
                }
            }
        }
        newly_settled
    }

    /// Outcome of the whole game given the current settlement state.
    pub fn outcome(&self) -> Outcome {
        match self.variant {
            Variant::Basic => check_three_in_a_row(Coord::new(0, 0), 3, &self.cells),
            Variant::Ultimate => check_three_in_a_row(Coord::new(0, 0), 3, &self.settled),
        }
    }

    /// Game-over check. For the ultimate variant, sub-board settlement is
    /// brought up to date first.
    pub fn check_win(&mut self) -> WinCheck {
        if self.variant == Variant::Ultimate {
            self.check_finished_subboards();
        }
        self.status()
    }

    /// Read-only game-over check. Settlement is kept current by every move, so
    /// this agrees with [`Board::check_win`] on boards built through the mutator.
    pub fn status(&self) -> WinCheck {
        WinCheck::from(self.outcome())
    }

    /// The winning piece of a decisively finished game.
    pub fn winner(&self) -> Option<Piece> {
        match self.outcome() {
            Outcome::Won(piece) => Some(piece),
            _ => None,
        }
    }

    /// Validated move: place `piece` at `mv`, record it as the previous move
    /// and settle its sub-board. Rejected moves leave the board unchanged.
    pub fn apply_move(&mut self, mv: Coord, piece: Piece) -> Result<(), BoardError> {
        if !piece.is_player() {
            return Err(BoardError::InvalidPiece);
        }
        if self.status().is_over() {
            return Err(BoardError::GameFinished);
        }
        if !self.is_legal(mv) {
            return Err(BoardError::IllegalMove { x: mv.x, y: mv.y });
        }

        self.play_unchecked(mv, piece);
        Ok(())
    }

    /// Place a move that the caller already knows to be legal, typically one
    /// taken straight from [`Board::legal_moves`]. Same bookkeeping as
    /// [`Board::apply_move`] without the validation.
    ///
    /// Returns the sub-board outcome settled by this move, if any.
    pub fn play_unchecked(&mut self, mv: Coord, piece: Piece) -> Option<Piece> {
        let idx = self.index(mv);
        debug_assert!(self.cells[idx].is_none(), "cell {} already filled", mv);
        debug_assert!(piece.is_player());

        self.cells[idx] = Some(piece);
        self.previous_move = Some(mv);
        self.moves_played += 1;

        if self.variant == Variant::Ultimate {
            let (sx, sy) = mv.subboard();
            self.settle_subboard(sx, sy)
        } else {
            None
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let size = self.size();
        let nested = self.variant == Variant::Ultimate;

        for y in 0..size {
            if nested && y > 0 && y % 3 == 0 {
                writeln!(f, "------+-------+------")?;
            }
            let mut line = String::with_capacity(2 * size + 4);
            for x in 0..size {
                if nested && x > 0 && x % 3 == 0 {
                    line.push_str("| ");
                }
                let coord = Coord::new(x, y);
                let symbol = match self.cells[self.index(coord)] {
                    Some(piece) => piece.symbol(),
                    None if self.is_occupied(coord) => '#',
                    None => '.',
                };
                line.push(symbol);
                line.push(' ');
            }
            writeln!(f, "{}", line.trim_end())?;
        }
        Ok(())
    }
}
