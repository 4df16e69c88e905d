//! Move sources: where each side's moves come from.
//!
//! A human (or any other outside driver) submits coordinates that are checked
//! against the board before use; the computer runs a search. Both are driven
//! through the same [`MoveSource::next_move`] call.

use std::collections::VecDeque;

use games_tictactoe::{Board, BoardError, Coord, Piece};
use thiserror::Error;

use crate::search::{MctsSearch, SearchError};

/// Errors from asking a move source for its next move.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlayerError {
    #[error("no move has been submitted")]
    NoPendingMove,

    #[error(transparent)]
    Board(#[from] BoardError),

    #[error(transparent)]
    Search(#[from] SearchError),
}

/// FIFO of coordinates submitted from outside the engine.
#[derive(Debug, Clone, Default)]
pub struct ExternalMoves {
    queue: VecDeque<Coord>,
}

impl ExternalMoves {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submit(&mut self, mv: Coord) {
        self.queue.push_back(mv);
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    /// Take the oldest submitted move if it is legal on `board`. An illegal
    /// move is consumed and reported; the board is never touched.
    fn take_legal(&mut self, board: &Board) -> Result<Coord, PlayerError> {
        let mv = self.queue.pop_front().ok_or(PlayerError::NoPendingMove)?;
        if board.status().is_over() {
            return Err(BoardError::GameFinished.into());
        }
        if !board.is_legal(mv) {
            return Err(BoardError::IllegalMove { x: mv.x, y: mv.y }.into());
        }
        Ok(mv)
    }
}

/// One side of a game.
pub enum MoveSource {
    /// Moves supplied by the caller, validated against the board.
    External(ExternalMoves),
    /// Moves chosen by the search engine.
    Search(MctsSearch),
}

impl MoveSource {
    pub fn external() -> Self {
        MoveSource::External(ExternalMoves::new())
    }

    pub fn search(search: MctsSearch) -> Self {
        MoveSource::Search(search)
    }

    pub fn is_computer(&self) -> bool {
        matches!(self, MoveSource::Search(_))
    }

    /// Yield a legal move for `side` on `board`.
    pub fn next_move(&mut self, board: &Board, side: Piece) -> Result<Coord, PlayerError> {
        match self {
            MoveSource::External(moves) => moves.take_legal(board),
            MoveSource::Search(search) => Ok(search.request_move(board, side)?),
        }
    }

    /// Submit a coordinate for an external source. Ignored by the search.
    pub fn submit(&mut self, mv: Coord) {
        if let MoveSource::External(moves) = self {
            moves.submit(mv);
        }
    }

    /// Tell this side that the other side played `mv`.
    pub fn observe(&mut self, mv: Coord) {
        if let MoveSource::Search(search) = self {
            search.notify_external_move(mv);
        }
    }

    /// Drop per-game state before a new game.
    pub fn reset(&mut self) {
        match self {
            MoveSource::External(moves) => moves.clear(),
            MoveSource::Search(search) => search.reset(),
        }
    }
}
