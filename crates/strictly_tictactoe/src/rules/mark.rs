//! Mark placement.

use super::super::{Board, CELL_COUNT, Cell, Seat};
use derive_more::Display;
use tracing::instrument;

/// Why a mark could not be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum InvalidMove {
    /// The index is not on the board.
    #[display("Cell index {} is off the board (must be 0-8)", _0)]
    OutOfRange(usize),

    /// The cell already carries a mark.
    #[display("Cell {} is already marked", _0)]
    Occupied(usize),
}

impl std::error::Error for InvalidMove {}

/// Places `seat`'s mark at `index`, returning the new board.
///
/// The input board is left untouched, so a rejected move cannot leak a
/// partial update.
#[instrument(level = "trace")]
pub fn apply_mark(board: &Board, index: usize, seat: Seat) -> Result<Board, InvalidMove> {
    if index >= CELL_COUNT {
        return Err(InvalidMove::OutOfRange(index));
    }
    if !board.is_empty_at(index) {
        return Err(InvalidMove::Occupied(index));
    }
    Ok(board.with_cell(index, Cell::Marked(seat)))
}
