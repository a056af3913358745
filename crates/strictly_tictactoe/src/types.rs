//! Core domain types for tic-tac-toe.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of cells on the board.
pub const CELL_COUNT: usize = 9;

/// Turn parity: which of the two seated players a mark or a turn belongs to.
///
/// Seats are assigned by join order and serialize as `0` and `1`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, strum::EnumIter,
)]
#[serde(into = "u8", try_from = "u8")]
pub enum Seat {
    /// Seat 0 (moves first).
    First,
    /// Seat 1.
    Second,
}

impl Seat {
    /// Returns the seat's position in a player list.
    pub fn index(self) -> usize {
        match self {
            Seat::First => 0,
            Seat::Second => 1,
        }
    }

    /// Returns the seat at the given player-list position, if any.
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Seat::First),
            1 => Some(Seat::Second),
            _ => None,
        }
    }

    /// Returns the other seat.
    pub fn opponent(self) -> Self {
        match self {
            Seat::First => Seat::Second,
            Seat::Second => Seat::First,
        }
    }
}

impl From<Seat> for u8 {
    fn from(seat: Seat) -> Self {
        match seat {
            Seat::First => 0,
            Seat::Second => 1,
        }
    }
}

impl TryFrom<u8> for Seat {
    type Error = UnknownSeat;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Seat::from_index(usize::from(value)).ok_or(UnknownSeat(value))
    }
}

/// A wire value that names neither seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[display("Unknown seat {}, expected 0 or 1", _0)]
pub struct UnknownSeat(pub u8);

impl std::error::Error for UnknownSeat {}

/// A cell on the board.
///
/// Serializes as `null` when empty, otherwise as the owning seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Option<Seat>", into = "Option<Seat>")]
pub enum Cell {
    /// No mark yet.
    #[default]
    Empty,
    /// Marked by a seat.
    Marked(Seat),
}

impl From<Option<Seat>> for Cell {
    fn from(value: Option<Seat>) -> Self {
        value.map_or(Cell::Empty, Cell::Marked)
    }
}

impl From<Cell> for Option<Seat> {
    fn from(cell: Cell) -> Self {
        match cell {
            Cell::Empty => None,
            Cell::Marked(seat) => Some(seat),
        }
    }
}

/// 3x3 board, cells indexed 0-8 in row-major order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    cells: [Cell; CELL_COUNT],
}

impl Board {
    /// Creates an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a board from explicit cells.
    pub fn from_cells(cells: [Cell; CELL_COUNT]) -> Self {
        Self { cells }
    }

    /// Gets the cell at `index`, or `None` when off the board.
    pub fn get(&self, index: usize) -> Option<Cell> {
        self.cells.get(index).copied()
    }

    /// Checks whether the cell at `index` exists and is empty.
    pub fn is_empty_at(&self, index: usize) -> bool {
        matches!(self.get(index), Some(Cell::Empty))
    }

    /// Returns all cells.
    pub fn cells(&self) -> &[Cell; CELL_COUNT] {
        &self.cells
    }

    /// Indices of the cells still open.
    pub fn open_cells(&self) -> impl Iterator<Item = usize> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| **cell == Cell::Empty)
            .map(|(index, _)| index)
    }

    pub(crate) fn with_cell(mut self, index: usize, cell: Cell) -> Self {
        self.cells[index] = cell;
        self
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..3 {
            for col in 0..3 {
                let index = row * 3 + col;
                match self.cells[index] {
                    Cell::Empty => write!(f, "{}", index)?,
                    Cell::Marked(Seat::First) => f.write_str("X")?,
                    Cell::Marked(Seat::Second) => f.write_str("O")?,
                }
                if col < 2 {
                    f.write_str("|")?;
                }
            }
            if row < 2 {
                f.write_str("\n-+-+-\n")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seat_index_round_trip() {
        assert_eq!(Seat::from_index(Seat::First.index()), Some(Seat::First));
        assert_eq!(Seat::from_index(Seat::Second.index()), Some(Seat::Second));
        assert_eq!(Seat::from_index(2), None);
    }

    #[test]
    fn test_seat_opponent() {
        assert_eq!(Seat::First.opponent(), Seat::Second);
        assert_eq!(Seat::Second.opponent(), Seat::First);
    }

    #[test]
    fn test_new_board_is_open() {
        let board = Board::new();
        assert_eq!(board.open_cells().count(), 9);
        assert!(board.is_empty_at(0));
        assert!(!board.is_empty_at(9));
    }

    #[test]
    fn test_board_wire_format() {
        let board = Board::new()
            .with_cell(0, Cell::Marked(Seat::First))
            .with_cell(4, Cell::Marked(Seat::Second));
        let json = serde_json::to_string(&board).unwrap();
        assert_eq!(json, "[0,null,null,null,1,null,null,null,null]");

        let parsed: Board = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, board);
    }

    #[test]
    fn test_unknown_seat_rejected() {
        let parsed: Result<Board, _> =
            serde_json::from_str("[2,null,null,null,null,null,null,null,null]");
        assert!(parsed.is_err());
    }

    #[test]
    fn test_display() {
        let board = Board::new().with_cell(4, Cell::Marked(Seat::First));
        assert_eq!(board.to_string(), "0|1|2\n-+-+-\n3|X|5\n-+-+-\n6|7|8");
    }
}
