//! Win detection logic for tic-tac-toe.

use super::super::{Board, Cell, Seat};
use strum::IntoEnumIterator;
use tracing::instrument;

/// The eight winning triples: rows, columns, diagonals.
pub const WIN_LINES: [[usize; 3]; 8] = [
    // Rows
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    // Columns
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    // Diagonals
    [0, 4, 8],
    [2, 4, 6],
];

/// Checks whether `seat` holds all three cells of any winning line.
#[instrument(level = "trace")]
pub fn check_win(board: &Board, seat: Seat) -> bool {
    let mark = Some(Cell::Marked(seat));
    WIN_LINES
        .iter()
        .any(|line| line.iter().all(|&index| board.get(index) == mark))
}

/// Returns the seat holding a winning line, if any.
///
/// On a board reachable through alternating play at most one seat can win;
/// for arbitrary boards the first seat is reported first.
#[instrument(level = "trace")]
pub fn winner(board: &Board) -> Option<Seat> {
    Seat::iter().find(|&seat| check_win(board, seat))
}

#[cfg(test)]
mod tests {
    use super::super::apply_mark;
    use super::*;

    fn board_with(marks: &[(usize, Seat)]) -> Board {
        marks.iter().fold(Board::new(), |board, &(index, seat)| {
            apply_mark(&board, index, seat).unwrap()
        })
    }

    #[test]
    fn test_no_winner_empty_board() {
        let board = Board::new();
        assert!(!check_win(&board, Seat::First));
        assert!(!check_win(&board, Seat::Second));
        assert_eq!(winner(&board), None);
    }

    #[test]
    fn test_winner_top_row() {
        let board = board_with(&[(0, Seat::First), (1, Seat::First), (2, Seat::First)]);
        assert!(check_win(&board, Seat::First));
        assert!(!check_win(&board, Seat::Second));
        assert_eq!(winner(&board), Some(Seat::First));
    }

    #[test]
    fn test_winner_anti_diagonal() {
        let board = board_with(&[(2, Seat::Second), (4, Seat::Second), (6, Seat::Second)]);
        assert_eq!(winner(&board), Some(Seat::Second));
    }

    #[test]
    fn test_mixed_line_is_not_a_win() {
        let board = board_with(&[(0, Seat::First), (1, Seat::Second), (2, Seat::First)]);
        assert_eq!(winner(&board), None);
    }
}
