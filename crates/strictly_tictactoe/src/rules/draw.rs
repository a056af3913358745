//! Draw detection logic for tic-tac-toe.

use super::super::Board;
use tracing::instrument;

/// Checks if the board is full (no open cell left).
#[instrument(level = "trace")]
pub fn is_full(board: &Board) -> bool {
    board.open_cells().next().is_none()
}

/// Checks for a draw: no empty cell remains.
///
/// Callers test for a win first. A winning move that also fills the board
/// counts as a win, not a draw.
#[instrument(level = "trace")]
pub fn is_draw(board: &Board) -> bool {
    is_full(board)
}

#[cfg(test)]
mod tests {
    use super::super::super::Seat;
    use super::super::{apply_mark, winner};
    use super::*;

    fn fill(seats: [Seat; 9]) -> Board {
        seats
            .iter()
            .enumerate()
            .fold(Board::new(), |board, (index, &seat)| {
                apply_mark(&board, index, seat).unwrap()
            })
    }

    #[test]
    fn test_empty_board_not_full() {
        assert!(!is_full(&Board::new()));
        assert!(!is_draw(&Board::new()));
    }

    #[test]
    fn test_partial_board_not_full() {
        let board = apply_mark(&Board::new(), 4, Seat::First).unwrap();
        assert!(!is_full(&board));
    }

    #[test]
    fn test_draw_detection() {
        use Seat::{First as X, Second as O};
        // X O X / O X O / O X O
        let board = fill([X, O, X, O, X, O, O, X, O]);
        assert!(is_draw(&board));
        assert_eq!(winner(&board), None);
    }

    #[test]
    fn test_full_board_with_winner() {
        use Seat::{First as X, Second as O};
        // X X X / O O X / O X O
        let board = fill([X, X, X, O, O, X, O, X, O]);
        assert!(is_full(&board));
        assert_eq!(winner(&board), Some(X));
    }
}
