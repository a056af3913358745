//! Pure tic-tac-toe board logic.
//!
//! A [`Board`] is nine [`Cell`]s in row-major order. Marks belong to a
//! [`Seat`], the turn parity of the player who placed them. The [`rules`]
//! module answers the only questions a coordinator needs: may this mark be
//! placed, has this seat won, is the board exhausted.
//!
//! ```
//! use strictly_tictactoe::{Board, Seat, apply_mark, check_win};
//!
//! let board = apply_mark(&Board::new(), 4, Seat::First).unwrap();
//! assert!(!check_win(&board, Seat::First));
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod rules;
mod types;

pub use rules::{InvalidMove, WIN_LINES, apply_mark, check_win, is_draw, is_full, winner};
pub use types::{Board, CELL_COUNT, Cell, Seat, UnknownSeat};
