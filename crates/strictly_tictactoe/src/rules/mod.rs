//! Game rules for tic-tac-toe.
//!
//! Pure functions over a [`Board`](super::Board). Nothing here holds state;
//! sessions decide when to call them.

pub mod draw;
pub mod mark;
pub mod win;

pub use draw::{is_draw, is_full};
pub use mark::{InvalidMove, apply_mark};
pub use win::{WIN_LINES, check_win, winner};
