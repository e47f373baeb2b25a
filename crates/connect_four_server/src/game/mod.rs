//! Pure game rules: the board, win detection and turn ownership.
//!
//! Nothing in this module knows about connections or locking; the session
//! registry owns one instance of each type and serializes access to them.

pub mod board;
pub mod outcome;
pub mod turn;

pub use board::{Board, Symbol, COLS, ROWS};
pub use outcome::{Outcome, WinDetector};
pub use turn::TurnLedger;
