//! Four-in-a-row detection.
//!
//! The detector rescans the whole board on every call. With 42 cells and 69
//! candidate runs this is cheap, and it keeps the result independent of how
//! the board was reached.

use super::board::{Board, Symbol, COLS, ROWS};

/// Result of evaluating a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// No four-in-a-row and at least one empty cell.
    InProgress,
    /// `Symbol` owns a run of four.
    Win(Symbol),
    /// Every cell is occupied and nobody has four in a row.
    Tie,
}

const RUN: usize = 4;

/// Scans a board for a winner or a tie.
pub struct WinDetector;

impl WinDetector {
    /// Evaluates `board`.
    ///
    /// Runs are scanned in a fixed order: horizontal, vertical, rising
    /// diagonal (`/`), falling diagonal (`\`). The first complete run found is
    /// reported.
    pub fn evaluate(board: &Board) -> Outcome {
        if let Some(symbol) = Self::find_run(board) {
            return Outcome::Win(symbol);
        }

        if board.is_full() {
            Outcome::Tie
        } else {
            Outcome::InProgress
        }
    }

    fn find_run(board: &Board) -> Option<Symbol> {
        // Horizontal
        for row in 0..ROWS {
            for col in 0..=COLS - RUN {
                if let Some(symbol) = run_at(board, row, col, 0, 1) {
                    return Some(symbol);
                }
            }
        }

        // Vertical
        for row in 0..=ROWS - RUN {
            for col in 0..COLS {
                if let Some(symbol) = run_at(board, row, col, 1, 0) {
                    return Some(symbol);
                }
            }
        }

        // Rising diagonal, starting from its bottom-left cell
        for row in RUN - 1..ROWS {
            for col in 0..=COLS - RUN {
                if let Some(symbol) = run_at(board, row, col, -1, 1) {
                    return Some(symbol);
                }
            }
        }

        // Falling diagonal, starting from its top-left cell
        for row in 0..=ROWS - RUN {
            for col in 0..=COLS - RUN {
                if let Some(symbol) = run_at(board, row, col, 1, 1) {
                    return Some(symbol);
                }
            }
        }

        None
    }
}

/// Returns the owner of the four cells starting at `(row, col)` and stepping
/// by `(d_row, d_col)`, if they are all equal and non-empty. The caller keeps
/// the run on the board.
fn run_at(board: &Board, row: usize, col: usize, d_row: isize, d_col: isize) -> Option<Symbol> {
    let first = board.cell(row, col)?;
    (1..RUN as isize)
        .all(|step| {
            let r = (row as isize + d_row * step) as usize;
            let c = (col as isize + d_col * step) as usize;
            board.cell(r, c) == Some(first)
        })
        .then_some(first)
}
