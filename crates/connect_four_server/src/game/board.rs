//! The 6 x 7 Connect Four grid.
//!
//! Row 0 is the top of the board and row `ROWS - 1` the bottom, which keeps
//! [`Board::render`] a straight row-major walk. Pieces only ever enter the board
//! through [`Board::apply_move`], so every column stays contiguous from the
//! bottom row upward.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of rows on the board.
pub const ROWS: usize = 6;

/// Number of columns on the board.
pub const COLS: usize = 7;

/// The piece owned by one of the two players.
///
/// `PlayerA` belongs to the first player to connect and moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    PlayerA,
    PlayerB,
}

impl Symbol {
    /// Character used for this symbol in board snapshots.
    pub fn glyph(self) -> char {
        match self {
            Symbol::PlayerA => 'o',
            Symbol::PlayerB => 'x',
        }
    }

    /// The opposing symbol.
    pub fn opponent(self) -> Symbol {
        match self {
            Symbol::PlayerA => Symbol::PlayerB,
            Symbol::PlayerB => Symbol::PlayerA,
        }
    }

    /// Position of this symbol in join order.
    pub fn join_index(self) -> usize {
        match self {
            Symbol::PlayerA => 0,
            Symbol::PlayerB => 1,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.glyph())
    }
}

/// Fixed-size grid of cells; `None` marks an empty cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Board {
    cells: [[Option<Symbol>; COLS]; ROWS],
}

impl Board {
    /// Creates an empty board.
    pub fn new() -> Self {
        Self {
            cells: [[None; COLS]; ROWS],
        }
    }

    /// Returns the content of the cell at `(row, col)`, row 0 being the top.
    pub fn cell(&self, row: usize, col: usize) -> Option<Symbol> {
        self.cells[row][col]
    }

    /// True iff the topmost cell of `col` is occupied.
    ///
    /// `col` must be in `0..COLS`; range checks belong to the caller (see
    /// [`Board::is_valid_move`]).
    pub fn is_column_full(&self, col: usize) -> bool {
        debug_assert!(col < COLS, "column {col} out of range");
        self.cells[0][col].is_some()
    }

    /// True iff `col` is on the board and still has room for a piece.
    pub fn is_valid_move(&self, col: usize) -> bool {
        col < COLS && !self.is_column_full(col)
    }

    /// Drops `symbol` into `col`, landing on the lowest empty row.
    ///
    /// # Returns
    ///
    /// The row the piece landed on, or `None` (with the board untouched) when
    /// the move is not valid.
    pub fn apply_move(&mut self, col: usize, symbol: Symbol) -> Option<usize> {
        if !self.is_valid_move(col) {
            return None;
        }

        let row = (0..ROWS).rev().find(|&row| self.cells[row][col].is_none())?;
        self.cells[row][col] = Some(symbol);
        Some(row)
    }

    /// Number of pieces currently in `col`.
    pub fn column_height(&self, col: usize) -> usize {
        (0..ROWS).filter(|&row| self.cells[row][col].is_some()).count()
    }

    /// True when every cell is occupied.
    pub fn is_full(&self) -> bool {
        (0..COLS).all(|col| self.is_column_full(col))
    }

    /// Renders the board as six newline-terminated lines of seven bracketed
    /// cells, top row first: `[o]`, `[x]` or `[ ]`.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(ROWS * (COLS * 3 + 1));
        for row in &self.cells {
            for cell in row {
                out.push('[');
                out.push(cell.map_or(' ', Symbol::glyph));
                out.push(']');
            }
            out.push('\n');
        }
        out
    }

    /// Builds a board from seven-character rows, top row first, using `o`,
    /// `x` and `.` for empty. Gravity is not enforced.
    #[cfg(test)]
    pub(crate) fn from_rows(rows: [&str; ROWS]) -> Self {
        let mut board = Self::new();
        for (row, line) in rows.iter().enumerate() {
            for (col, ch) in line.chars().enumerate() {
                board.cells[row][col] = match ch {
                    'o' => Some(Symbol::PlayerA),
                    'x' => Some(Symbol::PlayerB),
                    _ => None,
                };
            }
        }
        board
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new();
        for row in 0..ROWS {
            for col in 0..COLS {
                assert_eq!(board.cell(row, col), None);
            }
        }
        assert!(!board.is_full());
    }

    #[test]
    fn test_apply_move_respects_gravity() {
        let mut board = Board::new();

        assert_eq!(board.apply_move(3, Symbol::PlayerA), Some(ROWS - 1));
        assert_eq!(board.apply_move(3, Symbol::PlayerB), Some(ROWS - 2));
        assert_eq!(board.cell(ROWS - 1, 3), Some(Symbol::PlayerA));
        assert_eq!(board.cell(ROWS - 2, 3), Some(Symbol::PlayerB));
        assert_eq!(board.column_height(3), 2);
    }

    #[test]
    fn test_column_full_after_six_moves() {
        let mut board = Board::new();
        let mut symbol = Symbol::PlayerA;
        for n in 0..ROWS {
            assert!(!board.is_column_full(0), "full after only {n} moves");
            assert_eq!(board.apply_move(0, symbol), Some(ROWS - 1 - n));
            symbol = symbol.opponent();
        }

        assert!(board.is_column_full(0));
        assert!(!board.is_valid_move(0));
        assert_eq!(board.apply_move(0, Symbol::PlayerA), None);
        assert_eq!(board.column_height(0), ROWS);
    }

    #[test]
    fn test_columns_stay_contiguous() {
        let mut board = Board::new();
        let moves = [2, 2, 5, 0, 2, 6, 5, 1, 1, 2, 6, 6, 3];
        let mut symbol = Symbol::PlayerA;
        for col in moves {
            board.apply_move(col, symbol);
            symbol = symbol.opponent();
        }

        for col in 0..COLS {
            let height = board.column_height(col);
            for row in 0..ROWS {
                let expected_filled = row >= ROWS - height;
                assert_eq!(board.cell(row, col).is_some(), expected_filled);
            }
        }
    }

    #[test]
    fn test_out_of_range_column_is_invalid() {
        let mut board = Board::new();
        assert!(!board.is_valid_move(COLS));
        assert_eq!(board.apply_move(COLS, Symbol::PlayerA), None);
        assert_eq!(board, Board::new());
    }

    #[test]
    fn test_render_format() {
        let mut board = Board::new();
        board.apply_move(0, Symbol::PlayerA);
        board.apply_move(6, Symbol::PlayerB);

        let rendered = board.render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), ROWS);
        assert!(rendered.ends_with('\n'));
        for line in &lines[..ROWS - 1] {
            assert_eq!(*line, "[ ][ ][ ][ ][ ][ ][ ]");
        }
        assert_eq!(lines[ROWS - 1], "[o][ ][ ][ ][ ][ ][x]");
        assert_eq!(board.to_string(), rendered);
    }

    #[test]
    fn test_symbol_helpers() {
        assert_eq!(Symbol::PlayerA.opponent(), Symbol::PlayerB);
        assert_eq!(Symbol::PlayerB.opponent(), Symbol::PlayerA);
        assert_eq!(Symbol::PlayerA.join_index(), 0);
        assert_eq!(Symbol::PlayerB.join_index(), 1);
        assert_eq!(Symbol::PlayerA.to_string(), "o");
    }
}
