//! Message type definitions for client-server communication.

use serde::{Deserialize, Serialize};
use serde_json::Number;

/// A command sent by a player.
///
/// Commands are internally tagged by `command`:
///
/// ```json
/// { "command": "connect", "nickname": "alice" }
/// { "command": "move", "column": 3 }
/// { "command": "show_board" }
/// { "command": "check_turn" }
/// ```
///
/// Columns are 0-based. Any JSON number decodes (negative, fractional or
/// beyond 64 bits included); range checks happen during move validation so
/// that such a column is reported as an invalid move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    Connect { nickname: String },
    Move { column: Number },
    ShowBoard,
    CheckTurn,
}

/// An update pushed to a player: a text message plus an optional board snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Update {
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub board: Option<String>,
}

impl Update {
    /// A message without a board snapshot.
    pub fn text(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            board: None,
        }
    }

    /// A message carrying a rendered board.
    pub fn with_board(message: impl Into<String>, board: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            board: Some(board.into()),
        }
    }
}
