//! Error types for the Connect Four server.
//!
//! Two families of errors exist. [`GameError`] covers gameplay rejections: they
//! are reported to the offending player only and never end a connection on
//! their own. [`ServerError`] covers infrastructure failures such as binding the
//! listener or a broken WebSocket stream.

use thiserror::Error;

/// A rejected gameplay action.
///
/// The `Display` text of each variant is exactly the message delivered to the
/// client, so callers can forward `err.to_string()` without re-wording it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// Two distinct players are already registered.
    #[error("The game is full.")]
    CapacityExceeded,

    /// The sender does not own the current turn.
    #[error("It's not your turn.")]
    NotYourTurn,

    /// The column is out of range or already full.
    #[error("Invalid move. Try again.")]
    InvalidMove { column: String },

    /// A gameplay action arrived before the second player joined.
    #[error("Waiting for another player to join.")]
    AwaitingOpponent,

    /// The session already reached a win, a tie or was abandoned.
    #[error("The game is over.")]
    GameOver,

    /// The sender never issued a `connect` command.
    #[error("You must connect first.")]
    NotRegistered,
}

/// Infrastructure errors raised by the server and its connection workers.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Binding, listening or accepting failed.
    #[error("Network error: {0}")]
    Network(String),

    /// A WebSocket read or write failed; the affected worker exits.
    #[error("Stream failure: {0}")]
    Stream(String),

    /// A frame could not be decoded into a command, or an update could not be encoded.
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
