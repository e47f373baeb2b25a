//! Text of the updates sent to players.
//!
//! Rejection wording lives on [`GameError`](crate::error::GameError) instead.

pub const YOUR_TURN: &str = "It's your turn!";
pub const OPPONENT_TURN: &str = "Waiting for your opponent's move...";
pub const YOU_WON: &str = "You won!";
pub const YOU_LOST: &str = "You lost!";
pub const TIE: &str = "It's a tie!";
pub const CURRENT_BOARD: &str = "Current board:";
pub const OPPONENT_LEFT: &str = "Your opponent has disconnected. The game is over.";
pub const UNRECOGNIZED_COMMAND: &str = "Unrecognized command.";

pub fn welcome(nickname: &str, glyph: char) -> String {
    format!("Welcome, {nickname}! You are playing as {glyph}.")
}

pub fn opponent_joined(nickname: &str) -> String {
    format!("{nickname} joined the game.")
}
