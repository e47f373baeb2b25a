//! Registered player representation.
//!
//! This module defines what the registry knows about each of the (at most two)
//! players taking part in the session.

use super::Identity;
use crate::game::Symbol;
use crate::messaging::Update;
use tokio::sync::mpsc;
use tracing::debug;

/// Sending half of a connection's outbound queue.
///
/// Each connection worker drains the receiving half into its WebSocket, so
/// pushing an update never waits on the network.
pub type UpdateSink = mpsc::UnboundedSender<Update>;

/// A player admitted into the session.
///
/// # Fields
///
/// * `identity` - Remote address of the player's connection
/// * `nickname` - Display name, set once by the `connect` command
/// * `symbol` - Piece assigned in join order, permanent for the session
#[derive(Debug, Clone)]
pub struct Player {
    pub identity: Identity,
    pub nickname: Option<String>,
    pub symbol: Symbol,
    sink: UpdateSink,
}

impl Player {
    /// Creates a player without a nickname.
    ///
    /// # Arguments
    ///
    /// * `identity` - Remote address of the connection
    /// * `symbol` - Piece assigned to this player
    /// * `sink` - Outbound queue of the player's connection
    pub fn new(identity: Identity, symbol: Symbol, sink: UpdateSink) -> Self {
        Self {
            identity,
            nickname: None,
            symbol,
            sink,
        }
    }

    /// Display name, falling back to "Player 1"/"Player 2" before one is set.
    pub fn display_name(&self) -> String {
        match &self.nickname {
            Some(name) => name.clone(),
            None => default_nickname(self.symbol),
        }
    }

    /// Queues `update` for this player.
    ///
    /// Returns `false` when the connection is already gone; the worker that
    /// owns it handles the cleanup, so the failure is only logged.
    pub fn send(&self, update: Update) -> bool {
        match self.sink.send(update) {
            Ok(()) => true,
            Err(_) => {
                debug!("Dropping update for {}: connection closed", self.identity);
                false
            }
        }
    }
}

fn default_nickname(symbol: Symbol) -> String {
    format!("Player {}", symbol.join_index() + 1)
}

/// Trims a requested nickname; a blank request gets the default name for `symbol`.
pub fn normalize_nickname(requested: &str, symbol: Symbol) -> String {
    let trimmed = requested.trim();
    if trimmed.is_empty() {
        default_nickname(symbol)
    } else {
        trimmed.to_string()
    }
}
