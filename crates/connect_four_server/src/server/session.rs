//! Per-connection protocol handler.
//!
//! A [`GameSession`] turns the commands of one connection into transitions of
//! the shared session:
//!
//! * `connect` registers the sender and, when it completes the pair, starts
//!   the game (`AwaitingPlayers -> Active`)
//! * `move` is validated against the phase, the turn owner and the board, then
//!   applied and evaluated; a win or tie moves the session to `Terminal`
//! * `show_board` and `check_turn` only read state
//!
//! Rejections go to the sender alone. Every mutating path holds the registry
//! lock from validation through broadcast.

use crate::connection::client::normalize_nickname;
use crate::connection::{GameResult, Identity, SessionPhase, SessionRegistry, UpdateSink};
use crate::error::GameError;
use crate::game::{Outcome, WinDetector};
use crate::messaging::{text, Command, Update};
use serde_json::Number;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What the connection worker should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionFlow {
    Continue,
    /// Stop reading; queued updates are still delivered.
    Close,
}

/// Protocol handler for one connection.
pub struct GameSession {
    identity: Identity,
    registry: Arc<SessionRegistry>,
    outbound: UpdateSink,
}

impl GameSession {
    /// Creates the handler for the connection from `identity`.
    ///
    /// # Arguments
    ///
    /// * `identity` - Remote address of the connection
    /// * `registry` - The shared session registry
    /// * `outbound` - Queue drained into this connection's WebSocket
    pub fn new(identity: Identity, registry: Arc<SessionRegistry>, outbound: UpdateSink) -> Self {
        Self {
            identity,
            registry,
            outbound,
        }
    }

    /// Processes one command.
    pub async fn handle(&self, command: Command) -> SessionFlow {
        debug!("Command from {}: {:?}", self.identity, command);

        let result = match command {
            Command::Connect { nickname } => return self.connect(&nickname).await,
            Command::Move { column } => self.play(column).await,
            Command::ShowBoard => self.show_board().await,
            Command::CheckTurn => self.check_turn().await,
        };

        if let Err(err) = result {
            self.reject(err);
        }
        SessionFlow::Continue
    }

    /// Sends an update to this connection only.
    pub fn reply(&self, update: Update) {
        if self.outbound.send(update).is_err() {
            debug!("Reply to {} dropped: connection closed", self.identity);
        }
    }

    /// Leaves the session after the connection's stream ended.
    pub async fn disconnect(&self) {
        if let Some(player) = self.registry.unregister(self.identity).await {
            info!(
                "Player {} ({}) left the session",
                player.display_name(),
                self.identity
            );
        }
    }

    fn reject(&self, err: GameError) {
        warn!("Rejected command from {}: {:?}", self.identity, err);
        self.reply(Update::text(err.to_string()));
    }

    async fn connect(&self, nickname: &str) -> SessionFlow {
        let mut state = self.registry.lock().await;

        let player = match state.register(self.identity, self.outbound.clone()) {
            Ok((player, _)) => player,
            Err(err) => {
                drop(state);
                self.reject(err);
                return SessionFlow::Close;
            }
        };

        let shown = player
            .nickname
            .clone()
            .unwrap_or_else(|| normalize_nickname(nickname, player.symbol));
        self.reply(Update::text(text::welcome(&shown, player.symbol.glyph())));

        if let Err(err) = state.set_nickname(self.identity, nickname) {
            drop(state);
            self.reject(err);
        }
        SessionFlow::Continue
    }

    async fn play(&self, column: Number) -> Result<(), GameError> {
        let mut state = self.registry.lock().await;

        let symbol = state
            .player(self.identity)
            .ok_or(GameError::NotRegistered)?
            .symbol;

        match state.phase() {
            SessionPhase::Terminal => return Err(GameError::GameOver),
            SessionPhase::AwaitingPlayers => return Err(GameError::AwaitingOpponent),
            SessionPhase::Active => {}
        }

        if !state.turn().is_turn_of(symbol) {
            return Err(GameError::NotYourTurn);
        }

        let invalid = || GameError::InvalidMove {
            column: column.to_string(),
        };
        let col = column
            .as_u64()
            .and_then(|col| usize::try_from(col).ok())
            .filter(|&col| state.board().is_valid_move(col))
            .ok_or_else(invalid)?;

        let row = state.apply_move(col, symbol).ok_or_else(invalid)?;
        debug!("{} played column {} (row {})", symbol, col, row);

        let snapshot = state.board().render();
        match WinDetector::evaluate(state.board()) {
            Outcome::InProgress => {
                state.switch_turn();
                state.broadcast(text::YOUR_TURN, text::OPPONENT_TURN, Some(snapshot), None);
            }
            Outcome::Tie => {
                state.broadcast(text::TIE, text::TIE, Some(snapshot), Some(GameResult::Tie));
            }
            Outcome::Win(winner) => {
                // The mover still owns the turn, so the winner gets the "active" text.
                state.broadcast(
                    text::YOU_WON,
                    text::YOU_LOST,
                    Some(snapshot),
                    Some(GameResult::Win(winner)),
                );
            }
        }
        Ok(())
    }

    async fn show_board(&self) -> Result<(), GameError> {
        let state = self.registry.lock().await;
        state.player(self.identity).ok_or(GameError::NotRegistered)?;

        self.reply(Update::with_board(text::CURRENT_BOARD, state.board().render()));
        Ok(())
    }

    async fn check_turn(&self) -> Result<(), GameError> {
        let state = self.registry.lock().await;
        let symbol = state
            .player(self.identity)
            .ok_or(GameError::NotRegistered)?
            .symbol;

        match state.phase() {
            SessionPhase::Terminal => Err(GameError::GameOver),
            SessionPhase::AwaitingPlayers => Err(GameError::AwaitingOpponent),
            SessionPhase::Active => {
                let message = if state.turn().is_turn_of(symbol) {
                    text::YOUR_TURN
                } else {
                    text::OPPONENT_TURN
                };
                self.reply(Update::text(message));
                Ok(())
            }
        }
    }
}
