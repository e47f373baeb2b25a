//! Session registry: admission control and the single lock over game state.
//!
//! All shared mutable state of the game (board, player table, turn ledger and
//! result) lives in one [`SessionState`] behind one mutex. Every operation
//! that changes the game, and the broadcast that reports the change, runs
//! while that lock is held. Updates are queued on each player's unbounded
//! channel, so holding the lock never waits on a socket, and each player sees
//! updates in the order the mutations happened.

use super::client::{normalize_nickname, Player, UpdateSink};
use super::Identity;
use crate::error::GameError;
use crate::game::{Board, Symbol, TurnLedger};
use crate::messaging::{text, Update};
use tokio::sync::{Mutex, MutexGuard};
use tracing::info;

/// Maximum number of registered players.
pub const MAX_PLAYERS: usize = 2;

/// Lifecycle of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Zero or one player registered; moves are refused.
    AwaitingPlayers,
    /// Two players registered and no result yet.
    Active,
    /// A win or a tie was declared, or a player left mid-game.
    Terminal,
}

/// How a finished session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    Win(Symbol),
    Tie,
    /// A player disconnected while the game was active.
    Abandoned,
}

/// The game state guarded by the registry lock.
#[derive(Debug)]
pub struct SessionState {
    board: Board,
    players: Vec<Player>,
    turn: TurnLedger,
    result: Option<GameResult>,
}

impl SessionState {
    fn new() -> Self {
        Self {
            board: Board::new(),
            players: Vec::with_capacity(MAX_PLAYERS),
            turn: TurnLedger::new(),
            result: None,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        if self.result.is_some() {
            SessionPhase::Terminal
        } else if self.players.len() == MAX_PLAYERS {
            SessionPhase::Active
        } else {
            SessionPhase::AwaitingPlayers
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn turn(&self) -> &TurnLedger {
        &self.turn
    }

    pub fn result(&self) -> Option<GameResult> {
        self.result
    }

    /// Registered players in join order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, identity: Identity) -> Option<&Player> {
        self.players.iter().find(|p| p.identity == identity)
    }

    /// Admits `identity` into the session.
    ///
    /// A known identity gets its existing player back. Otherwise the next
    /// symbol is assigned: `PlayerA` to the first player, `PlayerB` to the
    /// second.
    ///
    /// # Returns
    ///
    /// The player and whether it was newly created.
    ///
    /// # Errors
    ///
    /// * [`GameError::GameOver`] - the session already finished
    /// * [`GameError::CapacityExceeded`] - two other players are registered
    pub fn register(
        &mut self,
        identity: Identity,
        sink: UpdateSink,
    ) -> Result<(Player, bool), GameError> {
        if let Some(existing) = self.player(identity) {
            return Ok((existing.clone(), false));
        }
        if self.result.is_some() {
            return Err(GameError::GameOver);
        }
        if self.players.len() >= MAX_PLAYERS {
            return Err(GameError::CapacityExceeded);
        }

        let symbol = self
            .players
            .first()
            .map_or(Symbol::PlayerA, |first| first.symbol.opponent());
        let player = Player::new(identity, symbol, sink);
        self.players.push(player.clone());

        info!("Player {} registered as {}", identity, symbol);
        Ok((player, true))
    }

    /// Records the display name of a registered player.
    ///
    /// The nickname can only be set once; later calls are ignored. An empty
    /// name falls back to "Player 1"/"Player 2". When this completes the
    /// pair, the first player is told who joined and both players receive the
    /// opening turn broadcast.
    pub fn set_nickname(&mut self, identity: Identity, nickname: &str) -> Result<(), GameError> {
        let player = self
            .players
            .iter_mut()
            .find(|p| p.identity == identity)
            .ok_or(GameError::NotRegistered)?;

        if player.nickname.is_some() {
            return Ok(());
        }

        let joined = normalize_nickname(nickname, player.symbol);
        player.nickname = Some(joined.clone());

        let pair_complete = self.players.len() == MAX_PLAYERS
            && self.players.iter().all(|p| p.nickname.is_some())
            && self.result.is_none();
        if pair_complete {
            for other in self.players.iter().filter(|p| p.identity != identity) {
                other.send(Update::text(text::opponent_joined(&joined)));
            }
            info!("Both players connected, game ready");
            self.broadcast(
                text::YOUR_TURN,
                text::OPPONENT_TURN,
                Some(self.board.render()),
                None,
            );
        }

        Ok(())
    }

    /// Removes `identity` from the session.
    ///
    /// Leaving an active game abandons it and notifies the remaining player.
    /// Once nobody is left the session resets, ready for a new pair.
    pub fn unregister(&mut self, identity: Identity) -> Option<Player> {
        let index = self.players.iter().position(|p| p.identity == identity)?;
        let was_active = self.phase() == SessionPhase::Active;
        let player = self.players.remove(index);

        if self.players.is_empty() {
            info!("Last player left, resetting session");
            *self = SessionState::new();
        } else if was_active {
            self.result = Some(GameResult::Abandoned);
            for remaining in &self.players {
                remaining.send(Update::text(text::OPPONENT_LEFT));
            }
            info!("Player {} left an active game, game abandoned", identity);
        }

        Some(player)
    }

    /// Drops `symbol` into `column`. See [`Board::apply_move`].
    pub fn apply_move(&mut self, column: usize, symbol: Symbol) -> Option<usize> {
        self.board.apply_move(column, symbol)
    }

    pub fn switch_turn(&mut self) {
        self.turn.switch_turn();
    }

    /// Sends `active_text` to the turn owner and `other_text` to the other
    /// player, both with the same optional board snapshot.
    ///
    /// Passing `terminal` records the result and closes the session for
    /// further moves.
    pub fn broadcast(
        &mut self,
        active_text: &str,
        other_text: &str,
        board: Option<String>,
        terminal: Option<GameResult>,
    ) {
        let owner = self.turn.owner();
        for player in &self.players {
            let message = if player.symbol == owner {
                active_text
            } else {
                other_text
            };
            player.send(Update {
                message: message.to_string(),
                board: board.clone(),
            });
        }

        if let Some(result) = terminal {
            info!("Game finished: {:?}", result);
            self.result = Some(result);
        }
    }
}

/// The single point of mutual exclusion over the game.
///
/// Cheap to share behind an `Arc`; every connection worker holds one.
#[derive(Debug)]
pub struct SessionRegistry {
    state: Mutex<SessionState>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SessionState::new()),
        }
    }

    /// Acquires the session lock.
    ///
    /// Hold the guard for the whole validate, mutate and broadcast sequence
    /// of an operation.
    pub async fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().await
    }

    pub async fn register(
        &self,
        identity: Identity,
        sink: UpdateSink,
    ) -> Result<(Player, bool), GameError> {
        self.lock().await.register(identity, sink)
    }

    pub async fn set_nickname(&self, identity: Identity, nickname: &str) -> Result<(), GameError> {
        self.lock().await.set_nickname(identity, nickname)
    }

    pub async fn unregister(&self, identity: Identity) -> Option<Player> {
        self.lock().await.unregister(identity)
    }

    pub async fn phase(&self) -> SessionPhase {
        self.lock().await.phase()
    }

    pub async fn player_count(&self) -> usize {
        self.lock().await.players().len()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn addr(port: u16) -> Identity {
        Identity::from(([127, 0, 0, 1], port))
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<Update>) -> Vec<Update> {
        let mut updates = Vec::new();
        while let Ok(update) = rx.try_recv() {
            updates.push(update);
        }
        updates
    }

    #[tokio::test]
    async fn test_register_assigns_symbols_in_join_order() {
        let registry = SessionRegistry::new();
        let (tx_a, _rx_a) = mpsc::unbounded_channel();
        let (tx_b, _rx_b) = mpsc::unbounded_channel();

        let (first, is_new) = registry.register(addr(1), tx_a).await.unwrap();
        assert!(is_new);
        assert_eq!(first.symbol, Symbol::PlayerA);
        assert_eq!(registry.phase().await, SessionPhase::AwaitingPlayers);

        let (second, is_new) = registry.register(addr(2), tx_b).await.unwrap();
        assert!(is_new);
        assert_eq!(second.symbol, Symbol::PlayerB);
        assert_eq!(registry.phase().await, SessionPhase::Active);
    }

    #[tokio::test]
    async fn test_register_same_identity_is_idempotent() {
        let registry = SessionRegistry::new();
        let (tx, _rx) = mpsc::unbounded_channel();

        registry.register(addr(1), tx.clone()).await.unwrap();
        let (again, is_new) = registry.register(addr(1), tx).await.unwrap();

        assert!(!is_new);
        assert_eq!(again.symbol, Symbol::PlayerA);
        assert_eq!(registry.player_count().await, 1);
    }

    #[tokio::test]
    async fn test_third_identity_is_rejected() {
        let registry = SessionRegistry::new();
        let (tx, _rx) = mpsc::unbounded_channel();

        registry.register(addr(1), tx.clone()).await.unwrap();
        registry.register(addr(2), tx.clone()).await.unwrap();
        let err = registry.register(addr(3), tx).await.unwrap_err();

        assert_eq!(err, GameError::CapacityExceeded);
        assert_eq!(registry.player_count().await, 2);
    }

    #[tokio::test]
    async fn test_second_nickname_announces_game() {
        let registry = SessionRegistry::new();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();

        registry.register(addr(1), tx_a).await.unwrap();
        registry.set_nickname(addr(1), "alice").await.unwrap();
        assert!(drain(&mut rx_a).is_empty());

        registry.register(addr(2), tx_b).await.unwrap();
        registry.set_nickname(addr(2), "bob").await.unwrap();

        let empty = Board::new().render();
        assert_eq!(
            drain(&mut rx_a),
            vec![
                Update::text("bob joined the game."),
                Update::with_board(text::YOUR_TURN, empty.clone()),
            ]
        );
        assert_eq!(
            drain(&mut rx_b),
            vec![Update::with_board(text::OPPONENT_TURN, empty)]
        );
    }

    #[tokio::test]
    async fn test_nickname_is_set_once() {
        let registry = SessionRegistry::new();
        let (tx, _rx) = mpsc::unbounded_channel();

        registry.register(addr(1), tx).await.unwrap();
        registry.set_nickname(addr(1), "  alice ").await.unwrap();
        registry.set_nickname(addr(1), "mallory").await.unwrap();

        let state = registry.lock().await;
        assert_eq!(state.player(addr(1)).unwrap().nickname.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn test_empty_nickname_falls_back() {
        let registry = SessionRegistry::new();
        let (tx, _rx) = mpsc::unbounded_channel();

        registry.register(addr(1), tx).await.unwrap();
        registry.set_nickname(addr(1), "   ").await.unwrap();

        let state = registry.lock().await;
        assert_eq!(state.player(addr(1)).unwrap().display_name(), "Player 1");
    }

    #[tokio::test]
    async fn test_set_nickname_requires_registration() {
        let registry = SessionRegistry::new();
        let err = registry.set_nickname(addr(9), "ghost").await.unwrap_err();
        assert_eq!(err, GameError::NotRegistered);
    }

    #[tokio::test]
    async fn test_broadcast_routes_by_turn_owner() {
        let registry = SessionRegistry::new();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        registry.register(addr(1), tx_a).await.unwrap();
        registry.register(addr(2), tx_b).await.unwrap();

        let mut state = registry.lock().await;
        state.switch_turn();
        state.broadcast("active", "other", Some("snapshot".to_string()), None);
        assert_eq!(state.phase(), SessionPhase::Active);

        state.broadcast("end", "end", None, Some(GameResult::Tie));
        assert_eq!(state.phase(), SessionPhase::Terminal);
        assert_eq!(state.result(), Some(GameResult::Tie));
        drop(state);

        assert_eq!(
            drain(&mut rx_a),
            vec![Update::with_board("other", "snapshot"), Update::text("end")]
        );
        assert_eq!(
            drain(&mut rx_b),
            vec![Update::with_board("active", "snapshot"), Update::text("end")]
        );
    }

    #[tokio::test]
    async fn test_unregister_mid_game_notifies_and_abandons() {
        let registry = SessionRegistry::new();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, _rx_b) = mpsc::unbounded_channel();
        registry.register(addr(1), tx_a).await.unwrap();
        registry.register(addr(2), tx_b).await.unwrap();

        let removed = registry.unregister(addr(2)).await.unwrap();
        assert_eq!(removed.symbol, Symbol::PlayerB);
        assert_eq!(registry.phase().await, SessionPhase::Terminal);
        assert_eq!(drain(&mut rx_a), vec![Update::text(text::OPPONENT_LEFT)]);

        let (tx_c, _rx_c) = mpsc::unbounded_channel();
        let err = registry.register(addr(3), tx_c).await.unwrap_err();
        assert_eq!(err, GameError::GameOver);
    }

    #[tokio::test]
    async fn test_last_player_leaving_resets_session() {
        let registry = SessionRegistry::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        registry.register(addr(1), tx.clone()).await.unwrap();
        registry.register(addr(2), tx.clone()).await.unwrap();
        registry.lock().await.apply_move(3, Symbol::PlayerA);

        registry.unregister(addr(1)).await;
        registry.unregister(addr(2)).await;
        drain(&mut rx);

        let state = registry.lock().await;
        assert_eq!(state.phase(), SessionPhase::AwaitingPlayers);
        assert_eq!(state.board(), &Board::new());
        assert_eq!(state.turn().current_index(), 0);
        assert!(state.result().is_none());
    }

    #[tokio::test]
    async fn test_unregister_while_waiting_is_silent() {
        let registry = SessionRegistry::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        registry.register(addr(1), tx).await.unwrap();

        assert!(registry.unregister(addr(1)).await.is_some());
        assert!(registry.unregister(addr(1)).await.is_none());
        assert!(drain(&mut rx).is_empty());
        assert_eq!(registry.player_count().await, 0);
    }
}
