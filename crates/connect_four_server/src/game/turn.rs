//! Turn ownership between the two registered players.

use super::board::Symbol;

/// Index (0 or 1, in join order) of the player who may move next.
///
/// Ownership is only read while validating a move; it flips once a move has
/// been accepted and did not end the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TurnLedger {
    index: usize,
}

impl TurnLedger {
    /// A ledger where the first player to connect owns the turn.
    pub fn new() -> Self {
        Self { index: 0 }
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    /// Symbol of the player owning the turn.
    pub fn owner(&self) -> Symbol {
        if self.index == 0 {
            Symbol::PlayerA
        } else {
            Symbol::PlayerB
        }
    }

    pub fn is_turn_of(&self, symbol: Symbol) -> bool {
        self.owner() == symbol
    }

    /// Hands the turn to the other player.
    pub fn switch_turn(&mut self) {
        self.index = 1 - self.index;
    }
}
