//! Combat result types

use crate::error::EncounterError;
use crate::status::PoisonTick;
use crate::types::{PlayerAction, TerminalState};
use serde::{Deserialize, Serialize};

/// How a fight against one opponent ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatOutcome {
    Victory,
    Defeat,
    /// Round cap reached with both sides standing
    Stalemate,
}

impl CombatOutcome {
    pub fn terminal_state(&self) -> TerminalState {
        match self {
            CombatOutcome::Victory => TerminalState::Victory,
            CombatOutcome::Defeat => TerminalState::Defeat,
            CombatOutcome::Stalemate => TerminalState::Stalemate,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundOutcome {
    Continue,
    Resolved(CombatOutcome),
}

impl RoundOutcome {
    pub fn is_resolved(&self) -> bool {
        matches!(self, RoundOutcome::Resolved(_))
    }
}

/// Everything that happened in one combat round
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundReport {
    /// 1-based round number
    pub round: u32,
    pub action: PlayerAction,
    /// Damage the player dealt to the opponent
    pub damage_dealt: u32,
    /// Opponent's strike during an attack exchange, after armor
    pub exchange_damage: u32,
    /// Opponent's counter-attack after a non-block round
    pub counter_damage: u32,
    /// Damage that got through a block
    pub block_damage: u32,
    pub healed: u32,
    /// Set when the chosen action could not be carried out; the round is still spent
    pub rejected: Option<EncounterError>,
    pub poison: PoisonTick,
    pub player_health: u32,
    pub opponent_health: u32,
    pub outcome: RoundOutcome,
}

impl RoundReport {
    pub(crate) fn new(round: u32, action: PlayerAction) -> Self {
        RoundReport {
            round,
            action,
            damage_dealt: 0,
            exchange_damage: 0,
            counter_damage: 0,
            block_damage: 0,
            healed: 0,
            rejected: None,
            poison: PoisonTick::NotPoisoned,
            player_health: 0,
            opponent_health: 0,
            outcome: RoundOutcome::Continue,
        }
    }

    /// Total damage the player took from the opponent this round (poison excluded)
    pub fn damage_taken(&self) -> u32 {
        self.exchange_damage + self.counter_damage + self.block_damage
    }
}
