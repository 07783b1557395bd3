//! Combat - the round loop between the player and a single opponent

mod resolution;
mod result;

pub use resolution::run_combat_round;
pub use result::{CombatOutcome, RoundOutcome, RoundReport};

use crate::dice::Dice;
use crate::stat_block::{Opponent, StatBlock};
use crate::types::PlayerAction;
use serde::{Deserialize, Serialize};

/// One fight in progress. Owns the opponent until the fight is over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatState {
    opponent: Opponent,
    rounds: u32,
    outcome: Option<CombatOutcome>,
}

impl CombatState {
    pub fn new(opponent: Opponent) -> Self {
        CombatState {
            opponent,
            rounds: 0,
            outcome: None,
        }
    }

    pub fn opponent(&self) -> &Opponent {
        &self.opponent
    }

    /// Rounds resolved so far
    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    pub fn outcome(&self) -> Option<CombatOutcome> {
        self.outcome
    }

    pub fn is_resolved(&self) -> bool {
        self.outcome.is_some()
    }
}

/// Run rounds until the fight resolves, asking `choose` for every action
pub fn fight_to_end<F>(
    state: &mut CombatState,
    player: &mut StatBlock,
    dice: &mut impl Dice,
    mut choose: F,
) -> (CombatOutcome, Vec<RoundReport>)
where
    F: FnMut(&CombatState, &StatBlock) -> PlayerAction,
{
    let mut reports = Vec::new();
    loop {
        if let Some(outcome) = state.outcome {
            return (outcome, reports);
        }
        let action = choose(state, player);
        reports.push(resolution::resolve_round(state, player, action, dice));
    }
}
