//! Status effects - poison application and decay
//!
//! Poison is driven by player actions, not time: callers tick once per
//! completed action (a combat round, a move, an item use). Traps and combat
//! share these functions so both paths poison identically.

use crate::config::constants;
use crate::dice::Dice;
use crate::stat_block::StatBlock;
use serde::{Deserialize, Serialize};

/// Active poison. At most one per combatant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoisonStatus {
    turns_remaining: u32,
}

impl PoisonStatus {
    pub fn turns_remaining(&self) -> u32 {
        self.turns_remaining
    }
}

/// Result of one poison tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tick", rename_all = "snake_case")]
pub enum PoisonTick {
    /// Nothing happened
    NotPoisoned,
    Ticked {
        damage: u32,
        /// 0 means the poison just wore off
        turns_remaining: u32,
        defeated: bool,
    },
}

impl PoisonTick {
    pub fn defeated(&self) -> bool {
        matches!(self, PoisonTick::Ticked { defeated: true, .. })
    }

    pub fn cured(&self) -> bool {
        matches!(self, PoisonTick::Ticked { turns_remaining: 0, .. })
    }
}

/// Poison a combatant for `duration` turns plus the class bonus
///
/// Reapplying never stacks: the timer becomes the longer of the existing and
/// the new duration. Returns the resulting turns (0 if nothing was applied).
pub fn apply_poison(target: &mut StatBlock, duration: u32, dice: &mut impl Dice) -> u32 {
    let bonus = match target.class_tag() {
        Some(class) => constants().classes.profile(class).poison_bonus.roll(dice),
        None => 0,
    };
    let existing = target.poison().map(|p| p.turns_remaining).unwrap_or(0);
    let turns = existing.max(duration.saturating_add(bonus));

    if turns > 0 {
        target.set_poison(Some(PoisonStatus { turns_remaining: turns }));
    }
    tracing::debug!(
        combatant = target.name(),
        duration,
        bonus,
        turns,
        "poison applied"
    );
    turns
}

/// Apply one poison tick
pub fn tick(target: &mut StatBlock) -> PoisonTick {
    let Some(status) = target.poison() else {
        return PoisonTick::NotPoisoned;
    };

    let damage = constants().poison.tick_damage;
    let defeated = target.apply_damage(damage);
    let turns_remaining = status.turns_remaining.saturating_sub(1);

    if turns_remaining == 0 || defeated {
        target.set_poison(None);
    } else {
        target.set_poison(Some(PoisonStatus { turns_remaining }));
    }

    tracing::debug!(
        combatant = target.name(),
        damage,
        turns_remaining,
        defeated,
        "poison tick"
    );
    PoisonTick::Ticked {
        damage,
        turns_remaining,
        defeated,
    }
}
