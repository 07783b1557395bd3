//! Trap resolution state machine
//!
//! ```text
//! detect -> Undetected -> trigger (full)
//!        -> Detected   -> resolve_choice -> Disarmed | Avoided | Triggered(severity) -> trigger
//! ```
//!
//! Every class-dependent probability is read from the class profile table.

use super::{Trap, TrapKind};
use crate::config::{constants, ClassProfile};
use crate::dice::Dice;
use crate::stat_block::StatBlock;
use crate::status;
use crate::types::{TrapChoice, TRAP_DETECTION_ITEM, TRAP_DISARMAMENT_ITEM};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Detection {
    /// `used_item` is set when a detection item was spent to notice the trap
    Detected { used_item: bool },
    Undetected,
}

impl Detection {
    pub fn is_detected(&self) -> bool {
        matches!(self, Detection::Detected { .. })
    }
}

/// How hard a triggered trap hits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Full,
    /// Half of base damage; Net still pins, PoisonDart does nothing
    Half,
}

/// What happened to the disarmament tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolUse {
    NotUsed,
    Kept,
    Broken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrapResolution {
    Disarmed { tool: ToolUse },
    Avoided,
    Triggered { severity: Severity, tool: ToolUse },
}

impl TrapResolution {
    pub fn severity(&self) -> Option<Severity> {
        match self {
            TrapResolution::Triggered { severity, .. } => Some(*severity),
            _ => None,
        }
    }
}

/// Numeric effect of a triggered trap
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrapEffect {
    pub damage_taken: u32,
    /// Resulting poison turns, if the trap poisoned the player
    pub poison_turns: Option<u32>,
    /// The player is pinned and must fight a forced encounter
    pub spawns_encounter: bool,
    /// The trap reduced the player to 0 health
    pub expired: bool,
}

/// Full record of one resolved trap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrapOutcome {
    pub kind: TrapKind,
    pub detection: Detection,
    pub resolution: TrapResolution,
    pub effect: TrapEffect,
}

impl TrapOutcome {
    pub fn expired(&self) -> bool {
        self.effect.expired
    }

    pub fn spawns_encounter(&self) -> bool {
        self.effect.spawns_encounter
    }
}

fn profile(player: &StatBlock) -> &'static ClassProfile {
    constants().classes.profile_for(player.class_tag())
}

/// Check whether the player notices a trap
///
/// A detection item is only spent when it works.
pub fn detect(player: &mut StatBlock, dice: &mut impl Dice) -> Detection {
    let profile = profile(player);
    if profile.detects_traps {
        return Detection::Detected { used_item: false };
    }
    if !player.consumables().contains(TRAP_DETECTION_ITEM) {
        return Detection::Undetected;
    }
    if dice.succeeds(profile.detection_item_chance) && player.consume(TRAP_DETECTION_ITEM).is_ok() {
        Detection::Detected { used_item: true }
    } else {
        Detection::Undetected
    }
}

/// Resolve the player's response to a detected trap
///
/// Spends or keeps the disarmament tool but applies no damage; pass a
/// `Triggered` result to [`trigger`].
pub fn resolve_choice(player: &mut StatBlock, trap: &Trap, choice: TrapChoice, dice: &mut impl Dice) -> TrapResolution {
    let profile = profile(player);
    let resolution = match choice {
        TrapChoice::Disarm if player.consumables().contains(TRAP_DISARMAMENT_ITEM) => {
            if dice.succeeds(profile.disarm_with_tool) {
                if dice.succeeds(profile.keep_tool) {
                    TrapResolution::Disarmed { tool: ToolUse::Kept }
                } else {
                    spend_tool(player);
                    TrapResolution::Disarmed { tool: ToolUse::Broken }
                }
            } else {
                spend_tool(player);
                let severity = if profile.half_damage_on_failed_tool_disarm {
                    Severity::Half
                } else {
                    Severity::Full
                };
                TrapResolution::Triggered {
                    severity,
                    tool: ToolUse::Broken,
                }
            }
        }
        TrapChoice::Disarm => {
            if dice.succeeds(profile.disarm_bare) {
                TrapResolution::Disarmed { tool: ToolUse::NotUsed }
            } else {
                full_trigger()
            }
        }
        TrapChoice::Avoid => {
            if dice.succeeds(profile.avoid) {
                TrapResolution::Avoided
            } else {
                full_trigger()
            }
        }
        TrapChoice::Ignore => full_trigger(),
    };

    tracing::debug!(
        player = player.name(),
        trap = %trap.kind,
        ?choice,
        ?resolution,
        "trap choice resolved"
    );
    resolution
}

fn full_trigger() -> TrapResolution {
    TrapResolution::Triggered {
        severity: Severity::Full,
        tool: ToolUse::NotUsed,
    }
}

fn spend_tool(player: &mut StatBlock) {
    if let Err(err) = player.consume(TRAP_DISARMAMENT_ITEM) {
        tracing::warn!(%err, "disarmament tool vanished mid-resolution");
    }
}

/// Apply a trap's effect to the player
pub fn trigger(player: &mut StatBlock, trap: &Trap, severity: Severity, dice: &mut impl Dice) -> TrapEffect {
    let damage = match severity {
        Severity::Full => trap.base_damage,
        Severity::Half => trap.base_damage / 2,
    };
    let mut effect = TrapEffect::default();

    if damage > 0 {
        player.apply_damage(damage);
        effect.damage_taken = damage;
    }
    match (trap.kind, severity) {
        (TrapKind::Net, _) => effect.spawns_encounter = true,
        (TrapKind::PoisonDart, Severity::Full) => {
            let duration = constants().poison.dart_duration.roll(dice);
            let turns = status::apply_poison(player, duration, dice);
            effect.poison_turns = Some(turns);
        }
        _ => {}
    }
    effect.expired = player.is_defeated();

    tracing::debug!(
        player = player.name(),
        trap = %trap.kind,
        ?severity,
        damage = effect.damage_taken,
        poison_turns = ?effect.poison_turns,
        expired = effect.expired,
        "trap triggered"
    );
    effect
}

/// Resolve a trap end to end, asking `choose` only if the trap is detected
pub fn resolve_trap<F>(player: &mut StatBlock, trap: Trap, dice: &mut impl Dice, choose: F) -> TrapOutcome
where
    F: FnOnce(&Trap) -> TrapChoice,
{
    let detection = detect(player, dice);
    let resolution = if detection.is_detected() {
        resolve_choice(player, &trap, choose(&trap), dice)
    } else {
        full_trigger()
    };
    let effect = match resolution.severity() {
        Some(severity) => trigger(player, &trap, severity, dice),
        None => TrapEffect::default(),
    };

    TrapOutcome {
        kind: trap.kind,
        detection,
        resolution,
        effect,
    }
}
