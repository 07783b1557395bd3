//! Traps - detection, disarming, avoidance and triggered effects

mod resolver;

pub use resolver::{
    detect, resolve_choice, resolve_trap, trigger, Detection, Severity, ToolUse, TrapEffect, TrapOutcome, TrapResolution,
};

use crate::config::constants;
use crate::dice::Dice;
use crate::error::{EncounterError, EntityKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrapKind {
    Spike,
    Pitfall,
    /// No damage, but pins the player while enemies close in
    Net,
    PoisonDart,
}

impl TrapKind {
    pub fn all() -> &'static [TrapKind] {
        &[TrapKind::Spike, TrapKind::Pitfall, TrapKind::Net, TrapKind::PoisonDart]
    }
}

impl fmt::Display for TrapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrapKind::Spike => write!(f, "spike"),
            TrapKind::Pitfall => write!(f, "pitfall"),
            TrapKind::Net => write!(f, "net"),
            TrapKind::PoisonDart => write!(f, "poison dart"),
        }
    }
}

impl FromStr for TrapKind {
    type Err = EncounterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', " ").as_str() {
            "spike" => Ok(TrapKind::Spike),
            "pitfall" => Ok(TrapKind::Pitfall),
            "net" => Ok(TrapKind::Net),
            "poison dart" => Ok(TrapKind::PoisonDart),
            _ => Err(EncounterError::unknown(EntityKind::Trap, s)),
        }
    }
}

/// A single trap instance; consumed as soon as it is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trap {
    pub kind: TrapKind,
    pub base_damage: u32,
}

impl Trap {
    /// A trap with the configured base damage for its kind
    pub fn new(kind: TrapKind) -> Self {
        let traps = &constants().traps;
        let base_damage = match kind {
            TrapKind::Spike => traps.spike_damage,
            TrapKind::Pitfall => traps.pitfall_damage,
            TrapKind::Net => traps.net_damage,
            TrapKind::PoisonDart => traps.poison_dart_damage,
        };
        Trap { kind, base_damage }
    }

    /// Resolve a trap key such as `"poison dart"`
    pub fn from_key(key: &str) -> Result<Self, EncounterError> {
        Ok(Trap::new(key.parse()?))
    }
}

/// Roll whether a location transition springs a trap, and which one
pub fn roll_trap(dice: &mut impl Dice) -> Option<Trap> {
    if !dice.succeeds(constants().encounter.trap_chance) {
        return None;
    }
    let kinds = TrapKind::all();
    Some(Trap::new(kinds[dice.pick(kinds.len())]))
}
