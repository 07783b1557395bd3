//! Shared identifiers and decision vocabularies

use crate::error::{EncounterError, EntityKind};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

/// Healing consumable spent by the Heal combat action
pub const HEALTH_POTION: &str = "Health Potion";
/// Resource-restoring consumable
pub const MANA_POTION: &str = "Mana Potion";
/// Gives non-Rogues a chance to spot traps before they fire
pub const TRAP_DETECTION_ITEM: &str = "trap_detection_item";
/// Improves disarm odds; may break during use
pub const TRAP_DISARMAMENT_ITEM: &str = "trap_disarmament_item";

/// Player class. Fixed at creation; selects the class profile row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassTag {
    Warrior,
    Mage,
    Rogue,
}

impl ClassTag {
    pub fn all() -> &'static [ClassTag] {
        &[ClassTag::Warrior, ClassTag::Mage, ClassTag::Rogue]
    }
}

impl fmt::Display for ClassTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassTag::Warrior => write!(f, "Warrior"),
            ClassTag::Mage => write!(f, "Mage"),
            ClassTag::Rogue => write!(f, "Rogue"),
        }
    }
}

impl FromStr for ClassTag {
    type Err = EncounterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "warrior" => Ok(ClassTag::Warrior),
            "mage" => Ok(ClassTag::Mage),
            "rogue" => Ok(ClassTag::Rogue),
            _ => Err(EncounterError::unknown(EntityKind::Class, s)),
        }
    }
}

/// Identifier of an item in the external catalog
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        ItemId(s.to_string())
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        ItemId(s)
    }
}

impl Borrow<str> for ItemId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the player does in one combat round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerAction {
    Attack,
    Block,
    Heal,
}

impl PlayerAction {
    pub const EXPECTED: &'static str = "attack, block or heal";
}

impl FromStr for PlayerAction {
    type Err = EncounterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "attack" => Ok(PlayerAction::Attack),
            "block" => Ok(PlayerAction::Block),
            "heal" => Ok(PlayerAction::Heal),
            _ => Err(EncounterError::invalid(s, Self::EXPECTED)),
        }
    }
}

/// How the player meets an opponent before any blows are traded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Fight,
    Evade,
    Negotiate,
}

impl Strategy {
    pub const EXPECTED: &'static str = "fight, evade or negotiate";
}

impl FromStr for Strategy {
    type Err = EncounterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fight" => Ok(Strategy::Fight),
            "evade" => Ok(Strategy::Evade),
            "negotiate" => Ok(Strategy::Negotiate),
            _ => Err(EncounterError::invalid(s, Self::EXPECTED)),
        }
    }
}

/// Response to a trap that was detected in advance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrapChoice {
    Disarm,
    Avoid,
    /// Walk on regardless; the trap fires
    Ignore,
}

impl TrapChoice {
    pub const EXPECTED: &'static str = "disarm, avoid or ignore";
}

impl FromStr for TrapChoice {
    type Err = EncounterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "disarm" => Ok(TrapChoice::Disarm),
            "avoid" => Ok(TrapChoice::Avoid),
            "ignore" | "none" => Ok(TrapChoice::Ignore),
            _ => Err(EncounterError::invalid(s, Self::EXPECTED)),
        }
    }
}

/// Terminal state of one opponent's resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalState {
    Victory,
    Defeat,
    Escaped,
    Stalemate,
}

/// Why a session stopped accepting actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// Killed in combat
    Defeated,
    /// Killed by a trap or by poison
    Expired,
    /// The decision source went away or the session was cancelled
    Abandoned,
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndReason::Defeated => write!(f, "defeated"),
            EndReason::Expired => write!(f, "expired"),
            EndReason::Abandoned => write!(f, "abandoned"),
        }
    }
}

/// Movement between two named locations; only used for context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationTransition {
    pub from: String,
    pub to: String,
}

impl LocationTransition {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        LocationTransition {
            from: from.into(),
            to: to.into(),
        }
    }
}
