//! Encounter constants configuration

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

use super::{ClassTable, ConfigError};
use crate::dice::Dice;

/// Global encounter constants instance
static ENCOUNTER_CONSTANTS: OnceLock<EncounterConstants> = OnceLock::new();

/// Initialize the global constants from a TOML file
///
/// Call once at startup, before the first encounter. Returns an error if the
/// constants were already initialized (explicitly or by a prior lookup) or if
/// loading or validation fails.
pub fn init_constants(path: &Path) -> Result<(), ConfigError> {
    let constants = EncounterConstants::load_from_path(path)?;
    ENCOUNTER_CONSTANTS
        .set(constants)
        .map_err(|_| ConfigError::ValidationError("EncounterConstants already initialized".to_string()))
}

/// Initialize the global constants with default values
pub fn init_constants_default() -> Result<(), ConfigError> {
    ENCOUNTER_CONSTANTS
        .set(EncounterConstants::default())
        .map_err(|_| ConfigError::ValidationError("EncounterConstants already initialized".to_string()))
}

/// Get a reference to the global constants
///
/// Falls back to [`EncounterConstants::default`] if nothing was initialized.
pub fn constants() -> &'static EncounterConstants {
    ENCOUNTER_CONSTANTS.get_or_init(EncounterConstants::default)
}

/// Check if constants have been initialized
pub fn constants_initialized() -> bool {
    ENCOUNTER_CONSTANTS.get().is_some()
}

/// Inclusive integer range, written `[min, max]` in TOML
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollRange(pub u32, pub u32);

impl RollRange {
    pub fn min(&self) -> u32 {
        self.0
    }

    pub fn max(&self) -> u32 {
        self.1
    }

    pub fn contains(&self, value: u32) -> bool {
        (self.0..=self.1).contains(&value)
    }

    pub fn roll(&self, dice: &mut impl Dice) -> u32 {
        dice.roll(self.0, self.1)
    }
}

/// Tunable encounter constants
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EncounterConstants {
    #[serde(default)]
    pub encounter: EncounterTuning,
    #[serde(default)]
    pub combat: CombatConstants,
    #[serde(default)]
    pub poison: PoisonConstants,
    #[serde(default)]
    pub traps: TrapConstants,
    #[serde(default)]
    pub items: ItemConstants,
    #[serde(default)]
    pub classes: ClassTable,
}

impl EncounterConstants {
    /// Load and validate constants from a TOML file
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let constants: EncounterConstants = super::load_toml(path)?;
        constants.validate()?;
        Ok(constants)
    }

    /// Parse and validate constants from a TOML string
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let constants: EncounterConstants = super::parse_toml(content)?;
        constants.validate()?;
        Ok(constants)
    }

    /// Reject probabilities outside `[0, 1]`, inverted ranges and a zero round cap
    pub fn validate(&self) -> Result<(), ConfigError> {
        let probabilities = [
            ("encounter.encounter_chance", self.encounter.encounter_chance),
            ("encounter.trap_chance", self.encounter.trap_chance),
            ("encounter.evade_chance", self.encounter.evade_chance),
            ("encounter.negotiate_chance", self.encounter.negotiate_chance),
        ];
        for (class, profile) in self.classes.iter() {
            for (name, value) in profile.probabilities() {
                if !(0.0..=1.0).contains(&value) {
                    return Err(ConfigError::ValidationError(format!(
                        "classes.{}.{} must be within [0, 1], got {}",
                        class.to_string().to_lowercase(),
                        name,
                        value
                    )));
                }
            }
            let bonus = profile.poison_bonus;
            if bonus.min() > bonus.max() {
                return Err(ConfigError::ValidationError(format!(
                    "classes.{}.poison_bonus is inverted: [{}, {}]",
                    class.to_string().to_lowercase(),
                    bonus.min(),
                    bonus.max()
                )));
            }
        }
        for (name, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ValidationError(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }

        let ranges = [
            ("combat.attack_roll", self.combat.attack_roll),
            ("combat.counter_roll", self.combat.counter_roll),
            ("combat.block_roll", self.combat.block_roll),
            ("combat.heal_roll", self.combat.heal_roll),
            ("poison.dart_duration", self.poison.dart_duration),
            ("items.health_potion_roll", self.items.health_potion_roll),
            ("items.mana_potion_roll", self.items.mana_potion_roll),
        ];
        for (name, range) in ranges {
            if range.min() > range.max() {
                return Err(ConfigError::ValidationError(format!(
                    "{} is inverted: [{}, {}]",
                    name,
                    range.min(),
                    range.max()
                )));
            }
        }

        let tuning = &self.encounter;
        if tuning.min_opponents == 0 || tuning.min_opponents > tuning.max_opponents {
            return Err(ConfigError::ValidationError(format!(
                "encounter opponents must satisfy 1 <= min <= max, got [{}, {}]",
                tuning.min_opponents, tuning.max_opponents
            )));
        }
        if self.combat.round_cap == 0 {
            return Err(ConfigError::ValidationError("combat.round_cap must be positive".to_string()));
        }
        if self.encounter.reward_modifier_step < 0.0 {
            return Err(ConfigError::ValidationError(
                "encounter.reward_modifier_step cannot be negative".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterTuning {
    /// Chance a location transition starts an encounter
    #[serde(default = "default_encounter_chance")]
    pub encounter_chance: f64,
    #[serde(default = "default_min_opponents")]
    pub min_opponents: u32,
    #[serde(default = "default_max_opponents")]
    pub max_opponents: u32,
    /// Chance a location transition springs a trap
    #[serde(default = "default_trap_chance")]
    pub trap_chance: f64,
    #[serde(default = "default_coin_flip")]
    pub evade_chance: f64,
    #[serde(default = "default_coin_flip")]
    pub negotiate_chance: f64,
    /// Added to the player's damage modifier on every reward
    #[serde(default = "default_reward_modifier_step")]
    pub reward_modifier_step: f64,
}

impl Default for EncounterTuning {
    fn default() -> Self {
        EncounterTuning {
            encounter_chance: 0.4,
            min_opponents: 1,
            max_opponents: 4,
            trap_chance: 0.3,
            evade_chance: 0.5,
            negotiate_chance: 0.5,
            reward_modifier_step: 0.2,
        }
    }
}

fn default_encounter_chance() -> f64 {
    0.4
}
fn default_min_opponents() -> u32 {
    1
}
fn default_max_opponents() -> u32 {
    4
}
fn default_trap_chance() -> f64 {
    0.3
}
fn default_coin_flip() -> f64 {
    0.5
}
fn default_reward_modifier_step() -> f64 {
    0.2
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatConstants {
    /// Base roll of the player's attack, scaled by the damage modifier
    #[serde(default = "default_attack_roll")]
    pub attack_roll: RollRange,
    /// Base roll of every opponent hit (exchange and counter-attack)
    #[serde(default = "default_attack_roll")]
    pub counter_roll: RollRange,
    /// Damage taken on a blocked round
    #[serde(default = "default_block_roll")]
    pub block_roll: RollRange,
    /// Health restored by the Heal action
    #[serde(default = "default_heal_roll")]
    pub heal_roll: RollRange,
    /// Rounds before a fight is called a stalemate
    #[serde(default = "default_round_cap")]
    pub round_cap: u32,
}

impl Default for CombatConstants {
    fn default() -> Self {
        CombatConstants {
            attack_roll: default_attack_roll(),
            counter_roll: default_attack_roll(),
            block_roll: default_block_roll(),
            heal_roll: default_heal_roll(),
            round_cap: default_round_cap(),
        }
    }
}

fn default_attack_roll() -> RollRange {
    RollRange(5, 15)
}
fn default_block_roll() -> RollRange {
    RollRange(0, 5)
}
fn default_heal_roll() -> RollRange {
    RollRange(10, 20)
}
fn default_round_cap() -> u32 {
    500
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoisonConstants {
    /// Flat damage per tick
    #[serde(default = "default_tick_damage")]
    pub tick_damage: u32,
    /// Turns applied by a poison dart, before class bonus
    #[serde(default = "default_dart_duration")]
    pub dart_duration: RollRange,
}

impl Default for PoisonConstants {
    fn default() -> Self {
        PoisonConstants {
            tick_damage: default_tick_damage(),
            dart_duration: default_dart_duration(),
        }
    }
}

fn default_tick_damage() -> u32 {
    10
}
fn default_dart_duration() -> RollRange {
    RollRange(2, 5)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrapConstants {
    #[serde(default = "default_spike_damage")]
    pub spike_damage: u32,
    #[serde(default = "default_pitfall_damage")]
    pub pitfall_damage: u32,
    #[serde(default)]
    pub net_damage: u32,
    #[serde(default)]
    pub poison_dart_damage: u32,
}

impl Default for TrapConstants {
    fn default() -> Self {
        TrapConstants {
            spike_damage: default_spike_damage(),
            pitfall_damage: default_pitfall_damage(),
            net_damage: 0,
            poison_dart_damage: 0,
        }
    }
}

fn default_spike_damage() -> u32 {
    20
}
fn default_pitfall_damage() -> u32 {
    30
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemConstants {
    /// Health restored by drinking a Health Potion outside combat
    #[serde(default = "default_potion_roll")]
    pub health_potion_roll: RollRange,
    /// Resource restored by a Mana Potion
    #[serde(default = "default_potion_roll")]
    pub mana_potion_roll: RollRange,
}

impl Default for ItemConstants {
    fn default() -> Self {
        ItemConstants {
            health_potion_roll: default_potion_roll(),
            mana_potion_roll: default_potion_roll(),
        }
    }
}

fn default_potion_roll() -> RollRange {
    RollRange(20, 30)
}
