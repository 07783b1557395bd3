//! Class profile table
//!
//! Every class-conditioned number (starting stats, trap odds, poison bonus)
//! is looked up here instead of branching on the class in engine code.

use super::RollRange;
use crate::types::ClassTag;
use serde::{Deserialize, Serialize};

/// Balancing row for one class
///
/// A class section in a constants file must be complete; partial rows are
/// rejected by the parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassProfile {
    // === Starting stats ===
    pub max_health: u32,
    pub max_resource: u32,
    pub damage_rating: u32,
    pub armor_rating: u32,

    // === Traps ===
    /// Detects every trap without help
    pub detects_traps: bool,
    /// Chance a held detection item reveals the trap (item is spent on success)
    pub detection_item_chance: f64,
    /// Disarm chance when holding a disarmament tool
    pub disarm_with_tool: f64,
    /// Chance the tool survives a successful disarm
    pub keep_tool: f64,
    /// Disarm chance bare-handed
    pub disarm_bare: f64,
    /// Chance to step around a detected trap
    pub avoid: f64,
    /// Failed tool disarm fires the trap at half strength instead of full
    pub half_damage_on_failed_tool_disarm: bool,

    // === Poison ===
    /// Extra poison turns added on top of every application
    pub poison_bonus: RollRange,
}

impl ClassProfile {
    pub fn warrior() -> Self {
        ClassProfile {
            max_health: 120,
            max_resource: 0,
            damage_rating: 15,
            armor_rating: 10,
            ..Self::baseline()
        }
    }

    pub fn mage() -> Self {
        ClassProfile {
            max_health: 80,
            max_resource: 120,
            damage_rating: 12,
            armor_rating: 5,
            ..Self::baseline()
        }
    }

    pub fn rogue() -> Self {
        ClassProfile {
            max_health: 100,
            max_resource: 0,
            damage_rating: 13,
            armor_rating: 3,
            detects_traps: true,
            detection_item_chance: 0.5,
            disarm_with_tool: 0.9,
            keep_tool: 0.7,
            // Below the baseline row; open balancing question
            disarm_bare: 0.2,
            avoid: 0.6,
            half_damage_on_failed_tool_disarm: true,
            poison_bonus: RollRange(1, 2),
        }
    }

    fn baseline() -> Self {
        ClassProfile {
            max_health: 100,
            max_resource: 0,
            damage_rating: 10,
            armor_rating: 0,
            detects_traps: false,
            detection_item_chance: 0.5,
            disarm_with_tool: 0.5,
            keep_tool: 0.0,
            disarm_bare: 0.5,
            avoid: 0.4,
            half_damage_on_failed_tool_disarm: false,
            poison_bonus: RollRange(0, 0),
        }
    }

    pub(crate) fn probabilities(&self) -> [(&'static str, f64); 5] {
        [
            ("detection_item_chance", self.detection_item_chance),
            ("disarm_with_tool", self.disarm_with_tool),
            ("keep_tool", self.keep_tool),
            ("disarm_bare", self.disarm_bare),
            ("avoid", self.avoid),
        ]
    }
}

/// One profile per class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassTable {
    #[serde(default = "ClassProfile::warrior")]
    pub warrior: ClassProfile,
    #[serde(default = "ClassProfile::mage")]
    pub mage: ClassProfile,
    #[serde(default = "ClassProfile::rogue")]
    pub rogue: ClassProfile,
}

impl Default for ClassTable {
    fn default() -> Self {
        ClassTable {
            warrior: ClassProfile::warrior(),
            mage: ClassProfile::mage(),
            rogue: ClassProfile::rogue(),
        }
    }
}

impl ClassTable {
    pub fn profile(&self, class: ClassTag) -> &ClassProfile {
        match class {
            ClassTag::Warrior => &self.warrior,
            ClassTag::Mage => &self.mage,
            ClassTag::Rogue => &self.rogue,
        }
    }

    /// Profile for a possibly classless combatant; opponents use the warrior row
    pub fn profile_for(&self, class: Option<ClassTag>) -> &ClassProfile {
        self.profile(class.unwrap_or(ClassTag::Warrior))
    }

    pub fn iter(&self) -> impl Iterator<Item = (ClassTag, &ClassProfile)> {
        ClassTag::all().iter().map(move |c| (*c, self.profile(*c)))
    }
}
