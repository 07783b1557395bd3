//! Reward resolution and reward policy

use super::FightPath;
use crate::config::constants;
use crate::content::ContentProvider;
use crate::dice::Dice;
use crate::stat_block::StatBlock;
use crate::types::ItemId;
use serde::{Deserialize, Serialize};

/// What the player earned. Reported to the caller, who owns the inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "item", rename_all = "snake_case")]
pub enum Reward {
    Gold,
    Item(ItemId),
    Experience,
}

/// Which forced-fight victories earn a reward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardPolicy {
    #[serde(default = "default_true")]
    pub reward_after_failed_evade: bool,
    #[serde(default)]
    pub reward_after_failed_negotiation: bool,
}

fn default_true() -> bool {
    true
}

impl Default for RewardPolicy {
    fn default() -> Self {
        RewardPolicy {
            reward_after_failed_evade: true,
            reward_after_failed_negotiation: false,
        }
    }
}

impl RewardPolicy {
    /// Reward every victory regardless of how the fight started
    pub fn generous() -> Self {
        RewardPolicy {
            reward_after_failed_evade: true,
            reward_after_failed_negotiation: true,
        }
    }

    pub fn rewards_victory(&self, path: FightPath) -> bool {
        match path {
            FightPath::Chosen => true,
            FightPath::AfterFailedEvade => self.reward_after_failed_evade,
            FightPath::AfterFailedNegotiation => self.reward_after_failed_negotiation,
        }
    }
}

/// Pick a reward uniformly and grow the player's damage modifier
///
/// The modifier grows on every call, whatever the reward kind.
pub fn resolve_reward(player: &mut StatBlock, content: &dyn ContentProvider, dice: &mut impl Dice) -> Reward {
    let reward = match dice.roll(0, 2) {
        0 => Reward::Gold,
        1 => {
            let items = content.items();
            if items.is_empty() {
                tracing::warn!("item reward rolled with an empty catalog, granting gold");
                Reward::Gold
            } else {
                Reward::Item(items[dice.pick(items.len())].id.clone())
            }
        }
        _ => Reward::Experience,
    };
    player.raise_damage_modifier(constants().encounter.reward_modifier_step);

    tracing::info!(
        player = player.name(),
        ?reward,
        damage_modifier = player.damage_modifier(),
        "reward granted"
    );
    reward
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{InMemoryContent, ItemKind};
    use crate::dice::ScriptedDice;

    #[test]
    fn test_default_policy() {
        let policy = RewardPolicy::default();
        assert!(policy.rewards_victory(FightPath::Chosen));
        assert!(policy.rewards_victory(FightPath::AfterFailedEvade));
        assert!(!policy.rewards_victory(FightPath::AfterFailedNegotiation));
        assert!(RewardPolicy::generous().rewards_victory(FightPath::AfterFailedNegotiation));
    }

    #[test]
    fn test_policy_from_toml() {
        let policy: RewardPolicy = toml::from_str("reward_after_failed_negotiation = true").unwrap();
        assert!(policy.reward_after_failed_evade);
        assert!(policy.reward_after_failed_negotiation);
    }

    #[test]
    fn test_item_reward_picks_from_catalog() {
        let content = InMemoryContent::new()
            .with_item("Rope", ItemKind::Tool)
            .with_item("Lantern", ItemKind::Tool);
        let mut player = StatBlock::new("hero", 100);
        let mut dice = ScriptedDice::minimal().with_rolls([1, 1]);

        let reward = resolve_reward(&mut player, &content, &mut dice);
        assert_eq!(reward, Reward::Item(ItemId::from("Lantern")));
        assert!((player.damage_modifier() - 1.2).abs() < 1e-9);
    }

    #[test]
    fn test_empty_catalog_falls_back_to_gold() {
        let content = InMemoryContent::new();
        let mut player = StatBlock::new("hero", 100);
        let mut dice = ScriptedDice::minimal().with_rolls([1]);
        assert_eq!(resolve_reward(&mut player, &content, &mut dice), Reward::Gold);
    }

    #[test]
    fn test_every_reward_raises_modifier() {
        let content = InMemoryContent::new();
        let mut player = StatBlock::new("hero", 100);
        let mut dice = ScriptedDice::minimal().with_rolls([0, 2, 2]);
        for _ in 0..3 {
            resolve_reward(&mut player, &content, &mut dice);
        }
        assert!((player.damage_modifier() - 1.6).abs() < 1e-9);
    }
}
