//! Out-of-combat consumable use

use crate::config::constants;
use crate::content::{ContentProvider, ItemKind};
use crate::dice::Dice;
use crate::error::EncounterError;
use crate::stat_block::StatBlock;
use crate::status::{self, PoisonTick};
use crate::types::{ItemId, HEALTH_POTION, MANA_POTION};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", content = "amount", rename_all = "snake_case")]
pub enum ConsumableEffect {
    /// Health actually restored
    Healed(u32),
    /// Resource actually restored
    Restored(u32),
    /// Used up with no numeric effect
    Spent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemUse {
    pub item: ItemId,
    pub effect: ConsumableEffect,
    pub poison: PoisonTick,
}

const EXPECTED_CONSUMABLE: &str = "a consumable item";

/// Use one consumable outside combat
///
/// The item must be in the catalog, be a consumable and be held. A successful
/// use counts as a player action, so poison ticks once afterwards.
pub fn use_consumable(
    player: &mut StatBlock,
    item: &str,
    content: &dyn ContentProvider,
    dice: &mut impl Dice,
) -> Result<ItemUse, EncounterError> {
    if content.item_kind(item)? != ItemKind::Consumable {
        return Err(EncounterError::invalid(item, EXPECTED_CONSUMABLE));
    }
    player.consume(item)?;

    let items = &constants().items;
    let effect = match item {
        HEALTH_POTION => ConsumableEffect::Healed(player.heal(items.health_potion_roll.roll(dice))),
        MANA_POTION => {
            let before = player.resource();
            player.adjust_resource(i64::from(items.mana_potion_roll.roll(dice)));
            ConsumableEffect::Restored(player.resource() - before)
        }
        _ => ConsumableEffect::Spent,
    };
    let poison = status::tick(player);

    tracing::debug!(player = player.name(), item, ?effect, "consumable used");
    Ok(ItemUse {
        item: ItemId::from(item),
        effect,
        poison,
    })
}
