//! Consumables - a counted view of the inventory

use crate::error::EncounterError;
use crate::types::ItemId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Multiset of item identifiers
///
/// Counts never go negative: consuming an absent item fails instead of
/// decrementing. Entries with a zero count are removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Consumables {
    counts: BTreeMap<ItemId, u32>,
}

impl Consumables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` copies of an item. Only inventory owners call this; the
    /// engine itself never adds items.
    pub fn insert(&mut self, item: impl Into<ItemId>, count: u32) {
        if count == 0 {
            return;
        }
        let held = self.counts.entry(item.into()).or_insert(0);
        *held = held.saturating_add(count);
    }

    /// Remove one copy of an item
    pub fn consume(&mut self, item: &str) -> Result<(), EncounterError> {
        match self.counts.get_mut(item) {
            Some(count) if *count > 1 => {
                *count -= 1;
                Ok(())
            }
            Some(_) => {
                self.counts.remove(item);
                Ok(())
            }
            None => Err(EncounterError::ItemNotAvailable(ItemId::from(item))),
        }
    }

    pub fn count(&self, item: &str) -> u32 {
        self.counts.get(item).copied().unwrap_or(0)
    }

    pub fn contains(&self, item: &str) -> bool {
        self.count(item) > 0
    }

    /// Total number of items, counting duplicates
    pub fn total(&self) -> u32 {
        self.counts.values().fold(0u32, |sum, count| sum.saturating_add(*count))
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ItemId, u32)> {
        self.counts.iter().map(|(id, count)| (id, *count))
    }
}

impl<S: Into<ItemId>> FromIterator<S> for Consumables {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut consumables = Consumables::new();
        for item in iter {
            consumables.insert(item, 1);
        }
        consumables
    }
}
