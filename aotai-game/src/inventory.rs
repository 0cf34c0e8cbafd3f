//! Owned items and the passive modifiers they grant
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::store::{Catalog, ItemEffect, PassiveKind};

/// Item id to owned count. Entries are dropped when a count reaches zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Inventory {
    #[serde(default)]
    counts: BTreeMap<String, u32>,
}

impl Inventory {
    #[must_use]
    pub fn count(&self, item_id: &str) -> u32 {
        self.counts.get(item_id).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn owns(&self, item_id: &str) -> bool {
        self.count(item_id) > 0
    }

    /// Add one unit, returning the new count.
    pub fn add(&mut self, item_id: &str) -> u32 {
        let count = self.counts.entry(item_id.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    /// Remove one unit. Returns `false` (and changes nothing) when none are owned.
    pub fn remove_one(&mut self, item_id: &str) -> bool {
        let Some(count) = self.counts.get_mut(item_id) else {
            return false;
        };
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.counts.remove(item_id);
        }
        true
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.counts.iter().map(|(id, count)| (id.as_str(), *count))
    }
}

/// Derived modifiers from owned gear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Passives {
    pub move_efficiency: i32,
    pub warmth_retention: i32,
}

/// Sum the passive value of every owned gear item, independent of its count.
#[must_use]
pub fn resolve_passives(inventory: &Inventory, catalog: &Catalog) -> Passives {
    catalog
        .gear()
        .filter(|item| inventory.owns(&item.id))
        .fold(Passives::default(), |mut acc, item| {
            if let ItemEffect::PassiveModifier { passive, amount } = item.effect {
                match passive {
                    PassiveKind::MoveEfficiency => acc.move_efficiency += amount,
                    PassiveKind::WarmthRetention => acc.warmth_retention += amount,
                }
            }
            acc
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_add_and_remove() {
        let mut inventory = Inventory::default();
        assert!(!inventory.remove_one("mantou"));
        assert_eq!(inventory.add("mantou"), 1);
        assert_eq!(inventory.add("mantou"), 2);
        assert!(inventory.remove_one("mantou"));
        assert_eq!(inventory.count("mantou"), 1);
        assert!(inventory.remove_one("mantou"));
        assert!(!inventory.owns("mantou"));
        assert!(inventory.is_empty());
    }

    #[test]
    fn passives_sum_owned_gear_only() {
        let catalog = Catalog::default_catalog();
        let mut inventory = Inventory::default();
        assert_eq!(resolve_passives(&inventory, catalog), Passives::default());

        inventory.add("bamboo");
        inventory.add("poles");
        inventory.add("cotton");
        inventory.add("hotpot");
        let passives = resolve_passives(&inventory, catalog);
        assert_eq!(passives.move_efficiency, 4);
        assert_eq!(passives.warmth_retention, 1);
    }

    #[test]
    fn gear_counts_once_regardless_of_quantity() {
        let catalog = Catalog::default_catalog();
        let mut inventory = Inventory::default();
        inventory.add("goretex");
        inventory.add("goretex");
        assert_eq!(resolve_passives(&inventory, catalog).warmth_retention, 3);
    }
}
