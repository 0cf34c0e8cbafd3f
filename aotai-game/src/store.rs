//! Outfitter catalog and purchase policy
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use crate::inventory::Inventory;
use crate::journey::Rejection;
use crate::state::Stat;

const DEFAULT_ITEM_DATA: &str = include_str!("../assets/data/items.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemCategory {
    Food,
    Medical,
    Gear,
}

impl ItemCategory {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::Medical => "medical",
            Self::Gear => "gear",
        }
    }

    #[must_use]
    pub const fn is_consumable(self) -> bool {
        matches!(self, Self::Food | Self::Medical)
    }
}

/// Continuously active modifiers granted by owned gear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassiveKind {
    WarmthRetention,
    MoveEfficiency,
}

impl PassiveKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::WarmthRetention => "warmth retention",
            Self::MoveEfficiency => "move efficiency",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemEffect {
    DirectRestore { stat: Stat, amount: i32 },
    PassiveModifier { passive: PassiveKind, amount: i32 },
}

impl fmt::Display for ItemEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DirectRestore { stat, amount } => write!(f, "restores {amount} {}", stat.label()),
            Self::PassiveModifier { passive, amount } => {
                write!(f, "{} +{amount}", passive.label())
            }
        }
    }
}

/// Immutable catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
    pub price: i64,
    pub description: String,
    pub category: ItemCategory,
    pub effect: ItemEffect,
    /// Extra warmth restored when the item is eaten.
    #[serde(default)]
    pub warmth_bonus: i32,
}

impl Item {
    #[must_use]
    pub const fn is_gear(&self) -> bool {
        matches!(self.category, ItemCategory::Gear)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Catalog {
    #[serde(default)]
    pub items: Vec<Item>,
}

impl Catalog {
    #[must_use]
    pub fn load_from_static() -> Self {
        Self::from_json(DEFAULT_ITEM_DATA).unwrap_or_default()
    }

    #[must_use]
    pub fn default_catalog() -> &'static Self {
        static CATALOG: OnceLock<Catalog> = OnceLock::new();
        CATALOG.get_or_init(Self::load_from_static)
    }

    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into a catalog.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn find(&self, item_id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id == item_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    pub fn gear(&self) -> impl Iterator<Item = &Item> {
        self.items.iter().filter(|item| item.is_gear())
    }

    /// Shop gate: a known item, affordable, and not a second copy of owned gear.
    ///
    /// # Errors
    ///
    /// Returns the [`Rejection`] explaining why the purchase is refused.
    pub fn check_purchase(
        &self,
        item_id: &str,
        money: i64,
        inventory: &Inventory,
    ) -> Result<&Item, Rejection> {
        let item = self.find(item_id).ok_or(Rejection::UnknownItem)?;
        if item.is_gear() && inventory.owns(&item.id) {
            return Err(Rejection::AlreadyOwned);
        }
        if money < item.price {
            return Err(Rejection::InsufficientFunds);
        }
        Ok(item)
    }
}
