use super::{ItemId, WeaponCategory};
use crate::combat::Damage;
use crate::traits::{Trait, TraitKind, TraitSet};

/// Equipment slot an item occupies while worn or wielded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Slot {
    Weapon,
    Body,
    Shield,
    Ring,
    Amulet,
}

/// A concrete item instance. Owns its traits (enchantments, coatings, capabilities).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub category: WeaponCategory,
    pub slot: Option<Slot>,
    pub equipped: bool,
    /// Damage entries dealt when wielded (empty for non-weapons).
    pub damage: Vec<Damage>,
    /// Energy cost multiplier of attacking with this item.
    pub speed: f64,
    /// Metal items are subject to corrosion.
    pub metal: bool,
    pub traits: TraitSet,
}

impl Item {
    pub fn new(id: ItemId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            category: WeaponCategory::Unarmed,
            slot: None,
            equipped: false,
            damage: Vec::new(),
            speed: 1.0,
            metal: false,
            traits: TraitSet::new(),
        }
    }

    /// Convenience constructor for an equipped weapon.
    pub fn weapon(
        id: ItemId,
        name: impl Into<String>,
        category: WeaponCategory,
        damage: Vec<Damage>,
    ) -> Self {
        Self {
            category,
            slot: Some(Slot::Weapon),
            equipped: true,
            damage,
            metal: !matches!(
                category,
                WeaponCategory::Bow | WeaponCategory::Sling | WeaponCategory::Unarmed
            ),
            ..Self::new(id, name)
        }
    }

    pub fn with_trait(mut self, kind: Trait) -> Self {
        self.traits.push_permanent(kind);
        self
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    pub fn is_wielded(&self) -> bool {
        self.equipped && self.slot == Some(Slot::Weapon)
    }

    /// Enchantment bonus carried by `WeaponBonus` traits.
    pub fn enchantment(&self) -> i32 {
        self.traits
            .iter()
            .filter_map(|entry| match entry.kind {
                Trait::WeaponBonus { amount } => Some(amount),
                _ => None,
            })
            .sum()
    }

    /// Armour bonus carried by `Armour` traits.
    pub fn armour_bonus(&self) -> i32 {
        self.traits
            .iter()
            .filter_map(|entry| match entry.kind {
                Trait::Armour { bonus } => Some(bonus),
                _ => None,
            })
            .sum()
    }

    pub fn has(&self, kind: TraitKind) -> bool {
        self.traits.has(kind)
    }
}

/// Items and currency carried by an actor.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Inventory {
    pub items: Vec<Item>,
    pub gold: u32,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.gold == 0
    }

    pub fn wielded(&self) -> Option<&Item> {
        self.items.iter().find(|item| item.is_wielded())
    }

    pub fn wielded_mut(&mut self) -> Option<&mut Item> {
        self.items.iter_mut().find(|item| item.is_wielded())
    }

    pub fn equipped(&self) -> impl Iterator<Item = &Item> {
        self.items.iter().filter(|item| item.equipped)
    }

    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    /// Empties the inventory, returning everything it held.
    pub fn take_all(&mut self) -> (Vec<Item>, u32) {
        let items = std::mem::take(&mut self.items);
        let gold = std::mem::take(&mut self.gold);
        (items, gold)
    }
}
