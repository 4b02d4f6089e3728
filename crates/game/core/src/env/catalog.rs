//! Read-only monster and item template tables.
//!
//! A [`Catalog`] is built once (usually by `delve-content` from RON files) and
//! passed explicitly to whatever spawns entities. There is no global table, so
//! tests can build isolated worlds from hand-written catalogs.

use std::collections::BTreeMap;

use super::OracleError;
use crate::combat::Damage;
use crate::state::{
    Actor, ActorFlags, Attribute, Disposition, EntityId, Item, ItemId, Slot, Stat, WeaponCategory,
};
use crate::traits::Trait;

/// Blueprint for a monster, villager or the player.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ActorTemplate {
    pub name: String,
    pub hp: i32,
    /// Base values; abilities missing here default to 10.
    pub stats: BTreeMap<Attribute, i32>,
    pub recovery: f64,
    pub disposition: Disposition,
    pub innate_damage: Vec<Damage>,
    pub traits: Vec<Trait>,
    /// Item template keys. The first item per slot is equipped.
    pub items: Vec<String>,
    pub gold: u32,
    pub villager: bool,
    pub boss: bool,
}

impl Default for ActorTemplate {
    fn default() -> Self {
        Self {
            name: String::new(),
            hp: 1,
            stats: BTreeMap::new(),
            recovery: 1.0,
            disposition: Disposition::Dormant,
            innate_damage: Vec::new(),
            traits: Vec::new(),
            items: Vec::new(),
            gold: 0,
            villager: false,
            boss: false,
        }
    }
}

/// Blueprint for an item.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ItemTemplate {
    pub name: String,
    pub category: WeaponCategory,
    pub slot: Option<Slot>,
    pub damage: Vec<Damage>,
    pub speed: f64,
    pub metal: bool,
    pub traits: Vec<Trait>,
}

impl Default for ItemTemplate {
    fn default() -> Self {
        Self {
            name: String::new(),
            category: WeaponCategory::Unarmed,
            slot: None,
            damage: Vec::new(),
            speed: 1.0,
            metal: false,
            traits: Vec::new(),
        }
    }
}

impl ItemTemplate {
    pub fn instantiate(&self, id: ItemId) -> Item {
        let mut item = Item::new(id, self.name.clone());
        item.category = self.category;
        item.slot = self.slot;
        item.damage = self.damage.clone();
        item.speed = self.speed;
        item.metal = self.metal;
        for kind in &self.traits {
            item.traits.push_permanent(kind.clone());
        }
        item
    }
}

/// Template tables plus per-level encounter lists.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Catalog {
    pub actors: BTreeMap<String, ActorTemplate>,
    pub items: BTreeMap<String, ItemTemplate>,
    /// Level index to the actor template keys that may wander in.
    pub encounters: BTreeMap<u16, Vec<String>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn actor(&self, key: &str) -> Result<&ActorTemplate, OracleError> {
        self.actors
            .get(key)
            .ok_or_else(|| OracleError::ActorTemplateNotFound(key.to_owned()))
    }

    pub fn item(&self, key: &str) -> Result<&ItemTemplate, OracleError> {
        self.items
            .get(key)
            .ok_or_else(|| OracleError::ItemTemplateNotFound(key.to_owned()))
    }

    pub fn encounter_table(&self, level: u16) -> &[String] {
        self.encounters
            .get(&level)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Builds an actor from a template. `next_item` hands out item ids.
    ///
    /// The actor is not placed; callers set its level and position.
    pub fn build_actor(
        &self,
        key: &str,
        id: EntityId,
        mut next_item: impl FnMut() -> ItemId,
    ) -> Result<Actor, OracleError> {
        let template = self.actor(key)?;
        let mut actor = Actor::new(id, template.name.clone(), template.hp)
            .with_recovery(template.recovery)
            .with_disposition(template.disposition);
        actor.template = Some(key.to_owned());
        for (attribute, value) in &template.stats {
            actor.stats.set(*attribute, Stat::full(*value));
        }
        actor.innate_damage = template.innate_damage.clone();
        for kind in &template.traits {
            actor.traits.push_permanent(kind.clone());
        }

        let mut occupied = Vec::new();
        for item_key in &template.items {
            let mut item = self.item(item_key)?.instantiate(next_item());
            if let Some(slot) = item.slot {
                if !occupied.contains(&slot) {
                    item.equipped = true;
                    occupied.push(slot);
                }
            }
            actor.inventory.items.push(item);
        }
        actor.inventory.gold = template.gold;

        if template.villager {
            actor.flags |= ActorFlags::VILLAGER;
        }
        if template.boss {
            actor.flags |= ActorFlags::BOSS;
        }
        Ok(actor)
    }
}
