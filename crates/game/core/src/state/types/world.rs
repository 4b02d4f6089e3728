use std::collections::{BTreeMap, BTreeSet};

use super::{Item, LevelId, Position};
use crate::env::TerrainKind;

/// An item lying on the floor.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FloorItem {
    pub level: LevelId,
    pub position: Position,
    pub item: Item,
}

/// Runtime world data layered on top of the static map.
///
/// Terrain changes (burnt grass, frozen water) are recorded as overlays; the
/// map oracle itself is never mutated.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldState {
    pub active_level: LevelId,
    overlays: BTreeMap<(LevelId, Position), TerrainKind>,
    /// Tiles lit by light sources this round.
    pub lit: BTreeSet<Position>,
    /// Tiles the player can currently see.
    pub visible: BTreeSet<Position>,
    pub floor_items: Vec<FloorItem>,
    gold: BTreeMap<(LevelId, Position), u32>,
}

impl WorldState {
    pub fn new(active_level: LevelId) -> Self {
        Self {
            active_level,
            ..Self::default()
        }
    }

    pub fn overlay(&self, level: LevelId, position: Position) -> Option<TerrainKind> {
        self.overlays.get(&(level, position)).copied()
    }

    pub fn set_overlay(&mut self, level: LevelId, position: Position, terrain: TerrainKind) {
        self.overlays.insert((level, position), terrain);
    }

    pub fn drop_item(&mut self, level: LevelId, position: Position, item: Item) {
        self.floor_items.push(FloorItem {
            level,
            position,
            item,
        });
    }

    pub fn items_at(&self, level: LevelId, position: Position) -> impl Iterator<Item = &Item> {
        self.floor_items
            .iter()
            .filter(move |floor| floor.level == level && floor.position == position)
            .map(|floor| &floor.item)
    }

    pub fn drop_gold(&mut self, level: LevelId, position: Position, amount: u32) {
        if amount == 0 {
            return;
        }
        *self.gold.entry((level, position)).or_default() += amount;
    }

    pub fn gold_at(&self, level: LevelId, position: Position) -> u32 {
        self.gold.get(&(level, position)).copied().unwrap_or(0)
    }
}
