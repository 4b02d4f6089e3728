//! Authoritative game state.
//!
//! `GameState` owns every actor, the scheduler bookkeeping, runtime world
//! overlays and the event registry. The registry is derived data: it is
//! skipped by serialization and rebuilt from trait subscriptions on restore.
mod error;
pub mod types;

pub use error::StateError;
pub use types::{
    ability_modifier, Actor, ActorFlags, Attribute, Direction, Disposition, EntitiesState,
    EntityId, FloorItem, Inventory, Item, ItemId, LevelId, Position, Slot, Stat, StatBlock,
    TraitId, TurnState, WeaponCategory, WorldState,
};

use crate::env::Catalog;
use crate::events::EventRegistry;

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameState {
    /// Base seed for every roll. Set once at game creation.
    pub game_seed: u64,

    /// Next actor id. Never reused; 0 (PLAYER) and u32::MAX (SYSTEM) are reserved.
    next_entity_id: u32,
    next_item_id: u32,
    next_trait_id: u32,

    pub turn: TurnState,
    pub entities: EntitiesState,
    pub world: WorldState,

    #[cfg_attr(feature = "serde", serde(skip))]
    pub events: EventRegistry,
}

impl GameState {
    pub fn new(game_seed: u64) -> Self {
        Self {
            game_seed,
            next_entity_id: 1,
            next_item_id: 1,
            next_trait_id: 1,
            ..Self::default()
        }
    }

    /// Allocates a fresh actor id, skipping the reserved ones.
    pub fn allocate_entity_id(&mut self) -> Result<EntityId, StateError> {
        while self.next_entity_id == EntityId::PLAYER.0
            || self.next_entity_id == EntityId::SYSTEM.0
            || self.entities.contains(EntityId(self.next_entity_id))
        {
            self.next_entity_id = self.bump_entity()?;
        }
        let id = EntityId(self.next_entity_id);
        self.next_entity_id = self.bump_entity()?;
        Ok(id)
    }

    fn bump_entity(&self) -> Result<u32, StateError> {
        self.next_entity_id
            .checked_add(1)
            .ok_or(StateError::IdOverflow {
                current: self.next_entity_id,
            })
    }

    pub fn allocate_item_id(&mut self) -> ItemId {
        let id = ItemId(self.next_item_id);
        self.next_item_id = self.next_item_id.wrapping_add(1);
        id
    }

    pub fn allocate_trait_id(&mut self) -> Result<TraitId, StateError> {
        let id = TraitId(self.next_trait_id);
        self.next_trait_id = self
            .next_trait_id
            .checked_add(1)
            .ok_or(StateError::IdOverflow {
                current: self.next_trait_id,
            })?;
        Ok(id)
    }

    /// Places an actor in the world and registers the listeners its traits need.
    pub fn add_actor(&mut self, actor: Actor) -> Result<EntityId, StateError> {
        if self.entities.contains(actor.id) {
            return Err(StateError::DuplicateEntity { id: actor.id });
        }
        if let Some(position) = actor.position {
            if let Some(occupant) = self.entities.occupant(actor.level, position) {
                return Err(StateError::PositionOccupied {
                    position,
                    occupant: occupant.id,
                });
            }
        }
        let id = actor.id;
        for instance in actor.traits.iter() {
            self.events.register_instance(id, instance);
        }
        self.entities.insert(actor);
        Ok(id)
    }

    /// Builds `key` from the catalog and places it at `position` on `level`.
    pub fn spawn(
        &mut self,
        catalog: &Catalog,
        key: &str,
        level: LevelId,
        position: Position,
    ) -> Result<EntityId, StateError> {
        let id = self.allocate_entity_id()?;
        let actor = catalog
            .build_actor(key, id, || self.allocate_item_id())?
            .at(level, position);
        self.add_actor(actor)
    }

    pub fn player(&self) -> Option<&Actor> {
        self.entities.actor(EntityId::PLAYER)
    }

    /// Actor standing at `position` on the active level.
    pub fn occupant(&self, position: Position) -> Option<&Actor> {
        self.entities.occupant(self.world.active_level, position)
    }

    /// Ids of actors on the active level, ascending.
    pub fn active_actor_ids(&self) -> Vec<EntityId> {
        self.entities.ids_on(self.world.active_level)
    }

    /// Replaces the event registry with one derived from every actor's traits.
    pub fn rebuild_events(&mut self) {
        self.events = EventRegistry::rebuild(&self.entities);
    }
}
