use std::collections::BTreeMap;

use super::{Actor, EntityId, LevelId, Position};

/// Every actor in the game, keyed by id.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntitiesState {
    actors: BTreeMap<EntityId, Actor>,
}

impl EntitiesState {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, actor: Actor) -> Option<Actor> {
        self.actors.insert(actor.id, actor)
    }

    pub fn remove(&mut self, id: EntityId) -> Option<Actor> {
        self.actors.remove(&id)
    }

    pub fn actor(&self, id: EntityId) -> Option<&Actor> {
        self.actors.get(&id)
    }

    pub fn actor_mut(&mut self, id: EntityId) -> Option<&mut Actor> {
        self.actors.get_mut(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.actors.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    pub fn all_actors(&self) -> impl Iterator<Item = &Actor> {
        self.actors.values()
    }

    pub fn all_actors_mut(&mut self) -> impl Iterator<Item = &mut Actor> {
        self.actors.values_mut()
    }

    /// Ids of actors on `level`, in ascending id order.
    pub fn ids_on(&self, level: LevelId) -> Vec<EntityId> {
        self.actors
            .values()
            .filter(|actor| actor.level == level)
            .map(|actor| actor.id)
            .collect()
    }

    /// The actor standing at `position` on `level`, if any.
    pub fn occupant(&self, level: LevelId, position: Position) -> Option<&Actor> {
        self.actors
            .values()
            .find(|actor| actor.level == level && actor.position == Some(position))
    }
}
