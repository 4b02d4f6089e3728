//! Event registry: End-of-Round ticks and Death watches.
//!
//! Listeners are lightweight `(owner, trait id)` handles, never references,
//! so a listener whose owner has died is detected by lookup and skipped.
//! The registry is derived from trait subscriptions and can always be
//! rebuilt from the entities alone (see [`EventRegistry::rebuild`]).

mod fire;

pub use fire::fire;

use crate::state::{EntitiesState, EntityId, TraitId};
use crate::traits::TraitInstance;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display)]
pub enum EventKind {
    /// Fired once per full scheduling cycle.
    EndOfRound,
    /// Fired when a specific entity dies, before it leaves the world.
    Death,
}

/// Handle to the trait instance that reacts to an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Listener {
    pub owner: EntityId,
    pub trait_id: TraitId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Subscription {
    pub listener: Listener,
    /// Only events about this entity reach the listener. `None` matches all.
    pub target: Option<EntityId>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventRegistry {
    end_of_round: Vec<Subscription>,
    death: Vec<Subscription>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn list(&self, kind: EventKind) -> &Vec<Subscription> {
        match kind {
            EventKind::EndOfRound => &self.end_of_round,
            EventKind::Death => &self.death,
        }
    }

    fn list_mut(&mut self, kind: EventKind) -> &mut Vec<Subscription> {
        match kind {
            EventKind::EndOfRound => &mut self.end_of_round,
            EventKind::Death => &mut self.death,
        }
    }

    /// Subscribes `listener`. Registering the same subscription twice is a no-op.
    pub fn register(
        &mut self,
        kind: EventKind,
        listener: Listener,
        target: Option<EntityId>,
    ) -> bool {
        let subscription = Subscription { listener, target };
        let list = self.list_mut(kind);
        if list.contains(&subscription) {
            return false;
        }
        list.push(subscription);
        true
    }

    /// Registers every subscription a trait instance needs.
    pub fn register_instance(&mut self, owner: EntityId, instance: &TraitInstance) {
        let listener = Listener {
            owner,
            trait_id: instance.id,
        };
        for (kind, target) in instance.subscriptions() {
            self.register(kind, listener, target);
        }
    }

    /// Removes `listener` from every kind. Returns how many subscriptions went.
    pub fn unregister(&mut self, listener: Listener) -> usize {
        self.remove_where(|sub| sub.listener == listener)
    }

    /// Removes every listener owned by `owner`.
    pub fn unregister_owner(&mut self, owner: EntityId) -> usize {
        self.remove_where(|sub| sub.listener.owner == owner)
    }

    /// Keeps only subscriptions for which `keep` holds.
    pub fn retain(&mut self, mut keep: impl FnMut(&Subscription) -> bool) -> usize {
        self.remove_where(|sub| !keep(sub))
    }

    fn remove_where(&mut self, mut predicate: impl FnMut(&Subscription) -> bool) -> usize {
        let before = self.end_of_round.len() + self.death.len();
        self.end_of_round.retain(|sub| !predicate(sub));
        self.death.retain(|sub| !predicate(sub));
        before - (self.end_of_round.len() + self.death.len())
    }

    /// Copy of the current subscriptions of `kind`, safe to iterate while the
    /// registry itself is mutated.
    pub fn snapshot(&self, kind: EventKind) -> Vec<Subscription> {
        self.list(kind).clone()
    }

    pub fn is_registered(&self, listener: Listener) -> bool {
        self.end_of_round
            .iter()
            .chain(self.death.iter())
            .any(|sub| sub.listener == listener)
    }

    pub fn len(&self, kind: EventKind) -> usize {
        self.list(kind).len()
    }

    pub fn is_empty(&self) -> bool {
        self.end_of_round.is_empty() && self.death.is_empty()
    }

    /// Derives the registry from every actor's trait subscriptions.
    pub fn rebuild(entities: &EntitiesState) -> Self {
        let mut registry = Self::new();
        for actor in entities.all_actors() {
            for instance in actor.traits.iter() {
                registry.register_instance(actor.id, instance);
            }
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listener(owner: u32, trait_id: u32) -> Listener {
        Listener {
            owner: EntityId(owner),
            trait_id: TraitId(trait_id),
        }
    }

    #[test]
    fn unregister_removes_from_every_kind() {
        let mut registry = EventRegistry::new();
        let watch = listener(2, 9);
        assert!(registry.register(EventKind::EndOfRound, watch, None));
        assert!(registry.register(EventKind::Death, watch, Some(EntityId(5))));
        assert!(!registry.register(EventKind::Death, watch, Some(EntityId(5))));
        registry.register(EventKind::EndOfRound, listener(3, 1), None);

        assert_eq!(registry.unregister(watch), 2);
        assert!(!registry.is_registered(watch));
        assert_eq!(registry.len(EventKind::EndOfRound), 1);
        assert_eq!(registry.len(EventKind::Death), 0);
    }

    #[test]
    fn snapshot_is_detached_from_registry() {
        let mut registry = EventRegistry::new();
        registry.register(EventKind::EndOfRound, listener(1, 1), None);
        let snapshot = registry.snapshot(EventKind::EndOfRound);
        registry.unregister_owner(EntityId(1));
        assert_eq!(snapshot.len(), 1);
        assert!(registry.is_empty());
    }
}
