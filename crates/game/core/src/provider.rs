//! Decision providers.
//!
//! The engine asks a provider what an NPC does on its turn. The player's
//! actions come from the application shell, so the driver suspends instead.

use std::fmt;

use crate::action::{Action, ActionKind};
use crate::env::{GameEnv, MovementAdvice};
use crate::state::{Actor, EntityId, GameState};

/// Supplies the next action for an actor.
pub trait ActionProvider: Send + Sync {
    /// `None` means the provider has nothing to say; the engine waits.
    fn provide_action(&self, entity: EntityId, state: &GameState, env: &GameEnv<'_>) -> Option<Action>;
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ProviderKind {
    Player,
    Npc,
}

impl ProviderKind {
    pub fn of(entity: EntityId) -> Self {
        if entity.is_player() {
            ProviderKind::Player
        } else {
            ProviderKind::Npc
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProviderKind::Player => "player",
            ProviderKind::Npc => "npc",
        };
        write!(f, "{}", label)
    }
}

/// Always waits. Useful for tests or as a fallback.
#[derive(Clone, Copy, Debug, Default)]
pub struct WaitProvider;

impl ActionProvider for WaitProvider {
    fn provide_action(&self, entity: EntityId, _state: &GameState, _env: &GameEnv<'_>) -> Option<Action> {
        Some(Action::wait(entity))
    }
}

/// Melee brute: hits an adjacent enemy, otherwise walks at the player.
#[derive(Clone, Copy, Debug, Default)]
pub struct ChaseProvider<A> {
    advice: A,
}

impl<A: MovementAdvice> ChaseProvider<A> {
    pub fn new(advice: A) -> Self {
        Self { advice }
    }

    fn adjacent_enemy(state: &GameState, actor: &Actor) -> Option<EntityId> {
        let position = actor.position?;
        state
            .entities
            .all_actors()
            .filter(|other| other.id != actor.id && other.level == actor.level)
            .filter(|other| !other.is_removed() && other.is_alive())
            .filter(|other| other.position.is_some_and(|p| position.is_adjacent(p)))
            .filter(|other| actor.is_hostile_to(other))
            .map(|other| other.id)
            .min()
    }

    fn approach(&self, state: &GameState, env: &GameEnv<'_>, actor: &Actor) -> Option<ActionKind> {
        if !actor.can_move() {
            return None;
        }
        let player = state.player().filter(|player| actor.is_hostile_to(player))?;
        if player.level != actor.level {
            return None;
        }
        let from = actor.position?;
        let direction = self.advice.step_toward(actor.level, from, player.position?)?;
        let destination = from.step(direction);

        let map = env.map().ok()?;
        let passable = map
            .tile(actor.level, destination)
            .is_some_and(|tile| tile.is_passable());
        let vacant = state.entities.occupant(actor.level, destination).is_none();
        (passable && vacant).then_some(ActionKind::Move(direction))
    }
}

impl<A: MovementAdvice> ActionProvider for ChaseProvider<A> {
    fn provide_action(&self, entity: EntityId, state: &GameState, env: &GameEnv<'_>) -> Option<Action> {
        let actor = state.entities.actor(entity)?;
        let kind = Self::adjacent_enemy(state, actor)
            .map(|target| ActionKind::Melee { target })
            .or_else(|| self.approach(state, env, actor))
            .unwrap_or(ActionKind::Wait);
        tracing::trace!(target: "delve::engine", %entity, %kind, "chase decision");
        Some(Action::new(entity, kind))
    }
}
