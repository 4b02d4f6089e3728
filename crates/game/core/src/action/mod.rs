//! Actions and their execution.
//!
//! # Module Structure
//!
//! - `types`: `Action`, `ActionKind`, `Spell`, `ActionResult`, presentation requests
//! - `movement`: stepping, with grapple escape
//!
//! [`execute`] routes an action to the movement code or the combat resolver
//! and hands back the accumulated [`ActionResult`].

pub mod movement;
pub mod types;

pub use movement::MoveError;
pub use types::{Action, ActionKind, ActionResult, AnimationRequest, Spell, VisualCue};

use crate::combat::{resolve_magic, resolve_melee, resolve_missile};
use crate::context::ResolveContext;
use crate::engine::Termination;
use crate::state::{ActorFlags, EntityId};
use crate::traits;

/// Resolves `action` for its actor.
///
/// Only a [`Termination`] is an error; anything the actor cannot do comes
/// back as an incomplete result.
pub fn execute(
    ctx: &mut ResolveContext<'_, '_>,
    action: &Action,
) -> Result<ActionResult, Termination> {
    let actor = action.actor;
    tracing::debug!(target: "delve::engine", %actor, kind = %action.kind, "executing action");
    match &action.kind {
        ActionKind::Wait => Ok(ctx.finish(ActionResult::completed(1.0))),
        ActionKind::Move(direction) => Ok(movement::step(ctx, actor, *direction)),
        ActionKind::Melee { target } => resolve_melee(ctx, actor, *target),
        ActionKind::Missile { target, cue } => resolve_missile(ctx, actor, *target, *cue),
        ActionKind::Magic { target, spell, cue } => {
            resolve_magic(ctx, actor, *target, spell, *cue)
        }
        ActionKind::LeaveLevel => Ok(leave_level(ctx, actor)),
    }
}

/// Takes the actor out of the game for good: flagged, dequeued and stripped
/// of its listeners. Whatever it was grappling is let go. Nothing drops and
/// no Death event fires.
pub fn leave_level(ctx: &mut ResolveContext<'_, '_>, actor: EntityId) -> ActionResult {
    let Some(leaver) = ctx.state.entities.actor_mut(actor) else {
        return ctx.finish(ActionResult::incomplete());
    };
    leaver.flags.insert(ActorFlags::REMOVE_FROM_QUEUE);
    let name = leaver.name.clone();

    traits::release_grapples(ctx, actor);

    ctx.state.entities.remove(actor);
    ctx.state.events.unregister_owner(actor);
    ctx.state.turn.dequeue(actor);
    tracing::info!(target: "delve::engine", %actor, "actor left the level");
    ctx.finish(ActionResult::completed(1.0).with_message(format!("{name} leaves the level")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use crate::state::{Direction, Position};
    use crate::tests::helpers::{brute, Sandbox};
    use crate::traits::{self, Trait, TraitKind};

    #[test]
    fn moving_into_a_wall_is_incomplete() {
        let sandbox = Sandbox::from_rows(&["###", "#.#", "###"], []);
        let mut state = sandbox.state_with([brute(1, Position::new(1, 1))]);
        let env = sandbox.env();
        let mut ctx = ResolveContext::new(&mut state, &env, EntityId(1)).expect("context");

        let result = execute(&mut ctx, &Action::new(EntityId(1), ActionKind::Move(Direction::North)))
            .expect("no termination");
        assert!(!result.complete);
        assert!(result.messages[0].contains("blocked"));
    }

    #[test]
    fn failed_escape_spends_the_turn_in_place() {
        // Strength 10 against DC 14: a 6 fails.
        let sandbox = Sandbox::open(5, 5, [6]);
        let mut state = sandbox.state_with([brute(1, Position::new(2, 2)), brute(2, Position::new(1, 2))]);
        let env = sandbox.env();
        let mut ctx = ResolveContext::new(&mut state, &env, EntityId(1)).expect("context");
        traits::apply(
            &mut ctx,
            EntityId(1),
            Trait::Grappled {
                grappler: EntityId(2),
                dc: 14,
            },
            None,
        )
        .expect("alive");

        let result = execute(&mut ctx, &Action::new(EntityId(1), ActionKind::Move(Direction::East)))
            .expect("no termination");
        drop(ctx);

        assert!(result.complete);
        let mover = state.entities.actor(EntityId(1)).expect("alive");
        assert_eq!(mover.position, Some(Position::new(2, 2)));
        assert!(mover.has(TraitKind::Grappled));
    }

    #[test]
    fn leaving_drops_listeners_and_pool_entry() {
        let sandbox = Sandbox::open(5, 5, []);
        let mut state = sandbox.state_with([brute(3, Position::new(2, 2))]);
        state.turn.admit(EntityId(3));
        let env = sandbox.env();
        let mut ctx = ResolveContext::new(&mut state, &env, EntityId(3)).expect("context");
        traits::apply(&mut ctx, EntityId(3), Trait::Nauseous, Some(4)).expect("alive");

        let result = execute(&mut ctx, &Action::new(EntityId(3), ActionKind::LeaveLevel))
            .expect("no termination");
        drop(ctx);

        assert!(result.complete);
        assert!(!state.entities.contains(EntityId(3)));
        assert_eq!(state.events.len(EventKind::EndOfRound), 0);
        assert!(state.turn.pool.is_empty());
    }
}
