//! Death pipeline.
//!
//! Runs synchronously the moment an actor's HP drops below 1. The Death event
//! fires while the victim is still in the world, so watchers can read its
//! final state; only then is it removed.

use super::damage::inflict;
use crate::context::ResolveContext;
use crate::engine::Termination;
use crate::events::{self, EventKind};
use crate::state::{Actor, ActorFlags, Attribute, EntityId, LevelId, Position};
use crate::traits::{Trait, TraitKind};

/// Kills `victim`. Calling it again for the same victim does nothing.
///
/// The player's death aborts the resolution with
/// [`Termination::PlayerDefeated`] before any bookkeeping; a boss's death
/// finishes the bookkeeping and then ends the game with
/// [`Termination::Victory`].
pub fn kill(
    ctx: &mut ResolveContext<'_, '_>,
    victim: EntityId,
    killer: Option<EntityId>,
) -> Result<(), Termination> {
    let killer_name = killer
        .and_then(|id| ctx.state.entities.actor(id))
        .map(|actor| actor.name.clone());
    let Some(actor) = ctx.state.entities.actor_mut(victim) else {
        tracing::warn!(target: "delve::death", %victim, "ignoring death of an unknown actor");
        return Ok(());
    };
    if actor.is_removed() {
        return Ok(());
    }
    let name = actor.name.clone();

    if actor.is_player() {
        let message = match killer_name {
            Some(killer) => format!("{name} was killed by {killer}"),
            None => format!("{name} died"),
        };
        tracing::info!(target: "delve::death", %message, "player defeated");
        return Err(Termination::PlayerDefeated { message });
    }

    actor.flags.insert(ActorFlags::REMOVE_FROM_QUEUE);
    let boss = actor.is_boss();
    tracing::info!(target: "delve::death", %victim, ?killer, "actor died");
    ctx.say(format!("{name} dies"));

    events::fire(ctx, EventKind::Death, Some(victim))?;

    let Some(mut corpse) = ctx.state.entities.remove(victim) else {
        return Ok(());
    };
    ctx.state.events.unregister_owner(victim);
    ctx.state.turn.dequeue(victim);

    let original = corpse
        .traits
        .remove_kind(TraitKind::Polymorphed)
        .into_iter()
        .find_map(|entry| match entry.kind {
            Trait::Polymorphed { original } => Some(original),
            _ => None,
        });

    if let Some(position) = corpse.position {
        if !corpse.is_villager() && original.is_none() {
            drop_loot(ctx, &mut corpse, position);
        }
        retribution(ctx, &corpse, position)?;
        if let Some(original) = original {
            revert(ctx, *original, corpse.level, position);
        }
    }

    if boss {
        let message = match killer_name {
            Some(killer) => format!("{killer} has slain {name}"),
            None => format!("{name} has fallen"),
        };
        tracing::info!(target: "delve::death", %message, "victory");
        return Err(Termination::Victory { message });
    }
    Ok(())
}

fn drop_loot(ctx: &mut ResolveContext<'_, '_>, corpse: &mut Actor, position: Position) {
    let (items, gold) = corpse.inventory.take_all();
    if items.is_empty() && gold == 0 {
        return;
    }
    let level = corpse.level;
    let count = items.len();
    for mut item in items {
        item.equipped = false;
        ctx.state.world.drop_item(level, position, item);
    }
    ctx.state.world.drop_gold(level, position, gold);
    tracing::debug!(target: "delve::death", count, gold, %position, "loot dropped");
    ctx.say(format!("{} drops its belongings", corpse.name));
}

/// Area damage around the corpse. Each bystander rolls separately.
fn retribution(
    ctx: &mut ResolveContext<'_, '_>,
    corpse: &Actor,
    position: Position,
) -> Result<(), Termination> {
    let Some(Trait::Retribution { damage, radius }) = corpse
        .traits
        .find(TraitKind::Retribution)
        .map(|entry| entry.kind.clone())
    else {
        return Ok(());
    };
    let bystanders: Vec<EntityId> = ctx
        .state
        .entities
        .all_actors()
        .filter(|actor| actor.level == corpse.level && !actor.is_removed())
        .filter(|actor| actor.position.is_some_and(|p| p.distance(position) <= radius))
        .map(|actor| actor.id)
        .collect();

    ctx.say(format!("{} explodes", corpse.name));
    for bystander in bystanders {
        let part = damage.roll(&mut ctx.dice);
        inflict(ctx, bystander, &[part], Some(corpse.id))?;
    }
    Ok(())
}

/// Puts the creature's true form back where the transformed body fell.
fn revert(ctx: &mut ResolveContext<'_, '_>, mut original: Actor, level: LevelId, at: Position) {
    let shape = original.name.clone();
    original.level = level;
    original.position = Some(at);
    original.energy = 0.0;
    original.flags.remove(ActorFlags::REMOVE_FROM_QUEUE);
    if !original.is_alive() {
        original.stats.entry(Attribute::Hp, 1).set_curr(1);
    }
    match ctx.state.add_actor(original) {
        Ok(id) => {
            tracing::debug!(target: "delve::death", %id, "polymorph reverted");
            ctx.say(format!("the body twists back into {shape}"));
        }
        Err(error) => {
            tracing::warn!(target: "delve::death", %error, "polymorph reversion failed");
        }
    }
}
