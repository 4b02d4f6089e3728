//! What a trait does when one of its subscribed events fires.

use super::apply::{afflict, remove_trait, save_for};
use super::save::roll_save;
use super::Trait;
use crate::combat::{inflict, Damage, DamagePart, DamageType};
use crate::config::GameConfig;
use crate::context::ResolveContext;
use crate::engine::Termination;
use crate::env::TerrainKind;
use crate::events::{EventKind, Listener};
use crate::state::{Attribute, EntityId};

const BURN: Damage = Damage::new(1, 6, DamageType::Fire);

/// Per-round tick of a timed or periodic trait.
pub fn on_end_of_round(
    ctx: &mut ResolveContext<'_, '_>,
    listener: Listener,
) -> Result<(), Termination> {
    let owner = listener.owner;
    let Some((name, kind)) = ctx.state.entities.actor(owner).and_then(|actor| {
        actor
            .traits
            .get(listener.trait_id)
            .map(|entry| (actor.name.clone(), entry.kind.clone()))
    }) else {
        return Ok(());
    };

    match kind {
        Trait::Poisoned { strength, .. } => {
            ctx.say(format!("{name} suffers from poison"));
            inflict(ctx, owner, &[DamagePart::new(strength, DamageType::Poison)], None)?;
        }
        Trait::Paralyzed { .. } => {
            // Each round the victim gets another chance to shake it off.
            if let Some((attribute, dc)) = save_for(&kind) {
                let resisted = match ctx.state.entities.actor(owner) {
                    Some(actor) => roll_save(&mut ctx.dice, actor, attribute, dc).resisted(),
                    None => false,
                };
                if resisted {
                    remove_trait(ctx, owner, listener.trait_id);
                }
            }
        }
        Trait::OnFire { spreads } => burn(ctx, owner, &name, spreads)?,
        Trait::Regeneration { rate } => heal(ctx, owner, rate),
        _ => {}
    }
    Ok(())
}

/// Death watch. A grapple lets go when its grappler dies.
pub fn on_death(
    ctx: &mut ResolveContext<'_, '_>,
    listener: Listener,
    dying: EntityId,
) -> Result<(), Termination> {
    release_if_held_by(ctx, listener, dying);
    Ok(())
}

/// Releases every grapple `grappler` holds, e.g. when it leaves the level.
/// Returns how many let go.
pub fn release_grapples(ctx: &mut ResolveContext<'_, '_>, grappler: EntityId) -> usize {
    let mut released = 0;
    for subscription in ctx.state.events.snapshot(EventKind::Death) {
        if subscription.target == Some(grappler)
            && release_if_held_by(ctx, subscription.listener, grappler)
        {
            released += 1;
        }
    }
    released
}

fn release_if_held_by(ctx: &mut ResolveContext<'_, '_>, listener: Listener, holder: EntityId) -> bool {
    let grappler = ctx
        .state
        .entities
        .actor(listener.owner)
        .and_then(|actor| actor.traits.get(listener.trait_id))
        .and_then(|entry| match entry.kind {
            Trait::Grappled { grappler, .. } => Some(grappler),
            _ => None,
        });
    if grappler != Some(holder) {
        return false;
    }
    remove_trait(ctx, listener.owner, listener.trait_id);
    tracing::debug!(target: "delve::traits", owner = %listener.owner, %holder, "grapple released");
    true
}

fn burn(
    ctx: &mut ResolveContext<'_, '_>,
    owner: EntityId,
    name: &str,
    spreads: bool,
) -> Result<(), Termination> {
    ctx.say(format!("{name} burns"));
    let part = BURN.roll(&mut ctx.dice);
    inflict(ctx, owner, &[part], None)?;
    if !spreads {
        return Ok(());
    }
    let Some(origin) = ctx
        .state
        .entities
        .actor(owner)
        .and_then(|actor| actor.position)
    else {
        return Ok(());
    };

    for position in ctx.adjacent_locations(origin) {
        if ctx.apply_terrain_effect(position, DamageType::Fire) != Some(TerrainKind::Ash) {
            continue;
        }
        if let Some(occupant) = ctx.occupant(position) {
            afflict(
                ctx,
                occupant,
                Trait::OnFire { spreads: false },
                Some(GameConfig::BURN_DURATION),
            )?;
        }
    }
    Ok(())
}

fn heal(ctx: &mut ResolveContext<'_, '_>, owner: EntityId, rate: i32) {
    let Some(actor) = ctx.state.entities.actor_mut(owner) else {
        return;
    };
    if !actor.is_alive() {
        return;
    }
    if let Some(hp) = actor.stats.get_mut(Attribute::Hp) {
        hp.change(rate.max(0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{fire, EventKind};
    use crate::state::{Position, Stat};
    use crate::tests::helpers::{brute, Sandbox};
    use crate::traits::{apply, TraitKind};

    #[test]
    fn regeneration_tops_up_without_exceeding_max() {
        let sandbox = Sandbox::open(5, 5, []);
        let mut troll = brute(2, Position::new(1, 1)).with_trait(Trait::Regeneration { rate: 4 });
        troll.stats.set(Attribute::Hp, Stat::new(28, 30));
        let mut state = sandbox.state_with([troll]);
        let env = sandbox.env();
        let mut ctx = ResolveContext::new(&mut state, &env, EntityId::SYSTEM).expect("context");

        fire(&mut ctx, EventKind::EndOfRound, None).expect("no termination");
        drop(ctx);
        assert_eq!(state.entities.actor(EntityId(2)).map(|a| a.hp()), Some(30));
    }

    #[test]
    fn paralysis_breaks_on_a_successful_save() {
        // Wisdom 10 against DC 11: 15 resists.
        let sandbox = Sandbox::open(5, 5, [15]);
        let mut state = sandbox.state_with([brute(2, Position::new(1, 1))]);
        let env = sandbox.env();
        let mut ctx = ResolveContext::new(&mut state, &env, EntityId::SYSTEM).expect("context");

        apply(&mut ctx, EntityId(2), Trait::Paralyzed { dc: 11 }, Some(5)).expect("alive");
        fire(&mut ctx, EventKind::EndOfRound, None).expect("no termination");
        drop(ctx);

        let actor = state.entities.actor(EntityId(2)).expect("alive");
        assert!(!actor.has(TraitKind::Paralyzed));
        assert!(state.events.is_empty());
    }

    #[test]
    fn spreading_fire_ignites_nearby_grass() {
        // The burning creature rolls 2 on its d6.
        let sandbox = Sandbox::from_rows(&["#####", "#\"..#", "#####"], [2]);
        let mut state = sandbox.state_with([
            brute(2, Position::new(2, 1)),
            brute(3, Position::new(1, 1)),
        ]);
        let env = sandbox.env();
        let mut ctx = ResolveContext::new(&mut state, &env, EntityId::SYSTEM).expect("context");

        apply(&mut ctx, EntityId(2), Trait::OnFire { spreads: true }, Some(3)).expect("alive");
        fire(&mut ctx, EventKind::EndOfRound, None).expect("no termination");
        drop(ctx);

        assert_eq!(state.entities.actor(EntityId(2)).map(|a| a.hp()), Some(28));
        assert!(state
            .entities
            .actor(EntityId(3))
            .is_some_and(|actor| actor.has(TraitKind::OnFire)));
        assert_eq!(
            state.world.overlay(state.world.active_level, Position::new(1, 1)),
            Some(TerrainKind::Ash)
        );
    }
}
