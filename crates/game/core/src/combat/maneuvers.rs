//! Secondary maneuvers evaluated after the primary hit resolves.

use super::hit::{capability, has_capability, AttackProfile};
use super::resolve::{strike, Strike};
use crate::config::GameConfig;
use crate::context::ResolveContext;
use crate::engine::Termination;
use crate::state::{Direction, EntityId, Position};
use crate::traits::{self, Trait, TraitKind};

/// Strikes every hostile adjacent to both the attacker and the primary target,
/// reusing the primary attack roll.
pub fn cleave(
    ctx: &mut ResolveContext<'_, '_>,
    attacker: EntityId,
    primary: EntityId,
    primary_at: Position,
    profile: &AttackProfile,
    roll: i32,
) -> Result<usize, Termination> {
    let Some(actor) = ctx.state.entities.actor(attacker) else {
        return Ok(0);
    };
    let Some(origin) = actor.position else {
        return Ok(0);
    };
    let victims: Vec<EntityId> = origin
        .neighbours()
        .into_iter()
        .filter(|p| *p != primary_at && p.is_adjacent(primary_at))
        .filter_map(|p| ctx.state.occupant(p))
        .filter(|other| other.id != primary && actor.is_hostile_to(other))
        .map(|other| other.id)
        .collect();

    let mut struck = 0;
    for victim in victims {
        ctx.say("the swing carries on");
        if let Strike::Hit { .. } = strike(ctx, attacker, victim, profile, roll, true)? {
            struck += 1;
        }
    }
    Ok(struck)
}

/// Strikes whatever stands directly behind the primary target on the attack line.
pub fn impale(
    ctx: &mut ResolveContext<'_, '_>,
    attacker: EntityId,
    origin: Position,
    primary_at: Position,
    profile: &AttackProfile,
    roll: i32,
) -> Result<bool, Termination> {
    let Some(behind) = origin.beyond(primary_at) else {
        return Ok(false);
    };
    let Some(victim) = ctx.occupant(behind) else {
        return Ok(false);
    };
    if victim == attacker {
        return Ok(false);
    }
    ctx.say("the thrust runs through");
    Ok(matches!(
        strike(ctx, attacker, victim, profile, roll, false)?,
        Strike::Hit { .. }
    ))
}

/// Pushes the target one or two tiles away from the attacker.
///
/// Two tiles only when both are free; otherwise one tile if that one is free.
/// Returns the tiles moved.
pub fn knockback(
    ctx: &mut ResolveContext<'_, '_>,
    origin: Position,
    target: EntityId,
) -> i32 {
    let Some(actor) = ctx.state.entities.actor(target) else {
        return 0;
    };
    let Some(start) = actor.position else {
        return 0;
    };
    let name = actor.name.clone();
    let (dx, dy) = origin.heading(start);
    let Some(direction) = Direction::from_delta(dx, dy) else {
        return 0;
    };

    let wanted = ctx.dice.roll(GameConfig::MAX_KNOCKBACK as u32) as i32;
    let first = start.step(direction);
    let second = first.step(direction);
    let distance = if !ctx.is_free(first) {
        0
    } else if wanted >= 2 && ctx.is_free(second) {
        2
    } else {
        1
    };
    if distance == 0 {
        return 0;
    }
    let destination = if distance == 2 { second } else { first };
    if let Some(actor) = ctx.state.entities.actor_mut(target) {
        actor.position = Some(destination);
    }
    ctx.say(format!("{name} is knocked back"));
    distance
}

/// Grapples the target unless it makes a Strength save.
///
/// The Grappled trait watches the grappler's death and releases itself then.
pub fn grapple(
    ctx: &mut ResolveContext<'_, '_>,
    attacker: EntityId,
    target: EntityId,
) -> Result<bool, Termination> {
    let Some(Trait::Grapple { dc }) = ctx
        .state
        .entities
        .actor(attacker)
        .and_then(|actor| capability(actor, TraitKind::Grapple))
    else {
        return Ok(false);
    };
    let already = ctx
        .state
        .entities
        .actor(target)
        .is_none_or(|actor| actor.has(TraitKind::Grappled));
    if already {
        return Ok(false);
    }
    let applied = traits::afflict(
        ctx,
        target,
        Trait::Grappled {
            grappler: attacker,
            dc,
        },
        None,
    )?;
    Ok(applied.landed())
}

/// Runs every maneuver the attacker is capable of, in order.
pub fn follow_up(
    ctx: &mut ResolveContext<'_, '_>,
    attacker: EntityId,
    target: EntityId,
    target_at: Position,
    profile: &AttackProfile,
    roll: i32,
) -> Result<(), Termination> {
    let Some(actor) = ctx.state.entities.actor(attacker) else {
        return Ok(());
    };
    let Some(origin) = actor.position else {
        return Ok(());
    };
    let melee = profile.mode == super::AttackMode::Melee;
    let can_cleave = melee && has_capability(actor, TraitKind::Cleave);
    let can_impale = has_capability(actor, TraitKind::Impale);
    let can_knock = has_capability(actor, TraitKind::Knockback);
    let can_grapple = melee && has_capability(actor, TraitKind::Grapple);

    if can_cleave {
        cleave(ctx, attacker, target, target_at, profile, roll)?;
    }
    if can_impale {
        impale(ctx, attacker, origin, target_at, profile, roll)?;
    }
    if can_knock && is_standing(ctx, target) {
        knockback(ctx, origin, target);
    }
    let in_reach = ctx
        .distance_between(attacker, target)
        .is_some_and(|distance| distance <= GameConfig::MELEE_RANGE);
    if can_grapple && in_reach && is_standing(ctx, target) {
        grapple(ctx, attacker, target)?;
    }
    Ok(())
}

fn is_standing(ctx: &ResolveContext<'_, '_>, id: EntityId) -> bool {
    ctx.state
        .entities
        .actor(id)
        .is_some_and(|actor| !actor.is_removed())
}

#[cfg(test)]
mod tests {
    use crate::action::{self, Action, ActionKind};
    use crate::combat::{resolve_melee, resolve_missile};
    use crate::context::ResolveContext;
    use crate::events::EventKind;
    use crate::state::{Direction, EntityId, GameState, Position};
    use crate::tests::helpers::{brute, Sandbox};
    use crate::traits::{Trait, TraitKind};

    fn hp(state: &GameState, id: u32) -> Option<i32> {
        state.entities.actor(EntityId(id)).map(|actor| actor.hp())
    }

    fn position(state: &GameState, id: u32) -> Option<Position> {
        state.entities.actor(EntityId(id)).and_then(|actor| actor.position)
    }

    #[test]
    fn impale_runs_through_to_whoever_stands_behind() {
        // Shared roll 15 against AC 10; 4 on the target, 2 on the one behind.
        let sandbox = Sandbox::open(6, 5, [15, 15, 4, 2]);
        let mut state = sandbox.state_with([
            brute(1, Position::new(1, 2)).with_trait(Trait::Impale),
            brute(2, Position::new(2, 2)),
            brute(3, Position::new(3, 2)),
        ]);
        let env = sandbox.env();
        let mut ctx = ResolveContext::new(&mut state, &env, EntityId(1)).expect("context");

        let result = resolve_melee(&mut ctx, EntityId(1), EntityId(2)).expect("no termination");
        drop(ctx);

        assert!(result.messages.iter().any(|m| m == "the thrust runs through"));
        assert_eq!(hp(&state, 2), Some(26));
        assert_eq!(hp(&state, 3), Some(28));
    }

    #[test]
    fn impale_follows_a_shallow_firing_line() {
        // From (1,1) through (5,2) the line continues to (6,2), not (6,3).
        let sandbox = Sandbox::open(9, 5, [15, 15, 3, 5]);
        let mut state = sandbox.state_with([
            brute(1, Position::new(1, 1)).with_trait(Trait::Impale),
            brute(2, Position::new(5, 2)),
            brute(3, Position::new(6, 2)),
            brute(4, Position::new(6, 3)),
        ]);
        let env = sandbox.env();
        let mut ctx = ResolveContext::new(&mut state, &env, EntityId(1)).expect("context");

        resolve_missile(&mut ctx, EntityId(1), EntityId(2), None).expect("no termination");
        drop(ctx);

        assert_eq!(hp(&state, 2), Some(27));
        assert_eq!(hp(&state, 3), Some(25));
        assert_eq!(hp(&state, 4), Some(30));
    }

    #[test]
    fn knockback_pushes_two_tiles_when_the_way_is_clear() {
        // Hit, 4 damage, then a 2 on the push die.
        let sandbox = Sandbox::open(7, 5, [15, 15, 4, 2]);
        let mut state = sandbox.state_with([
            brute(1, Position::new(1, 2)).with_trait(Trait::Knockback),
            brute(2, Position::new(2, 2)),
        ]);
        let env = sandbox.env();
        let mut ctx = ResolveContext::new(&mut state, &env, EntityId(1)).expect("context");

        let result = resolve_melee(&mut ctx, EntityId(1), EntityId(2)).expect("no termination");
        drop(ctx);

        assert!(result.messages.iter().any(|m| m == "brute is knocked back"));
        assert_eq!(position(&state, 2), Some(Position::new(4, 2)));
    }

    #[test]
    fn knockback_settles_for_one_tile_when_the_second_is_taken() {
        let sandbox = Sandbox::open(7, 5, [15, 15, 4, 2]);
        let mut state = sandbox.state_with([
            brute(1, Position::new(1, 2)).with_trait(Trait::Knockback),
            brute(2, Position::new(2, 2)),
            brute(3, Position::new(4, 2)),
        ]);
        let env = sandbox.env();
        let mut ctx = ResolveContext::new(&mut state, &env, EntityId(1)).expect("context");

        resolve_melee(&mut ctx, EntityId(1), EntityId(2)).expect("no termination");
        drop(ctx);

        assert_eq!(position(&state, 2), Some(Position::new(3, 2)));
        assert_eq!(position(&state, 3), Some(Position::new(4, 2)));
    }

    #[test]
    fn knockback_into_a_wall_leaves_the_target_in_place() {
        let sandbox = Sandbox::from_rows(&["#####", "#...#", "#####"], [15, 15, 4, 2]);
        let mut state = sandbox.state_with([
            brute(1, Position::new(2, 1)).with_trait(Trait::Knockback),
            brute(2, Position::new(3, 1)),
        ]);
        let env = sandbox.env();
        let mut ctx = ResolveContext::new(&mut state, &env, EntityId(1)).expect("context");

        let result = resolve_melee(&mut ctx, EntityId(1), EntityId(2)).expect("no termination");
        drop(ctx);

        assert!(result.complete);
        assert_eq!(position(&state, 2), Some(Position::new(3, 1)));
        assert_eq!(hp(&state, 2), Some(26));
    }

    #[test]
    fn a_grapple_holds_until_a_strength_save_breaks_it() {
        // Hit for 4; the victim's save of 5 misses DC 14, its escape roll of 14 makes it.
        let sandbox = Sandbox::open(6, 5, [15, 15, 4, 5, 14]);
        let mut state = sandbox.state_with([
            brute(1, Position::new(1, 2)).with_trait(Trait::Grapple { dc: 14 }),
            brute(2, Position::new(2, 2)),
        ]);
        let env = sandbox.env();
        let mut ctx = ResolveContext::new(&mut state, &env, EntityId(1)).expect("context");

        let hit = resolve_melee(&mut ctx, EntityId(1), EntityId(2)).expect("no termination");
        assert!(hit.messages.iter().any(|m| m == "brute is seized"));
        assert!(ctx
            .state
            .entities
            .actor(EntityId(2))
            .is_some_and(|actor| actor.has(TraitKind::Grappled)));
        assert_eq!(ctx.state.events.len(EventKind::Death), 1);

        let escape = action::execute(
            &mut ctx,
            &Action::new(EntityId(2), ActionKind::Move(Direction::East)),
        )
        .expect("no termination");
        drop(ctx);

        assert!(escape.messages.iter().any(|m| m == "brute wrenches free"));
        assert_eq!(position(&state, 2), Some(Position::new(3, 2)));
        assert!(!state
            .entities
            .actor(EntityId(2))
            .is_some_and(|actor| actor.has(TraitKind::Grappled)));
        assert_eq!(state.events.len(EventKind::Death), 0);
    }
}
