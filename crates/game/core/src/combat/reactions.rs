//! Target-side reactions: hit negation before damage, and the status and
//! environmental triggers that follow a landed hit.

use super::damage::{inflict, DamagePart};
use super::hit::{capability, AttackMode};
use crate::config::GameConfig;
use crate::context::ResolveContext;
use crate::engine::Termination;
use crate::state::{EntityId, Position};
use crate::traits::{self, Trait, TraitKind};

/// Checks dodge, then displacement. True when the hit is negated.
///
/// A dodge needs a target that can move and a free tile next to it; the
/// target steps onto that tile.
pub fn negates_hit(ctx: &mut ResolveContext<'_, '_>, target: EntityId) -> bool {
    let Some(actor) = ctx.state.entities.actor(target) else {
        return false;
    };
    let name = actor.name.clone();
    let dodge = match actor.traits.find(TraitKind::Dodge).map(|entry| &entry.kind) {
        Some(Trait::Dodge { chance }) if actor.can_move() => Some(*chance),
        _ => None,
    };
    let displacement = actor.has(TraitKind::Displacement);
    let origin = actor.position;

    if let (Some(chance), Some(origin)) = (dodge, origin) {
        let free: Vec<Position> = ctx
            .adjacent_locations(origin)
            .into_iter()
            .filter(|p| ctx.is_free(*p))
            .collect();
        if !free.is_empty() && ctx.dice.chance(chance) {
            let index = ctx.dice.pick(free.len()).unwrap_or(0);
            let destination = free[index];
            if let Some(actor) = ctx.state.entities.actor_mut(target) {
                actor.position = Some(destination);
            }
            ctx.say(format!("{name} dodges the blow"));
            return true;
        }
    }

    if displacement && ctx.dice.chance(ctx.config.displacement_chance) {
        ctx.say(format!("the attack passes through {name}'s displaced image"));
        return true;
    }
    false
}

/// Triggers that follow a landed hit against a target that is still alive.
pub fn after_hit(
    ctx: &mut ResolveContext<'_, '_>,
    attacker: EntityId,
    target: EntityId,
    mode: AttackMode,
) -> Result<(), Termination> {
    deliver_poison(ctx, attacker, target)?;
    if mode == AttackMode::Melee {
        corrode(ctx, attacker, target);
    }
    acid_splash(ctx, target)?;
    Ok(())
}

/// Poisoner capability or a poison coating on the wielded weapon.
fn deliver_poison(
    ctx: &mut ResolveContext<'_, '_>,
    attacker: EntityId,
    target: EntityId,
) -> Result<(), Termination> {
    let Some(actor) = ctx.state.entities.actor(attacker) else {
        return Ok(());
    };
    let coating = actor
        .wielded()
        .and_then(|item| item.traits.find(TraitKind::PoisonCoated))
        .map(|entry| entry.kind.clone());
    let source = capability(actor, TraitKind::Poisoner);

    if let Some(Trait::Poisoner {
        dc,
        strength,
        duration,
    }) = source
    {
        traits::afflict(ctx, target, Trait::Poisoned { dc, strength }, Some(duration))?;
    }

    if let Some(Trait::PoisonCoated {
        dc,
        strength,
        duration,
    }) = coating
    {
        traits::afflict(ctx, target, Trait::Poisoned { dc, strength }, Some(duration))?;
        if ctx.dice.chance(ctx.config.coating_consume_chance) {
            if let Some(weapon) = ctx
                .state
                .entities
                .actor_mut(attacker)
                .and_then(|actor| actor.inventory.wielded_mut())
            {
                weapon.traits.remove_kind(TraitKind::PoisonCoated);
                let message = format!("the poison on the {} is used up", weapon.name);
                ctx.say(message);
            }
        }
    }
    Ok(())
}

/// Corrosive attackers eat away one random equipped metal item of the target.
fn corrode(ctx: &mut ResolveContext<'_, '_>, attacker: EntityId, target: EntityId) {
    let corrosive = ctx
        .state
        .entities
        .actor(attacker)
        .is_some_and(|actor| super::hit::has_capability(actor, TraitKind::Corrosive));
    if !corrosive {
        return;
    }
    let metal: Vec<usize> = match ctx.state.entities.actor(target) {
        Some(actor) => actor
            .inventory
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.equipped && item.metal)
            .map(|(index, _)| index)
            .collect(),
        None => return,
    };
    let Some(pick) = ctx.dice.pick(metal.len()) else {
        return;
    };
    let Some(item) = ctx
        .state
        .entities
        .actor_mut(target)
        .and_then(|actor| actor.inventory.items.get_mut(metal[pick]))
    else {
        return;
    };

    let armour = item.traits.iter().find_map(|entry| match entry.kind {
        Trait::Armour { .. } => Some(entry.id),
        _ => None,
    });
    let degraded = match armour {
        Some(id) => match item.traits.get_mut(id).map(|entry| &mut entry.kind) {
            Some(Trait::Armour { bonus }) => {
                *bonus -= 1;
                true
            }
            _ => false,
        },
        None => {
            let enchant = item.traits.iter().find_map(|entry| match entry.kind {
                Trait::WeaponBonus { .. } => Some(entry.id),
                _ => None,
            });
            match enchant.and_then(|id| item.traits.get_mut(id)).map(|entry| &mut entry.kind) {
                Some(Trait::WeaponBonus { amount }) => *amount -= 1,
                _ => item.traits.push_permanent(Trait::WeaponBonus { amount: -1 }),
            }
            true
        }
    };
    if degraded {
        let message = format!("the {} corrodes", item.name);
        ctx.say(message);
    }
}

/// Targets carrying acid splash spray every occupant around them.
fn acid_splash(ctx: &mut ResolveContext<'_, '_>, target: EntityId) -> Result<(), Termination> {
    let Some(actor) = ctx.state.entities.actor(target) else {
        return Ok(());
    };
    let (Some(Trait::AcidSplash { damage }), Some(origin)) = (
        actor.traits.find(TraitKind::AcidSplash).map(|e| e.kind.clone()),
        actor.position,
    ) else {
        return Ok(());
    };
    let victims: Vec<EntityId> = origin
        .neighbours()
        .into_iter()
        .filter_map(|p| ctx.occupant(p))
        .collect();
    if victims.is_empty() {
        return Ok(());
    }
    ctx.say("acid sprays everywhere");
    for victim in victims {
        let part: DamagePart = damage.roll(&mut ctx.dice);
        inflict(ctx, victim, &[part], Some(target))?;
    }
    Ok(())
}

/// Paralyzing gaze retaliation against an attacker within reach.
///
/// Only called once a hit has landed and the watcher is still standing.
pub fn gaze_retaliation(
    ctx: &mut ResolveContext<'_, '_>,
    attacker: EntityId,
    target: EntityId,
) -> Result<(), Termination> {
    let Some(watcher) = ctx.state.entities.actor(target) else {
        return Ok(());
    };
    let Some(Trait::ParalyzingGaze { dc, duration }) = watcher
        .traits
        .find(TraitKind::ParalyzingGaze)
        .map(|entry| entry.kind.clone())
    else {
        return Ok(());
    };
    let within_reach = ctx
        .distance_between(attacker, target)
        .is_some_and(|distance| distance <= GameConfig::MELEE_RANGE);
    if !within_reach {
        return Ok(());
    }
    traits::afflict(ctx, attacker, Trait::Paralyzed { dc }, Some(duration))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::combat::{resolve_melee, Damage, DamageType};
    use crate::context::ResolveContext;
    use crate::state::{Actor, EntityId, GameState, Item, ItemId, LevelId, Position, Slot, WeaponCategory};
    use crate::tests::helpers::{brute, Sandbox};
    use crate::traits::{Trait, TraitKind};

    fn hp(state: &GameState, id: u32) -> Option<i32> {
        state.entities.actor(EntityId(id)).map(|actor| actor.hp())
    }

    fn carries(state: &GameState, id: u32, kind: TraitKind) -> bool {
        state.entities.actor(EntityId(id)).is_some_and(|actor| actor.has(kind))
    }

    #[test]
    fn a_dodge_steps_aside_onto_a_free_tile() {
        // Hit, then 10 against a 50% dodge; first free neighbour is north.
        let sandbox = Sandbox::open(5, 5, [15, 15, 10, 1]);
        let mut state = sandbox.state_with([
            brute(1, Position::new(1, 2)),
            brute(2, Position::new(2, 2)).with_trait(Trait::Dodge { chance: 50 }),
        ]);
        let env = sandbox.env();
        let mut ctx = ResolveContext::new(&mut state, &env, EntityId(1)).expect("context");

        let result = resolve_melee(&mut ctx, EntityId(1), EntityId(2)).expect("no termination");
        drop(ctx);

        assert!(result.messages.iter().any(|m| m == "brute dodges the blow"));
        assert_eq!(hp(&state, 2), Some(30));
        assert_eq!(
            state.entities.actor(EntityId(2)).and_then(|a| a.position),
            Some(Position::new(2, 1))
        );
    }

    #[test]
    fn displacement_turns_aside_a_third_of_hits() {
        let sandbox = Sandbox::open(5, 5, [15, 15, 33, 15, 15, 34, 4]);
        let mut state = sandbox.state_with([
            brute(1, Position::new(1, 2)),
            brute(2, Position::new(2, 2)).with_trait(Trait::Displacement),
        ]);
        let env = sandbox.env();
        let mut ctx = ResolveContext::new(&mut state, &env, EntityId(1)).expect("context");

        let first = resolve_melee(&mut ctx, EntityId(1), EntityId(2)).expect("no termination");
        assert!(first
            .messages
            .iter()
            .any(|m| m == "the attack passes through brute's displaced image"));
        let second = resolve_melee(&mut ctx, EntityId(1), EntityId(2)).expect("no termination");
        assert!(second.messages.iter().any(|m| m == "brute hits brute"));
        drop(ctx);

        assert_eq!(hp(&state, 2), Some(26));
    }

    #[test]
    fn a_poison_coating_wears_off_after_use() {
        // Hit for 4, Con save 5 fails DC 12 (2 onset damage), then 50 uses up the coating.
        let sandbox = Sandbox::open(5, 5, [15, 15, 4, 5, 50]);
        let dagger = Item::weapon(
            ItemId(101),
            "dagger",
            WeaponCategory::Dagger,
            vec![Damage::new(1, 4, DamageType::Piercing)],
        )
        .with_trait(Trait::PoisonCoated {
            dc: 12,
            strength: 2,
            duration: 3,
        });
        let assassin = Actor::new(EntityId(1), "assassin", 20)
            .with_item(dagger)
            .at(LevelId(0), Position::new(1, 2));
        let mut state = sandbox.state_with([assassin, brute(2, Position::new(2, 2))]);
        let env = sandbox.env();
        let mut ctx = ResolveContext::new(&mut state, &env, EntityId(1)).expect("context");

        let result = resolve_melee(&mut ctx, EntityId(1), EntityId(2)).expect("no termination");
        drop(ctx);

        assert!(result.messages.iter().any(|m| m == "the poison on the dagger is used up"));
        assert_eq!(hp(&state, 2), Some(24));
        assert!(carries(&state, 2, TraitKind::Poisoned));
        let coated = state
            .entities
            .actor(EntityId(1))
            .and_then(|actor| actor.wielded())
            .is_some_and(|weapon| weapon.has(TraitKind::PoisonCoated));
        assert!(!coated);
    }

    #[test]
    fn corrosion_eats_into_worn_armour() {
        // Sword is metal item 0, mail item 1; the pick of 2 lands on the mail.
        let sandbox = Sandbox::open(5, 5, [15, 15, 4, 2]);
        let mut mail = Item::new(ItemId(200), "mail").with_trait(Trait::Armour { bonus: 3 });
        mail.slot = Some(Slot::Body);
        mail.equipped = true;
        mail.metal = true;
        let mut state = sandbox.state_with([
            brute(1, Position::new(1, 2)).with_trait(Trait::Corrosive),
            brute(2, Position::new(2, 2)).with_item(mail),
        ]);
        let env = sandbox.env();
        let mut ctx = ResolveContext::new(&mut state, &env, EntityId(1)).expect("context");

        let result = resolve_melee(&mut ctx, EntityId(1), EntityId(2)).expect("no termination");
        drop(ctx);

        assert!(result.messages.iter().any(|m| m == "the mail corrodes"));
        let bonus = state
            .entities
            .actor(EntityId(2))
            .and_then(|actor| actor.inventory.items.get(1))
            .map(|item| item.armour_bonus());
        assert_eq!(bonus, Some(2));
        assert_eq!(hp(&state, 2), Some(26));
    }

    #[test]
    fn a_gaze_answers_hits_but_not_misses() {
        let sandbox = Sandbox::open(5, 5, [2, 2, 15, 15, 4, 3]);
        let mut state = sandbox.state_with([
            brute(1, Position::new(1, 2)),
            brute(2, Position::new(2, 2)).with_trait(Trait::ParalyzingGaze { dc: 15, duration: 2 }),
        ]);
        let env = sandbox.env();
        let mut ctx = ResolveContext::new(&mut state, &env, EntityId(1)).expect("context");

        let missed = resolve_melee(&mut ctx, EntityId(1), EntityId(2)).expect("no termination");
        assert!(missed.messages.iter().any(|m| m == "brute misses brute"));
        assert!(!ctx
            .state
            .entities
            .actor(EntityId(1))
            .is_some_and(|actor| actor.has(TraitKind::Paralyzed)));

        // Wisdom save of 3 against DC 15.
        let landed = resolve_melee(&mut ctx, EntityId(1), EntityId(2)).expect("no termination");
        drop(ctx);

        assert!(landed.messages.iter().any(|m| m == "brute is paralyzed"));
        assert!(carries(&state, 1, TraitKind::Paralyzed));
    }

    #[test]
    fn acid_splashes_every_neighbour_including_the_attacker() {
        // Neighbours go clockwise from north: the bystander south, then the attacker west.
        let sandbox = Sandbox::open(5, 5, [15, 15, 4, 3, 2]);
        let mut state = sandbox.state_with([
            brute(1, Position::new(1, 2)),
            brute(2, Position::new(2, 2)).with_trait(Trait::AcidSplash {
                damage: Damage::new(1, 4, DamageType::Acid),
            }),
            brute(3, Position::new(2, 3)),
        ]);
        let env = sandbox.env();
        let mut ctx = ResolveContext::new(&mut state, &env, EntityId(1)).expect("context");

        let result = resolve_melee(&mut ctx, EntityId(1), EntityId(2)).expect("no termination");
        drop(ctx);

        assert!(result.messages.iter().any(|m| m == "acid sprays everywhere"));
        assert_eq!(hp(&state, 2), Some(26));
        assert_eq!(hp(&state, 3), Some(27));
        assert_eq!(hp(&state, 1), Some(28));
    }
}
