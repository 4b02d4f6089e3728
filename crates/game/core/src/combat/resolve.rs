//! Melee, missile and magic resolution.

use super::damage::{inflict, roll_all, DamagePart, DamageType};
use super::hit::{armour_class, attack_profile, attack_roll, capability, AttackMode, AttackProfile};
use super::maneuvers::follow_up;
use super::reactions::{after_hit, gaze_retaliation, negates_hit};
use crate::action::{ActionResult, AnimationRequest, Spell, VisualCue};
use crate::config::GameConfig;
use crate::context::ResolveContext;
use crate::engine::Termination;
use crate::env::TerrainKind;
use crate::state::{Attribute, EntityId, Position, WeaponCategory};
use crate::traits::{self, Trait, TraitKind};

/// Result of rolling one attack against one target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strike {
    /// The target is gone or already dying.
    Invalid,
    Miss,
    /// The roll hit but a dodge or displacement cancelled it.
    Negated,
    Hit { damage: i32 },
}

/// Compares an already-rolled attack against `target`'s armour class and, on
/// a hit, rolls and deals damage.
///
/// Maneuvers pass the primary attack's roll so every victim faces the same
/// number. Reactions are only consulted when `allow_reactions` is set.
pub fn strike(
    ctx: &mut ResolveContext<'_, '_>,
    attacker: EntityId,
    target: EntityId,
    profile: &AttackProfile,
    roll: i32,
    allow_reactions: bool,
) -> Result<Strike, Termination> {
    let Some(defender) = ctx.state.entities.actor(target) else {
        return Ok(Strike::Invalid);
    };
    if defender.is_removed() {
        return Ok(Strike::Invalid);
    }
    let ac = armour_class(defender);
    let unaware = defender.is_unaware();
    let defender_name = defender.name.clone();
    let attacker_name = name_of(ctx, attacker);

    let total = roll + profile.modifier;
    tracing::debug!(
        target: "delve::combat",
        %attacker,
        %target,
        mode = %profile.mode,
        roll,
        total,
        ac,
        "attack roll"
    );
    if total < ac {
        ctx.say(format!("{attacker_name} misses {defender_name}"));
        return Ok(Strike::Miss);
    }
    if allow_reactions && negates_hit(ctx, target) {
        return Ok(Strike::Negated);
    }

    ctx.say(format!("{attacker_name} hits {defender_name}"));
    let parts = damage_parts(ctx, attacker, profile, unaware);
    let report = inflict(ctx, target, &parts, Some(attacker))?;
    Ok(Strike::Hit {
        damage: report.map_or(0, |report| report.raw),
    })
}

/// Base dice, doubled against an unaware target, plus the flat bonus, rage
/// dice and any damage multiplier.
fn damage_parts(
    ctx: &mut ResolveContext<'_, '_>,
    attacker: EntityId,
    profile: &AttackProfile,
    unaware: bool,
) -> Vec<DamagePart> {
    let mut parts = roll_all(&profile.damage, &mut ctx.dice);
    if unaware {
        parts.extend_from_within(..);
    }
    if let Some(first) = parts.first_mut() {
        first.amount += profile.damage_bonus;
    }

    let (rage, multiplier) = ctx
        .state
        .entities
        .actor(attacker)
        .map(|actor| {
            (
                capability(actor, TraitKind::Rage),
                capability(actor, TraitKind::DamageMultiplier),
            )
        })
        .unwrap_or((None, None));
    if let Some(Trait::Rage { extra }) = rage {
        parts.push(extra.roll(&mut ctx.dice));
    }
    if let Some(Trait::DamageMultiplier { percent }) = multiplier {
        for part in &mut parts {
            part.amount = part.amount * percent / 100;
        }
    }
    parts
}

// ============================================================================
// Melee
// ============================================================================

pub fn resolve_melee(
    ctx: &mut ResolveContext<'_, '_>,
    attacker: EntityId,
    target: EntityId,
) -> Result<ActionResult, Termination> {
    let Some((origin, target_at)) = engaged_positions(ctx, attacker, target) else {
        return Ok(ctx.finish(ActionResult::incomplete().with_message("there is nothing to attack")));
    };
    if origin.distance(target_at) > GameConfig::MELEE_RANGE {
        return Ok(ctx.finish(ActionResult::incomplete().with_message("the target is out of reach")));
    }
    let Some(profile) = profile_for(ctx, attacker, AttackMode::Melee, &[]) else {
        return Ok(ctx.finish(ActionResult::incomplete()));
    };

    let roll = attack_roll(&mut ctx.dice);
    let outcome = strike(ctx, attacker, target, &profile, roll, true)?;
    if let Strike::Hit { .. } = outcome {
        follow_up(ctx, attacker, target, target_at, &profile, roll)?;
        if is_standing(ctx, target) {
            after_hit(ctx, attacker, target, AttackMode::Melee)?;
            gaze_retaliation(ctx, attacker, target)?;
        }
    }
    practise(ctx, attacker, profile.category);
    Ok(ctx.finish(ActionResult::completed(profile.speed)))
}

// ============================================================================
// Missile & Magic
// ============================================================================

/// Fires the wielded weapon at `target`. Ranged attacks cannot be dodged.
pub fn resolve_missile(
    ctx: &mut ResolveContext<'_, '_>,
    attacker: EntityId,
    target: EntityId,
    cue: Option<VisualCue>,
) -> Result<ActionResult, Termination> {
    resolve_ranged(ctx, attacker, target, AttackMode::Missile, None, cue)
}

/// Casts `spell` at `target`. On a hit the spell's status is afflicted too.
pub fn resolve_magic(
    ctx: &mut ResolveContext<'_, '_>,
    attacker: EntityId,
    target: EntityId,
    spell: &Spell,
    cue: Option<VisualCue>,
) -> Result<ActionResult, Termination> {
    resolve_ranged(ctx, attacker, target, AttackMode::Magic, Some(spell), cue)
}

fn resolve_ranged(
    ctx: &mut ResolveContext<'_, '_>,
    attacker: EntityId,
    target: EntityId,
    mode: AttackMode,
    spell: Option<&Spell>,
    cue: Option<VisualCue>,
) -> Result<ActionResult, Termination> {
    let Some((origin, target_at)) = engaged_positions(ctx, attacker, target) else {
        return Ok(ctx.finish(ActionResult::incomplete().with_message("there is nothing to aim at")));
    };
    let spell_damage = spell.map_or(&[][..], |spell| spell.damage.as_slice());
    let Some(profile) = profile_for(ctx, attacker, mode, spell_damage) else {
        return Ok(ctx.finish(ActionResult::incomplete()));
    };
    if let Some(spell) = spell {
        let caster = name_of(ctx, attacker);
        ctx.say(format!("{caster} casts {}", spell.name));
    }

    let roll = attack_roll(&mut ctx.dice);
    ctx.animate(AnimationRequest {
        cue: cue.unwrap_or_else(|| default_cue(&profile)),
        from: origin,
        to: target_at,
    });

    let outcome = strike(ctx, attacker, target, &profile, roll, false)?;
    if let Strike::Hit { .. } = outcome {
        follow_up(ctx, attacker, target, target_at, &profile, roll)?;
        if is_standing(ctx, target) {
            after_hit(ctx, attacker, target, mode)?;
            if let Some((effect, duration)) = spell.and_then(|spell| spell.effect.clone()) {
                traits::afflict(ctx, target, effect, Some(duration))?;
            }
            gaze_retaliation(ctx, attacker, target)?;
        }
    }
    scorch(ctx, target_at, &profile)?;
    practise(ctx, attacker, profile.category);
    Ok(ctx.finish(ActionResult::completed(profile.speed)))
}

fn default_cue(profile: &AttackProfile) -> VisualCue {
    match profile.mode {
        AttackMode::Magic => match profile.damage.first().map(|damage| damage.kind) {
            Some(DamageType::Fire) => VisualCue::Fireball,
            Some(DamageType::Cold) => VisualCue::Frost,
            _ => VisualCue::Bolt,
        },
        _ if profile.category == WeaponCategory::Sling => VisualCue::Stone,
        _ => VisualCue::Arrow,
    }
}

/// Elemental side effect on the tile the projectile or spell strikes.
/// Burning terrain sets its occupant alight.
fn scorch(
    ctx: &mut ResolveContext<'_, '_>,
    at: Position,
    profile: &AttackProfile,
) -> Result<(), Termination> {
    let mut kinds: Vec<DamageType> = profile
        .damage
        .iter()
        .map(|damage| damage.kind)
        .filter(|kind| matches!(kind, DamageType::Fire | DamageType::Cold))
        .collect();
    kinds.dedup();

    for kind in kinds {
        if ctx.apply_terrain_effect(at, kind) != Some(TerrainKind::Ash) {
            continue;
        }
        ctx.say("the ground bursts into flame");
        if let Some(occupant) = ctx.occupant(at) {
            traits::afflict(
                ctx,
                occupant,
                Trait::OnFire { spreads: false },
                Some(GameConfig::BURN_DURATION),
            )?;
        }
    }
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

/// Positions of both combatants when they stand on the same level.
fn engaged_positions(
    ctx: &ResolveContext<'_, '_>,
    attacker: EntityId,
    target: EntityId,
) -> Option<(Position, Position)> {
    if attacker == target {
        return None;
    }
    let a = ctx.state.entities.actor(attacker)?;
    let b = ctx.state.entities.actor(target)?;
    if a.is_removed() || b.is_removed() || a.level != b.level {
        return None;
    }
    Some((a.position?, b.position?))
}

fn profile_for(
    ctx: &ResolveContext<'_, '_>,
    attacker: EntityId,
    mode: AttackMode,
    spell_damage: &[super::Damage],
) -> Option<AttackProfile> {
    let actor = ctx.state.entities.actor(attacker)?;
    Some(attack_profile(actor, mode, spell_damage, ctx.config))
}

fn is_standing(ctx: &ResolveContext<'_, '_>, id: EntityId) -> bool {
    ctx.state
        .entities
        .actor(id)
        .is_some_and(|actor| !actor.is_removed())
}

fn name_of(ctx: &ResolveContext<'_, '_>, id: EntityId) -> String {
    ctx.state
        .entities
        .actor(id)
        .map_or_else(|| "something".to_owned(), |actor| actor.name.clone())
}

/// Every attack, hit or miss, trains the category it was made with.
fn practise(ctx: &mut ResolveContext<'_, '_>, attacker: EntityId, category: WeaponCategory) {
    let Some(actor) = ctx.state.entities.actor_mut(attacker) else {
        return;
    };
    let counter = actor.stats.entry(Attribute::Practice(category), 0);
    if counter.is_full() {
        counter.set_max(counter.max().saturating_add(1));
    }
    counter.change(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::Damage;
    use crate::state::{Disposition, Position};
    use crate::tests::helpers::{brute, Sandbox};

    #[test]
    fn a_miss_still_trains_the_weapon() {
        let sandbox = Sandbox::open(7, 5, [2, 2]);
        let mut state = sandbox.state_with([
            brute(1, Position::new(2, 2)),
            brute(2, Position::new(3, 2)).with_stat(Attribute::ArmourClass, 30),
        ]);
        let env = sandbox.env();
        let mut ctx = ResolveContext::new(&mut state, &env, EntityId(1)).expect("context");

        let result = resolve_melee(&mut ctx, EntityId(1), EntityId(2)).expect("no termination");
        assert!(result.complete);
        assert!(result.messages.iter().any(|m| m.contains("misses")));
        drop(ctx);

        let practice = state
            .entities
            .actor(EntityId(1))
            .map(|actor| actor.stats.curr(Attribute::Practice(WeaponCategory::Sword)));
        assert_eq!(practice, Some(1));
        assert_eq!(state.entities.actor(EntityId(2)).map(|a| a.hp()), Some(30));
    }

    #[test]
    fn unaware_targets_take_the_base_roll_twice() {
        // 15 + 15 averaged hits AC 10; the 1d6 roll of 3 is counted twice.
        let sandbox = Sandbox::open(7, 5, [15, 15, 3]);
        let sleeper = brute(2, Position::new(3, 2)).with_disposition(Disposition::Dormant);
        let mut state = sandbox.state_with([brute(1, Position::new(2, 2)), sleeper]);
        let env = sandbox.env();
        let mut ctx = ResolveContext::new(&mut state, &env, EntityId(1)).expect("context");

        resolve_melee(&mut ctx, EntityId(1), EntityId(2)).expect("no termination");
        drop(ctx);

        let sleeper = state.entities.actor(EntityId(2)).expect("alive");
        assert_eq!(sleeper.hp(), 30 - 6);
        assert_eq!(sleeper.disposition, Disposition::Active);
    }

    #[test]
    fn rage_dice_join_the_roll_before_the_multiplier() {
        // (4 + 3 rage) doubled.
        let sandbox = Sandbox::open(7, 5, [15, 15, 4, 3]);
        let berserker = brute(1, Position::new(2, 2))
            .with_trait(Trait::Rage {
                extra: Damage::new(1, 4, DamageType::Slashing),
            })
            .with_trait(Trait::DamageMultiplier { percent: 200 });
        let mut state = sandbox.state_with([berserker, brute(2, Position::new(3, 2))]);
        let env = sandbox.env();
        let mut ctx = ResolveContext::new(&mut state, &env, EntityId(1)).expect("context");

        resolve_melee(&mut ctx, EntityId(1), EntityId(2)).expect("no termination");
        drop(ctx);

        assert_eq!(state.entities.actor(EntityId(2)).map(|a| a.hp()), Some(16));
    }

    #[test]
    fn missiles_cannot_be_dodged_or_displaced() {
        let sandbox = Sandbox::open(9, 5, [15, 15, 4]);
        let evasive = brute(2, Position::new(5, 2))
            .with_trait(Trait::Dodge { chance: 100 })
            .with_trait(Trait::Displacement);
        let mut state = sandbox.state_with([brute(1, Position::new(1, 2)), evasive]);
        let env = sandbox.env();
        let mut ctx = ResolveContext::new(&mut state, &env, EntityId(1)).expect("context");

        let result = resolve_missile(&mut ctx, EntityId(1), EntityId(2), None).expect("no termination");
        drop(ctx);

        assert!(result.complete);
        let target = state.entities.actor(EntityId(2)).expect("alive");
        assert_eq!(target.hp(), 26);
        assert_eq!(target.position, Some(Position::new(5, 2)));
    }

    #[test]
    fn out_of_reach_melee_costs_nothing() {
        let sandbox = Sandbox::open(9, 5, []);
        let mut state = sandbox.state_with([
            brute(1, Position::new(1, 2)),
            brute(2, Position::new(5, 2)),
        ]);
        let env = sandbox.env();
        let mut ctx = ResolveContext::new(&mut state, &env, EntityId(1)).expect("context");

        let result = resolve_melee(&mut ctx, EntityId(1), EntityId(2)).expect("no termination");
        assert!(!result.complete);
        assert_eq!(result.energy_cost, 0.0);
    }

    #[test]
    fn fire_spell_sets_grass_and_its_occupant_alight() {
        let sandbox = Sandbox::from_rows(&["#######", "#..\"..#", "#######"], [18, 18, 4]);
        let mut state = sandbox.state_with([
            brute(1, Position::new(1, 1)).with_stat(Attribute::Intelligence, 14),
            brute(2, Position::new(3, 1)),
        ]);
        let env = sandbox.env();
        let mut ctx = ResolveContext::new(&mut state, &env, EntityId(1)).expect("context");

        let spell = Spell::new("fire bolt", vec![Damage::new(1, 6, DamageType::Fire)]);
        let result = resolve_magic(&mut ctx, EntityId(1), EntityId(2), &spell, None)
            .expect("no termination");
        drop(ctx);

        assert_eq!(result.animations.len(), 1);
        assert_eq!(result.animations[0].cue, VisualCue::Fireball);
        assert_eq!(
            state.world.overlay(state.world.active_level, Position::new(3, 1)),
            Some(TerrainKind::Ash)
        );
        assert!(state
            .entities
            .actor(EntityId(2))
            .is_some_and(|actor| actor.has(TraitKind::OnFire)));
    }
}
