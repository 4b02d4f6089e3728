//! Attack modifiers, the averaged attack roll and armour class.

use super::{Damage, DamageType};
use crate::config::GameConfig;
use crate::env::Dice;
use crate::state::{Actor, Attribute, WeaponCategory};
use crate::traits::{Trait, TraitKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum AttackMode {
    Melee,
    Missile,
    Magic,
}

/// Everything about the attacker one attack needs, computed once up front.
#[derive(Clone, Debug, PartialEq)]
pub struct AttackProfile {
    pub mode: AttackMode,
    pub category: WeaponCategory,
    /// Added to the averaged d20.
    pub modifier: i32,
    /// Added to the rolled damage.
    pub damage_bonus: i32,
    pub damage: Vec<Damage>,
    /// Energy cost of the attack.
    pub speed: f64,
}

/// Bare-handed fallback when an actor has neither a weapon nor natural attacks.
const FISTS: Damage = Damage::new(1, 2, DamageType::Bludgeoning);

/// Builds the attack profile of `attacker` for `mode`.
///
/// Spell attacks use `spell_damage` instead of the wielded weapon.
pub fn attack_profile(
    attacker: &Actor,
    mode: AttackMode,
    spell_damage: &[Damage],
    config: &GameConfig,
) -> AttackProfile {
    let weapon = attacker.wielded().filter(|_| mode != AttackMode::Magic);
    let category = match mode {
        AttackMode::Magic => WeaponCategory::Spell,
        _ => weapon.map_or(WeaponCategory::Unarmed, |item| item.category),
    };
    let ability = match mode {
        AttackMode::Magic => Attribute::Intelligence,
        AttackMode::Missile => Attribute::Dexterity,
        AttackMode::Melee if category.is_finesse() => Attribute::Dexterity,
        AttackMode::Melee => Attribute::Strength,
    };
    let bonus_stat = match mode {
        AttackMode::Melee => Attribute::MeleeAttackBonus,
        AttackMode::Missile => Attribute::MissileAttackBonus,
        AttackMode::Magic => Attribute::SpellAttackBonus,
    };

    let ability_mod = attacker.modifier(ability);
    let proficiency = config.proficiency_bonus(attacker.stats.curr(Attribute::Practice(category)));
    let enchantment = weapon.map_or(0, |item| item.enchantment());
    let modifier = ability_mod + proficiency + enchantment + attacker.attribute(bonus_stat)
        - situational_penalty(attacker, config);

    let damage = match (mode, weapon) {
        (AttackMode::Magic, _) => spell_damage.to_vec(),
        (_, Some(item)) if !item.damage.is_empty() => item.damage.clone(),
        _ if !attacker.innate_damage.is_empty() => attacker.innate_damage.clone(),
        _ => vec![FISTS],
    };

    AttackProfile {
        mode,
        category,
        modifier,
        damage_bonus: ability_mod + enchantment,
        damage,
        speed: weapon.map_or(1.0, |item| item.speed),
    }
}

/// Intoxication, nausea and accumulated stress.
pub fn situational_penalty(actor: &Actor, config: &GameConfig) -> i32 {
    let mut penalty = 0;
    for entry in actor.traits.iter() {
        match entry.kind {
            Trait::Intoxicated { level } => penalty += level.max(0) * config.intoxication_penalty,
            Trait::Nauseous => penalty += config.nausea_penalty,
            _ => {}
        }
    }
    if config.stress_divisor > 0 {
        penalty += actor.attribute(Attribute::Stress).max(0) / config.stress_divisor;
    }
    penalty
}

/// Average of two independent d20s, rounded down.
pub fn attack_roll(dice: &mut Dice<'_>) -> i32 {
    let first = dice.d20();
    let second = dice.d20();
    (first + second) / 2
}

/// Base AC (10 when the actor carries none) plus worn armour and buffs.
pub fn armour_class(actor: &Actor) -> i32 {
    let base = if actor.stats.get(Attribute::ArmourClass).is_some() {
        actor.attribute(Attribute::ArmourClass)
    } else {
        10 + actor.attribute(Attribute::ArmourClass)
    };
    let worn: i32 = actor.inventory.equipped().map(|item| item.armour_bonus()).sum();
    let innate: i32 = actor
        .traits
        .iter()
        .filter_map(|entry| match entry.kind {
            Trait::Armour { bonus } => Some(bonus),
            _ => None,
        })
        .sum();
    base + worn + innate
}

/// True when the attacker or its wielded weapon carries the capability.
pub fn has_capability(attacker: &Actor, kind: TraitKind) -> bool {
    attacker.has(kind) || attacker.wielded().is_some_and(|item| item.has(kind))
}

/// First instance of a capability on the attacker or its weapon.
pub fn capability(attacker: &Actor, kind: TraitKind) -> Option<Trait> {
    attacker
        .traits
        .find(kind)
        .or_else(|| attacker.wielded().and_then(|item| item.traits.find(kind)))
        .map(|entry| entry.kind.clone())
}
