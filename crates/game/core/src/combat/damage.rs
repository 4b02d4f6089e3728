//! Damage dice, defences and HP loss.

use super::death;
use crate::context::ResolveContext;
use crate::engine::Termination;
use crate::env::Dice;
use crate::state::{Actor, Attribute, Disposition, EntityId};

// ============================================================================
// Damage Type
// ============================================================================

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum DamageType {
    Slashing,
    Piercing,
    Bludgeoning,
    Fire,
    Cold,
    Lightning,
    Acid,
    Poison,
    Arcane,
}

// ============================================================================
// Damage Dice
// ============================================================================

/// `count`d`die` of one damage type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Damage {
    pub count: u32,
    pub die: u32,
    pub kind: DamageType,
}

impl Damage {
    pub const fn new(count: u32, die: u32, kind: DamageType) -> Self {
        Self { count, die, kind }
    }

    pub fn roll(&self, dice: &mut Dice<'_>) -> DamagePart {
        DamagePart {
            amount: dice.roll_many(self.count, self.die),
            kind: self.kind,
        }
    }
}

/// One rolled contribution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DamagePart {
    pub amount: i32,
    pub kind: DamageType,
}

impl DamagePart {
    pub const fn new(amount: i32, kind: DamageType) -> Self {
        Self { amount, kind }
    }
}

pub fn roll_all(damage: &[Damage], dice: &mut Dice<'_>) -> Vec<DamagePart> {
    damage.iter().map(|entry| entry.roll(dice)).collect()
}

// ============================================================================
// Receiving Damage
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DamageReport {
    /// HP left after the hit.
    pub remaining: i32,
    pub message: String,
    /// Damage actually subtracted, after defences.
    pub raw: i32,
}

/// Total after resistance, vulnerability and immunity. Never negative.
pub fn mitigated_total(target: &Actor, parts: &[DamagePart]) -> i32 {
    parts
        .iter()
        .map(|part| part.amount.max(0) * target.traits.damage_scale(part.kind) / 100)
        .sum::<i32>()
        .max(0)
}

/// Subtracts damage from `target` and rouses it if dormant.
///
/// Does not run the death pipeline; see [`inflict`].
pub fn receive_damage(target: &mut Actor, parts: &[DamagePart]) -> DamageReport {
    let total = mitigated_total(target, parts);
    let hp = target.stats.entry(Attribute::Hp, 0);
    hp.change(-total);
    let remaining = hp.curr();
    if target.disposition == Disposition::Dormant {
        target.disposition = Disposition::Active;
    }

    let message = if total > 0 {
        format!("{} takes {} damage", target.name, total)
    } else {
        format!("{} is unharmed", target.name)
    };
    DamageReport {
        remaining,
        message,
        raw: total,
    }
}

/// Applies damage to `target` and, if its HP drops below 1, runs the death
/// pipeline before returning.
///
/// Returns `None` when the target no longer exists.
pub fn inflict(
    ctx: &mut ResolveContext<'_, '_>,
    target: EntityId,
    parts: &[DamagePart],
    source: Option<EntityId>,
) -> Result<Option<DamageReport>, Termination> {
    let Some(actor) = ctx.state.entities.actor_mut(target) else {
        return Ok(None);
    };
    if actor.is_removed() {
        return Ok(None);
    }
    let report = receive_damage(actor, parts);
    tracing::debug!(
        target: "delve::combat",
        %target,
        raw = report.raw,
        remaining = report.remaining,
        "damage received"
    );
    ctx.say(report.message.clone());
    if report.remaining < 1 {
        death::kill(ctx, target, source)?;
    }
    Ok(Some(report))
}
