//! Applying, gating and removing trait instances.

use super::save::roll_save;
use super::{Insertion, Trait, TraitInstance};
use crate::combat::{inflict, DamagePart, DamageType};
use crate::context::ResolveContext;
use crate::engine::Termination;
use crate::events::Listener;
use crate::state::{Actor, Attribute, EntityId, TraitId};

/// Outcome of [`apply`] or [`afflict`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Applied {
    Added(TraitId),
    /// Folded into an instance the target already carried.
    Merged(TraitId),
    /// The target made its save or is immune.
    Resisted,
    /// The target is gone.
    NoEffect,
}

impl Applied {
    pub fn landed(self) -> bool {
        matches!(self, Applied::Added(_) | Applied::Merged(_))
    }
}

/// Save attribute and DC gating a status, if it has one.
pub(super) fn save_for(kind: &Trait) -> Option<(Attribute, i32)> {
    match *kind {
        Trait::Poisoned { dc, .. } => Some((Attribute::Constitution, dc)),
        Trait::Paralyzed { dc } => Some((Attribute::Wisdom, dc)),
        Trait::Grappled { dc, .. } => Some((Attribute::Strength, dc)),
        _ => None,
    }
}

fn is_immune(defender: &Actor, kind: &Trait) -> bool {
    let element = match kind {
        Trait::Poisoned { .. } => DamageType::Poison,
        Trait::OnFire { .. } => DamageType::Fire,
        _ => return false,
    };
    defender.traits.damage_scale(element) == 0
}

/// Immunity check, then the status's saving throw. True when the effect lands.
pub fn is_affected(ctx: &mut ResolveContext<'_, '_>, target: EntityId, kind: &Trait) -> bool {
    let Some(defender) = ctx.state.entities.actor(target) else {
        return false;
    };
    if is_immune(defender, kind) {
        return false;
    }
    match save_for(kind) {
        Some((attribute, dc)) => !roll_save(&mut ctx.dice, defender, attribute, dc).resisted(),
        None => true,
    }
}

/// Attaches `kind` to `target` unconditionally.
///
/// A status the target already carries is merged rather than stacked, and its
/// one-shot effect does not repeat. `duration` is counted in rounds from the
/// current turn; `None` is permanent.
pub fn apply(
    ctx: &mut ResolveContext<'_, '_>,
    target: EntityId,
    kind: Trait,
    duration: Option<u64>,
) -> Result<Applied, Termination> {
    let turn = ctx.state.turn.turn;
    if !ctx
        .state
        .entities
        .actor(target)
        .is_some_and(|actor| !actor.is_removed())
    {
        return Ok(Applied::NoEffect);
    }
    let id = match ctx.state.allocate_trait_id() {
        Ok(id) => id,
        Err(error) => {
            tracing::warn!(target: "delve::traits", %error, "trait ids exhausted");
            return Ok(Applied::NoEffect);
        }
    };
    let Some(actor) = ctx.state.entities.actor_mut(target) else {
        return Ok(Applied::NoEffect);
    };
    let name = actor.name.clone();
    let insertion = actor.traits.insert(TraitInstance {
        id,
        kind: kind.clone(),
        expires_at: duration.map(|rounds| turn.saturating_add(rounds)),
    });
    let stored = actor.traits.get(insertion.id()).cloned();
    if let Some(stored) = stored {
        ctx.state.events.register_instance(target, &stored);
    }

    match insertion {
        Insertion::Merged(existing) => {
            tracing::trace!(target: "delve::traits", %target, kind = %kind.kind(), "status merged");
            Ok(Applied::Merged(existing))
        }
        Insertion::Added(id) => {
            tracing::debug!(target: "delve::traits", %target, kind = %kind.kind(), ?duration, "status applied");
            onset(ctx, target, &name, &kind)?;
            Ok(Applied::Added(id))
        }
    }
}

/// [`is_affected`] followed by [`apply`].
pub fn afflict(
    ctx: &mut ResolveContext<'_, '_>,
    target: EntityId,
    kind: Trait,
    duration: Option<u64>,
) -> Result<Applied, Termination> {
    let Some(name) = ctx.state.entities.actor(target).map(|actor| actor.name.clone()) else {
        return Ok(Applied::NoEffect);
    };
    if !is_affected(ctx, target, &kind) {
        ctx.say(format!("{name} resists"));
        return Ok(Applied::Resisted);
    }
    apply(ctx, target, kind, duration)
}

/// One-shot effect of a newly added status.
fn onset(
    ctx: &mut ResolveContext<'_, '_>,
    target: EntityId,
    name: &str,
    kind: &Trait,
) -> Result<(), Termination> {
    match *kind {
        Trait::Poisoned { strength, .. } => {
            ctx.say(format!("{name} is poisoned"));
            inflict(ctx, target, &[DamagePart::new(strength, DamageType::Poison)], None)?;
        }
        Trait::Paralyzed { .. } => ctx.say(format!("{name} is paralyzed")),
        Trait::Grappled { .. } => ctx.say(format!("{name} is seized")),
        Trait::OnFire { .. } => ctx.say(format!("{name} catches fire")),
        Trait::Asleep => ctx.say(format!("{name} falls asleep")),
        Trait::Nauseous => ctx.say(format!("{name} feels sick")),
        Trait::Intoxicated { .. } => ctx.say(format!("{name} staggers")),
        Trait::Rage { .. } => ctx.say(format!("{name} flies into a rage")),
        _ => {}
    }
    Ok(())
}

/// Detaches a trait from `owner` and drops every listener it registered.
pub fn remove_trait(
    ctx: &mut ResolveContext<'_, '_>,
    owner: EntityId,
    id: TraitId,
) -> Option<TraitInstance> {
    let actor = ctx.state.entities.actor_mut(owner)?;
    let removed = actor.traits.remove(id)?;
    let name = actor.name.clone();
    ctx.state.events.unregister(Listener { owner, trait_id: id });
    tracing::trace!(target: "delve::traits", %owner, kind = %removed.kind.kind(), "trait removed");

    let message = match removed.kind {
        Trait::Poisoned { .. } => Some(format!("{name} is no longer poisoned")),
        Trait::Paralyzed { .. } => Some(format!("{name} can move again")),
        Trait::Grappled { .. } => Some(format!("{name} is no longer held")),
        Trait::OnFire { .. } => Some(format!("{name} stops burning")),
        Trait::Asleep => Some(format!("{name} wakes up")),
        Trait::Nauseous => Some(format!("{name} feels better")),
        Trait::Intoxicated { .. } => Some(format!("{name} sobers up")),
        Trait::Rage { .. } => Some(format!("{name} calms down")),
        Trait::StatBuff { .. } => Some(format!("{name} feels normal again")),
        _ => None,
    };
    if let Some(message) = message {
        ctx.say(message);
    }
    Some(removed)
}
