use super::ActionResult;
use crate::context::ResolveContext;
use crate::state::{Attribute, Direction, EntityId, Position};
use crate::traits::{self, roll_save, Trait, TraitKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("actor {0} not found")]
    ActorNotFound(EntityId),

    #[error("actor {0} is not on the map")]
    NotPlaced(EntityId),

    #[error("destination {destination} is out of bounds")]
    OutOfBounds { destination: Position },

    #[error("destination {destination} is blocked")]
    Blocked { destination: Position },

    #[error("destination {destination} is occupied")]
    Occupied { destination: Position },
}

/// Checks the step against the map and returns the destination.
pub fn pre_validate(
    ctx: &ResolveContext<'_, '_>,
    actor: EntityId,
    direction: Direction,
) -> Result<Position, MoveError> {
    let origin = ctx
        .state
        .entities
        .actor(actor)
        .ok_or(MoveError::ActorNotFound(actor))?
        .position
        .ok_or(MoveError::NotPlaced(actor))?;
    let destination = origin.step(direction);
    let tile = ctx
        .tile_at(destination)
        .ok_or(MoveError::OutOfBounds { destination })?;
    if !tile.is_passable() {
        return Err(MoveError::Blocked { destination });
    }
    if ctx.occupant(destination).is_some() {
        return Err(MoveError::Occupied { destination });
    }
    Ok(destination)
}

/// One step. A grappled actor first has to break free: a successful Strength
/// save against the grapple removes it and the step goes ahead, a failed one
/// spends the turn.
pub fn step(ctx: &mut ResolveContext<'_, '_>, actor: EntityId, direction: Direction) -> ActionResult {
    let destination = match pre_validate(ctx, actor, direction) {
        Ok(destination) => destination,
        Err(error) => {
            tracing::debug!(target: "delve::engine", %actor, %error, "move rejected");
            return ctx.finish(ActionResult::incomplete().with_message(error.to_string()));
        }
    };

    if !break_free(ctx, actor) {
        return ctx.finish(ActionResult::completed(1.0));
    }

    if let Some(mover) = ctx.state.entities.actor_mut(actor) {
        mover.position = Some(destination);
    }
    ctx.finish(ActionResult::completed(1.0))
}

/// True when nothing holds the actor any more.
fn break_free(ctx: &mut ResolveContext<'_, '_>, actor: EntityId) -> bool {
    let Some(mover) = ctx.state.entities.actor(actor) else {
        return false;
    };
    let Some((hold, dc)) = mover
        .traits
        .find(TraitKind::Grappled)
        .and_then(|entry| match entry.kind {
            Trait::Grappled { dc, .. } => Some((entry.id, dc)),
            _ => None,
        })
    else {
        return true;
    };
    let name = mover.name.clone();
    let escaped = roll_save(&mut ctx.dice, mover, Attribute::Strength, dc).resisted();
    if escaped {
        traits::remove_trait(ctx, actor, hold);
        ctx.say(format!("{name} wrenches free"));
    } else {
        ctx.say(format!("{name} struggles in the grip"));
    }
    escaped
}
