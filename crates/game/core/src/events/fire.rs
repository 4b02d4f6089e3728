use super::{EventKind, Listener};
use crate::context::ResolveContext;
use crate::engine::Termination;
use crate::state::EntityId;
use crate::traits;

/// Fires `kind` against a snapshot of its subscriptions.
///
/// Each listener is re-validated right before it runs: its owner must still
/// exist and still carry the trait, because an earlier listener in the same
/// pass may have killed the owner or consumed the trait. End-of-Round only
/// reaches owners on the active level. Death only reaches listeners whose
/// target filter names `subject`.
///
/// After the pass, stale subscriptions are dropped and, for End-of-Round,
/// every trait on the active level whose expiry turn has arrived is removed.
pub fn fire(
    ctx: &mut ResolveContext<'_, '_>,
    kind: EventKind,
    subject: Option<EntityId>,
) -> Result<(), Termination> {
    let snapshot = ctx.state.events.snapshot(kind);
    let turn = ctx.state.turn.turn;
    let active_level = ctx.state.world.active_level;
    tracing::trace!(
        target: "delve::events",
        %kind,
        listeners = snapshot.len(),
        turn,
        "firing event"
    );

    for subscription in snapshot {
        let listener = subscription.listener;
        if kind == EventKind::Death && subscription.target != subject {
            continue;
        }

        let Some(owner) = ctx.state.entities.actor(listener.owner) else {
            tracing::warn!(
                target: "delve::events",
                owner = %listener.owner,
                "skipping listener whose owner is gone"
            );
            continue;
        };
        let Some(instance) = owner.traits.get(listener.trait_id) else {
            tracing::trace!(
                target: "delve::events",
                owner = %listener.owner,
                "skipping listener whose trait is gone"
            );
            continue;
        };

        match kind {
            EventKind::EndOfRound => {
                if owner.level != active_level || instance.is_expired(turn) {
                    continue;
                }
                traits::on_end_of_round(ctx, listener)?;
            }
            EventKind::Death => {
                if let Some(dying) = subject {
                    traits::on_death(ctx, listener, dying)?;
                }
            }
        }
    }

    if kind == EventKind::EndOfRound {
        reap_expired(ctx);
    }
    prune_stale(ctx);
    Ok(())
}

/// Removes traits whose last active turn has passed, together with their listeners.
fn reap_expired(ctx: &mut ResolveContext<'_, '_>) {
    let turn = ctx.state.turn.turn;
    let mut expiring: Vec<Listener> = Vec::new();
    for id in ctx.state.active_actor_ids() {
        if let Some(actor) = ctx.state.entities.actor(id) {
            expiring.extend(actor.traits.expiring_by(turn).into_iter().map(|trait_id| {
                Listener {
                    owner: id,
                    trait_id,
                }
            }));
        }
    }
    for listener in expiring {
        traits::remove_trait(ctx, listener.owner, listener.trait_id);
    }
}

fn prune_stale(ctx: &mut ResolveContext<'_, '_>) {
    let state = &mut *ctx.state;
    let entities = &state.entities;
    let dropped = state.events.retain(|subscription| {
        entities
            .actor(subscription.listener.owner)
            .is_some_and(|actor| actor.traits.contains(subscription.listener.trait_id))
    });
    if dropped > 0 {
        tracing::debug!(target: "delve::events", dropped, "pruned stale listeners");
    }
}
