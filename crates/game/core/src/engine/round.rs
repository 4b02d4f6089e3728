//! End-of-Round sweep.
//!
//! Runs once per full scheduling cycle: advances the turn, fires End-of-Round
//! listeners, then applies the periodic world rules (natural regeneration,
//! encounter spawns, illumination) and recomputes the player's view.

use std::collections::BTreeSet;

use super::ExecuteError;
use crate::context::ResolveContext;
use crate::env::GameEnv;
use crate::events::{self, EventKind};
use crate::state::{Attribute, EntityId, GameState, Position};
use crate::traits::Trait;

/// Messages produced by one sweep.
pub(super) fn end_of_round(
    state: &mut GameState,
    env: &GameEnv<'_>,
) -> Result<Vec<String>, ExecuteError> {
    state.turn.turn += 1;
    let turn = state.turn.turn;
    tracing::info!(target: "delve::scheduler", turn, "end of round");

    let mut ctx = ResolveContext::new(state, env, EntityId::SYSTEM)?;
    events::fire(&mut ctx, EventKind::EndOfRound, None)?;
    natural_regeneration(&mut ctx, turn);
    spawn_encounter(&mut ctx, turn);
    illuminate(&mut ctx);
    update_view(&mut ctx);
    let messages = std::mem::take(&mut ctx.messages);
    drop(ctx);

    state.turn.nonce += 1;
    Ok(messages)
}

fn natural_regeneration(ctx: &mut ResolveContext<'_, '_>, turn: u64) {
    let interval = ctx.config.regen_interval;
    if interval == 0 || turn % interval != 0 {
        return;
    }
    for id in ctx.state.active_actor_ids() {
        if let Some(hp) = ctx
            .state
            .entities
            .actor_mut(id)
            .filter(|actor| actor.is_alive() && !actor.is_removed())
            .and_then(|actor| actor.stats.get_mut(Attribute::Hp))
        {
            hp.change(1);
        }
    }
}

/// Rolls for a wandering monster from the level's encounter table, placed on
/// a free tile the player cannot see.
fn spawn_encounter(ctx: &mut ResolveContext<'_, '_>, turn: u64) {
    let interval = ctx.config.encounter_interval;
    if interval == 0 || turn % interval != 0 {
        return;
    }
    let Some(catalog) = ctx.catalog else {
        return;
    };
    let level = ctx.state.world.active_level;
    let table = catalog.encounter_table(level.0);
    if table.is_empty() || !ctx.dice.chance(ctx.config.encounter_chance) {
        return;
    }
    let Some(key) = ctx.dice.pick(table.len()).map(|index| table[index].clone()) else {
        return;
    };

    let dimensions = ctx.map.dimensions(level);
    let candidates: Vec<Position> = (0..dimensions.height as i32)
        .flat_map(|y| (0..dimensions.width as i32).map(move |x| Position::new(x, y)))
        .filter(|p| ctx.is_free(*p) && !ctx.state.world.visible.contains(p))
        .collect();
    let Some(spot) = ctx.dice.pick(candidates.len()).map(|index| candidates[index]) else {
        return;
    };

    match ctx.state.spawn(catalog, &key, level, spot) {
        Ok(id) => tracing::info!(target: "delve::scheduler", %id, %key, position = %spot, "encounter spawned"),
        Err(error) => tracing::warn!(target: "delve::scheduler", %error, %key, "encounter spawn failed"),
    }
}

/// Recomputes lit tiles from every light source carried on the active level.
fn illuminate(ctx: &mut ResolveContext<'_, '_>) {
    let level = ctx.state.world.active_level;
    let sources: Vec<(Position, i32)> = ctx
        .state
        .entities
        .all_actors()
        .filter(|actor| actor.level == level && !actor.is_removed())
        .filter_map(|actor| {
            let origin = actor.position?;
            let radius = actor
                .traits
                .iter()
                .chain(actor.inventory.equipped().flat_map(|item| item.traits.iter()))
                .filter_map(|entry| match entry.kind {
                    Trait::LightSource { radius, .. } => Some(radius),
                    _ => None,
                })
                .max()?;
            Some((origin, radius))
        })
        .collect();

    let mut lit = BTreeSet::new();
    for (origin, radius) in sources {
        lit.extend(visible_from(ctx, origin, radius));
    }
    ctx.state.world.lit = lit;
}

fn update_view(ctx: &mut ResolveContext<'_, '_>) {
    let Some(origin) = ctx.state.player().and_then(|player| player.position) else {
        ctx.state.world.visible.clear();
        return;
    };
    let radius = ctx.config.sight_radius;
    ctx.state.world.visible = visible_from(ctx, origin, radius);
}

/// In-bounds tiles within `radius` whose line from `origin` is not blocked by
/// an opaque tile. The blocking tile itself is visible.
fn visible_from(ctx: &ResolveContext<'_, '_>, origin: Position, radius: i32) -> BTreeSet<Position> {
    let mut seen = BTreeSet::new();
    if radius < 0 {
        return seen;
    }
    for y in origin.y - radius..=origin.y + radius {
        for x in origin.x - radius..=origin.x + radius {
            let target = Position::new(x, y);
            if ctx.tile_at(target).is_none() {
                continue;
            }
            let blocked = origin
                .line_to(target)
                .into_iter()
                .skip(1)
                .take_while(|p| *p != target)
                .any(|p| ctx.tile_at(p).is_none_or(|tile| tile.is_opaque()));
            if !blocked {
                seen.insert(target);
            }
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Stat;
    use crate::tests::helpers::{brute, Sandbox};
    use crate::traits::LightColour;

    #[test]
    fn walls_block_the_view() {
        let sandbox = Sandbox::from_rows(&["#######", "#..#..#", "#######"], []);
        let mut state = sandbox.state_with([brute(0, Position::new(1, 1))]);
        let env = sandbox.env();
        end_of_round(&mut state, &env).expect("sweep");

        assert!(state.world.visible.contains(&Position::new(2, 1)));
        assert!(state.world.visible.contains(&Position::new(3, 1)));
        assert!(!state.world.visible.contains(&Position::new(4, 1)));
        assert_eq!(state.turn.turn, 1);
    }

    #[test]
    fn light_sources_light_their_surroundings() {
        let sandbox = Sandbox::open(9, 9, []);
        let torchbearer = brute(4, Position::new(4, 4)).with_trait(Trait::LightSource {
            radius: 1,
            colour: LightColour::Yellow,
        });
        let mut state = sandbox.state_with([torchbearer]);
        let env = sandbox.env();
        end_of_round(&mut state, &env).expect("sweep");

        assert_eq!(state.world.lit.len(), 9);
        assert!(state.world.lit.contains(&Position::new(5, 5)));
        assert!(!state.world.lit.contains(&Position::new(6, 4)));
    }

    #[test]
    fn natural_regeneration_follows_the_interval() {
        let sandbox = Sandbox::open(5, 5, []);
        let mut hurt = brute(2, Position::new(2, 2));
        hurt.stats.set(Attribute::Hp, Stat::new(20, 30));
        let mut state = sandbox.state_with([hurt]);
        state.turn.turn = sandbox.config.regen_interval - 1;
        let env = sandbox.env();

        end_of_round(&mut state, &env).expect("sweep");
        assert_eq!(state.entities.actor(EntityId(2)).map(|a| a.hp()), Some(21));
        end_of_round(&mut state, &env).expect("sweep");
        assert_eq!(state.entities.actor(EntityId(2)).map(|a| a.hp()), Some(21));
    }
}
