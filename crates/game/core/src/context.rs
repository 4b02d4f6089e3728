//! Resolution context shared by traits, events, combat and actions.
//!
//! One [`ResolveContext`] lives for exactly one resolution (an action or an
//! End-of-Round sweep). It owns the roll source for that resolution and
//! accumulates the messages and animation requests handed to presentation.

use arrayvec::ArrayVec;

use crate::action::{ActionResult, AnimationRequest};
use crate::combat::DamageType;
use crate::config::GameConfig;
use crate::env::{Catalog, Dice, GameEnv, MapOracle, OracleError, TerrainKind, TileDescriptor};
use crate::state::{EntityId, GameState, Position};

pub struct ResolveContext<'s, 'e> {
    pub state: &'s mut GameState,
    pub map: &'e dyn MapOracle,
    pub config: &'e GameConfig,
    pub catalog: Option<&'e Catalog>,
    pub dice: Dice<'e>,
    pub messages: Vec<String>,
    pub animations: Vec<AnimationRequest>,
}

impl<'s, 'e> ResolveContext<'s, 'e> {
    /// Opens a context whose rolls are keyed by the state's seed, the current
    /// action nonce and `actor`.
    pub fn new(
        state: &'s mut GameState,
        env: &GameEnv<'e>,
        actor: EntityId,
    ) -> Result<Self, OracleError> {
        let map = env.map()?;
        let rng = env.rng()?;
        let dice = Dice::new(rng, state.game_seed, state.turn.nonce, actor);
        Ok(Self {
            state,
            map,
            config: env.config(),
            catalog: env.catalog().ok(),
            dice,
            messages: Vec::new(),
            animations: Vec::new(),
        })
    }

    pub fn say(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    pub fn animate(&mut self, request: AnimationRequest) {
        self.animations.push(request);
    }

    /// Moves everything accumulated so far in front of `result`'s own output.
    pub fn finish(&mut self, mut result: ActionResult) -> ActionResult {
        let mut messages = std::mem::take(&mut self.messages);
        messages.append(&mut result.messages);
        result.messages = messages;

        let mut animations = std::mem::take(&mut self.animations);
        animations.append(&mut result.animations);
        result.animations = animations;
        result
    }

    // ===== spatial query surface =====

    /// Tile on the active level, with runtime overlays applied.
    pub fn tile_at(&self, position: Position) -> Option<TileDescriptor> {
        let level = self.state.world.active_level;
        let mut tile = self.map.tile(level, position)?;
        if let Some(terrain) = self.state.world.overlay(level, position) {
            tile.terrain = terrain;
        }
        Some(tile)
    }

    /// Living actor standing at `position` on the active level.
    pub fn occupant(&self, position: Position) -> Option<EntityId> {
        self.state.occupant(position).map(|actor| actor.id)
    }

    /// Passable and unoccupied.
    pub fn is_free(&self, position: Position) -> bool {
        self.tile_at(position).is_some_and(|tile| tile.is_passable())
            && self.occupant(position).is_none()
    }

    /// In-bounds neighbours of `position`.
    pub fn adjacent_locations(&self, position: Position) -> ArrayVec<Position, 8> {
        position
            .neighbours()
            .into_iter()
            .filter(|p| self.tile_at(*p).is_some())
            .collect()
    }

    pub fn distance_between(&self, a: EntityId, b: EntityId) -> Option<i32> {
        let a = self.state.entities.actor(a)?.position?;
        let b = self.state.entities.actor(b)?.position?;
        Some(a.distance(b))
    }

    /// Records the terrain change an elemental effect causes at `position`.
    /// Returns the new terrain, or `None` when the tile does not react.
    pub fn apply_terrain_effect(
        &mut self,
        position: Position,
        damage_type: DamageType,
    ) -> Option<TerrainKind> {
        let current = self.tile_at(position)?.terrain;
        let changed = current.react(damage_type)?;
        let level = self.state.world.active_level;
        self.state.world.set_overlay(level, position, changed);
        tracing::debug!(
            target: "delve::combat",
            %position,
            from = %current,
            to = %changed,
            "terrain changed"
        );
        Some(changed)
    }
}
