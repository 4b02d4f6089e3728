//! Deterministic turn-based simulation core of a dungeon crawler.
//!
//! `delve-core` owns the canonical rules: energy-based scheduling, timed
//! traits and their event registry, combat resolution with the death
//! pipeline, and the driver that ties them together. All state mutation flows
//! through [`engine::GameEngine`]; presentation, input and content loading
//! live in other crates and talk to the core through the types re-exported
//! here.
pub mod action;
pub mod combat;
pub mod config;
pub mod context;
pub mod engine;
pub mod env;
pub mod error;
pub mod events;
#[cfg(feature = "serde")]
pub mod persist;
pub mod provider;
pub mod state;
pub mod traits;

#[cfg(test)]
mod tests;

pub use action::{Action, ActionKind, ActionResult, AnimationRequest, MoveError, Spell, VisualCue};
pub use combat::{Damage, DamagePart, DamageType};
pub use config::GameConfig;
pub use context::ResolveContext;
pub use engine::{ExecuteError, GameEngine, StepOutcome, Termination};
pub use env::{
    ActorTemplate, Catalog, DirectAdvice, Env, GameEnv, Grid, GridMap, ItemTemplate, MapDimensions,
    MapOracle, MovementAdvice, OracleError, PcgRng, RngOracle, SequenceRng, TerrainKind,
    TileDescriptor,
};
pub use error::{ErrorSeverity, GameError};
pub use events::{EventKind, EventRegistry, Listener};
#[cfg(feature = "serde")]
pub use persist::{restore, snapshot, Blob, PersistError};
pub use provider::{ActionProvider, ChaseProvider, ProviderKind, WaitProvider};
pub use state::{
    Actor, ActorFlags, Attribute, Direction, Disposition, EntityId, GameState, Item, ItemId,
    LevelId, Position, Stat, StatBlock, TraitId, WeaponCategory,
};
pub use traits::{Trait, TraitKind};
