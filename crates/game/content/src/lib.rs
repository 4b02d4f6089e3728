//! Data-driven content for the simulation core.
//!
//! Loaders read RON/TOML data files into the read-only tables the core
//! consumes:
//! - Monster and villager templates (RON)
//! - Item templates (RON)
//! - Per-level encounter tables (TOML)
//! - Level maps (RON)
//! - Game configuration (TOML)
//!
//! Content never appears in game state; the core only sees the resulting
//! [`delve_core::Catalog`], [`delve_core::GridMap`] and [`delve_core::GameConfig`].

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{
    ActorLoader, ConfigLoader, ContentFactory, EncounterLoader, ItemLoader, LoadResult, MapLoader,
};
