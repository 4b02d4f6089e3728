//! Read-only collaborators of the simulation.
//!
//! Oracles expose static map geometry, randomness and template tables. The
//! [`Env`] aggregate bundles them with the [`GameConfig`] so the engine can
//! reach everything it needs without coupling to concrete implementations.
mod advice;
mod catalog;
mod error;
mod map;
mod rng;

pub use advice::{DirectAdvice, MovementAdvice};
pub use catalog::{ActorTemplate, Catalog, ItemTemplate};
pub use error::OracleError;
pub use map::{Grid, GridMap, MapDimensions, MapOracle, TerrainKind, TileDescriptor, TileFlags};
pub use rng::{compute_seed, Dice, PcgRng, RngOracle, SequenceRng};

use crate::config::GameConfig;

/// Aggregates the oracles required by the driver and the resolvers.
pub struct Env<'a, M, R>
where
    M: MapOracle + ?Sized,
    R: RngOracle + ?Sized,
{
    map: Option<&'a M>,
    rng: Option<&'a R>,
    config: &'a GameConfig,
    catalog: Option<&'a Catalog>,
}

impl<M, R> Clone for Env<'_, M, R>
where
    M: MapOracle + ?Sized,
    R: RngOracle + ?Sized,
{
    fn clone(&self) -> Self {
        *self
    }
}

impl<M, R> Copy for Env<'_, M, R>
where
    M: MapOracle + ?Sized,
    R: RngOracle + ?Sized,
{
}

pub type GameEnv<'a> = Env<'a, dyn MapOracle + 'a, dyn RngOracle + 'a>;

impl<'a, M, R> Env<'a, M, R>
where
    M: MapOracle + ?Sized,
    R: RngOracle + ?Sized,
{
    pub fn new(map: Option<&'a M>, rng: Option<&'a R>, config: &'a GameConfig) -> Self {
        Self {
            map,
            rng,
            config,
            catalog: None,
        }
    }

    pub fn with_all(map: &'a M, rng: &'a R, config: &'a GameConfig) -> Self {
        Self::new(Some(map), Some(rng), config)
    }

    pub fn with_catalog(mut self, catalog: &'a Catalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Returns the MapOracle, or an error if not available.
    pub fn map(&self) -> Result<&'a M, OracleError> {
        self.map.ok_or(OracleError::MapNotAvailable)
    }

    /// Returns the RngOracle, or an error if not available.
    pub fn rng(&self) -> Result<&'a R, OracleError> {
        self.rng.ok_or(OracleError::RngNotAvailable)
    }

    pub fn catalog(&self) -> Result<&'a Catalog, OracleError> {
        self.catalog.ok_or(OracleError::CatalogNotAvailable)
    }

    pub fn config(&self) -> &'a GameConfig {
        self.config
    }
}

impl<'a> GameEnv<'a> {
    /// Type-erases concrete oracles into a [`GameEnv`].
    pub fn from_parts(
        map: &'a dyn MapOracle,
        rng: &'a dyn RngOracle,
        config: &'a GameConfig,
    ) -> Self {
        Env::with_all(map, rng, config)
    }
}
