//! Content factory for building the core's read-only tables from data files.

use std::path::{Path, PathBuf};

use delve_core::{Catalog, GameConfig, GridMap, LevelId};

use crate::loaders::{ActorLoader, ConfigLoader, EncounterLoader, ItemLoader, LoadResult, MapLoader};

/// Content factory that loads all game content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// ├── encounters.toml
/// ├── items.ron
/// ├── actors.ron
/// └── maps/
///     ├── level_0.ron
///     └── level_1.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load game configuration from `config.toml`, or the defaults when the
    /// file is absent.
    pub fn load_config(&self) -> LoadResult<GameConfig> {
        let path = self.data_dir.join("config.toml");
        if !path.exists() {
            tracing::debug!(target: "delve::content", path = %path.display(), "no config file, using defaults");
            return Ok(GameConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load actor, item and encounter tables into one [`Catalog`].
    ///
    /// Every item an actor carries and every monster an encounter table names
    /// must exist in the catalog.
    pub fn load_catalog(&self) -> LoadResult<Catalog> {
        let mut catalog = Catalog::new();
        catalog.items = ItemLoader::load(&self.data_dir.join("items.ron"))?;
        catalog.actors = ActorLoader::load(&self.data_dir.join("actors.ron"))?;

        let encounters = self.data_dir.join("encounters.toml");
        if encounters.exists() {
            catalog.encounters = EncounterLoader::load(&encounters)?;
        }

        for (key, actor) in &catalog.actors {
            if let Some(missing) = actor.items.iter().find(|item| !catalog.items.contains_key(*item)) {
                anyhow::bail!("Actor '{}' carries unknown item '{}'", key, missing);
            }
        }
        for (depth, monsters) in &catalog.encounters {
            if let Some(missing) = monsters.iter().find(|key| !catalog.actors.contains_key(*key)) {
                anyhow::bail!("Encounter table for level {} names unknown actor '{}'", depth, missing);
            }
        }

        tracing::info!(
            target: "delve::content",
            actors = catalog.actors.len(),
            items = catalog.items.len(),
            levels = catalog.encounters.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    /// Load `maps/{name}.ron` as one level.
    pub fn load_level(&self, name: &str) -> LoadResult<delve_core::Grid> {
        let path = self.data_dir.join("maps").join(format!("{}.ron", name));
        MapLoader::load(&path)
    }

    /// Load the named maps as levels 0, 1, ... in order.
    pub fn load_map(&self, levels: &[&str]) -> LoadResult<GridMap> {
        let mut map = GridMap::new();
        for (index, name) in levels.iter().enumerate() {
            let level = u16::try_from(index)
                .map_err(|_| anyhow::anyhow!("Too many levels: {}", levels.len()))?;
            map = map.with_level(LevelId(level), self.load_level(name)?);
        }
        Ok(map)
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
