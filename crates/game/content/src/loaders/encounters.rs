//! Encounter table loader.
//!
//! One `[[level]]` table per dungeon level names the actor templates that may
//! wander in during the End-of-Round sweep.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::loaders::{LoadResult, read_file};

#[derive(Debug, Deserialize)]
struct EncounterFile {
    #[serde(default)]
    level: Vec<LevelEncounters>,
}

#[derive(Debug, Deserialize)]
struct LevelEncounters {
    depth: u16,
    monsters: Vec<String>,
}

/// Loader for per-level encounter tables from TOML files.
pub struct EncounterLoader;

impl EncounterLoader {
    pub fn load(path: &Path) -> LoadResult<BTreeMap<u16, Vec<String>>> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    /// Repeated depths are merged in file order.
    pub fn parse(content: &str) -> LoadResult<BTreeMap<u16, Vec<String>>> {
        let file: EncounterFile = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse encounter TOML: {}", e))?;

        let mut tables: BTreeMap<u16, Vec<String>> = BTreeMap::new();
        for entry in file.level {
            tables.entry(entry.depth).or_default().extend(entry.monsters);
        }
        Ok(tables)
    }
}
