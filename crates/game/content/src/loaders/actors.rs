//! Actor catalog loader.
//!
//! Loads monster, villager and player templates from RON files.

use std::collections::BTreeMap;
use std::path::Path;

use delve_core::ActorTemplate;

use crate::loaders::{LoadResult, read_file};

/// Loader for actor templates from RON files.
pub struct ActorLoader;

impl ActorLoader {
    /// Load actor templates from a RON file.
    ///
    /// RON format: `Vec<(String, ActorTemplate)>`, keyed by template name.
    /// Fields a template leaves out take their defaults.
    pub fn load(path: &Path) -> LoadResult<BTreeMap<String, ActorTemplate>> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<BTreeMap<String, ActorTemplate>> {
        let raw_data: Vec<(String, ActorTemplate)> = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse actor catalog RON: {}", e))?;

        let mut actors = BTreeMap::new();
        for (key, template) in raw_data {
            if template.hp < 1 {
                anyhow::bail!("Actor '{}' must have at least 1 hp", key);
            }
            if actors.insert(key.clone(), template).is_some() {
                anyhow::bail!("Duplicate actor template '{}'", key);
            }
        }
        Ok(actors)
    }
}
