//! Item catalog loader.

use std::collections::BTreeMap;
use std::path::Path;

use delve_core::ItemTemplate;
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Item catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemCatalog {
    pub items: BTreeMap<String, ItemTemplate>,
}

/// Loader for item templates from RON files.
pub struct ItemLoader;

impl ItemLoader {
    /// Load item templates from a RON file containing an [`ItemCatalog`].
    pub fn load(path: &Path) -> LoadResult<BTreeMap<String, ItemTemplate>> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<BTreeMap<String, ItemTemplate>> {
        let catalog: ItemCatalog = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse item catalog RON: {}", e))?;

        for (key, item) in &catalog.items {
            if item.speed <= 0.0 {
                anyhow::bail!("Item '{}' has non-positive speed {}", key, item.speed);
            }
        }
        Ok(catalog.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use delve_core::{Trait, WeaponCategory};

    #[test]
    fn weapons_keep_their_capabilities() {
        let items = ItemLoader::parse(
            r#"(items: {
                "spear": (
                    name: "spear",
                    category: Polearm,
                    slot: Some(Weapon),
                    damage: [(count: 1, die: 8, kind: Piercing)],
                    metal: true,
                    traits: [Impale],
                ),
                "torch": (name: "torch", slot: Some(Shield)),
            })"#,
        )
        .expect("parses");

        let spear = &items["spear"];
        assert_eq!(spear.category, WeaponCategory::Polearm);
        assert_eq!(spear.traits, vec![Trait::Impale]);
        assert_eq!(items["torch"].speed, 1.0);
    }

    #[test]
    fn zero_speed_is_rejected() {
        let error = ItemLoader::parse(r#"(items: { "anvil": (name: "anvil", speed: 0.0) })"#)
            .expect_err("bad speed");
        assert!(error.to_string().contains("anvil"));
    }
}
