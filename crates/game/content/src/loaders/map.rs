//! Map data loader.
//!
//! Loads static terrain for one level from a RON file. Runtime changes
//! (scorched grass, frozen water) live in the game state as overlays.

use std::path::Path;

use delve_core::{Grid, Position, TerrainKind};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Map data structure for RON files (terrain only).
///
/// Either ASCII `rows` or bare `dimensions` (all floor), then explicit
/// `tiles` overrides on top.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct MapDataRon {
    rows: Vec<String>,
    dimensions: Option<(u32, u32)>,
    tiles: Vec<(i32, i32, TerrainKind)>, // (x, y, terrain)
}

/// Loader for map data from RON files.
pub struct MapLoader;

impl MapLoader {
    pub fn load(path: &Path) -> LoadResult<Grid> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<Grid> {
        let data: MapDataRon = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse map RON: {}", e))?;

        let mut grid = match (data.rows.is_empty(), data.dimensions) {
            (false, None) => {
                let rows: Vec<&str> = data.rows.iter().map(String::as_str).collect();
                Grid::from_rows(&rows)
            }
            (true, Some((width, height))) => Grid::filled(width, height, TerrainKind::Floor),
            (false, Some(_)) => anyhow::bail!("Map gives both rows and dimensions"),
            (true, None) => anyhow::bail!("Map needs either rows or dimensions"),
        };

        for (x, y, terrain) in data.tiles {
            let position = Position::new(x, y);
            if grid.get(position).is_none() {
                anyhow::bail!("Tile override {} is outside the map", position);
            }
            grid.set(position, terrain);
        }
        Ok(grid)
    }
}
