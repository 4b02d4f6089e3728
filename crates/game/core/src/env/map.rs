use std::collections::BTreeMap;

use crate::combat::DamageType;
use crate::state::{LevelId, Position};

/// Static map oracle exposing immutable level geometry.
///
/// Runtime terrain changes never go through the oracle; they are recorded as
/// overlays in [`crate::state::WorldState`].
pub trait MapOracle: Send + Sync {
    fn dimensions(&self, level: LevelId) -> MapDimensions;
    fn tile(&self, level: LevelId, position: Position) -> Option<TileDescriptor>;

    fn contains(&self, level: LevelId, position: Position) -> bool {
        self.dimensions(level).contains(position)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapDimensions {
    pub width: u32,
    pub height: u32,
}

impl MapDimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, position: Position) -> bool {
        position.x >= 0
            && position.y >= 0
            && position.x < self.width as i32
            && position.y < self.height as i32
    }
}

bitflags::bitflags! {
    /// Physical properties derived from a tile's terrain.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct TileFlags: u8 {
        const PASSABLE = 1 << 0;
        const OPAQUE = 1 << 1;
        const FLAMMABLE = 1 << 2;
        const LIQUID = 1 << 3;
    }
}

/// Canonical terrain classes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum TerrainKind {
    #[default]
    Floor,
    Wall,
    Void,
    Water,
    Ice,
    Grass,
    Tree,
    Ash,
    Door,
}

impl TerrainKind {
    pub fn flags(self) -> TileFlags {
        match self {
            TerrainKind::Floor | TerrainKind::Ash | TerrainKind::Ice => TileFlags::PASSABLE,
            TerrainKind::Grass => TileFlags::PASSABLE | TileFlags::FLAMMABLE,
            TerrainKind::Door => TileFlags::PASSABLE | TileFlags::OPAQUE,
            TerrainKind::Tree => TileFlags::OPAQUE | TileFlags::FLAMMABLE,
            TerrainKind::Water => TileFlags::LIQUID,
            TerrainKind::Wall => TileFlags::OPAQUE,
            TerrainKind::Void => TileFlags::empty(),
        }
    }

    /// Terrain that results from an elemental effect striking this terrain.
    pub fn react(self, damage_type: DamageType) -> Option<TerrainKind> {
        match (self, damage_type) {
            (terrain, DamageType::Fire) if terrain.flags().contains(TileFlags::FLAMMABLE) => {
                Some(TerrainKind::Ash)
            }
            (TerrainKind::Ice, DamageType::Fire) => Some(TerrainKind::Water),
            (TerrainKind::Water, DamageType::Cold) => Some(TerrainKind::Ice),
            _ => None,
        }
    }

    fn from_glyph(glyph: char) -> TerrainKind {
        match glyph {
            '#' => TerrainKind::Wall,
            '~' => TerrainKind::Water,
            '_' => TerrainKind::Ice,
            '"' => TerrainKind::Grass,
            'T' => TerrainKind::Tree,
            ',' => TerrainKind::Ash,
            '+' => TerrainKind::Door,
            ' ' => TerrainKind::Void,
            _ => TerrainKind::Floor,
        }
    }
}

/// What the simulation knows about one tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileDescriptor {
    pub terrain: TerrainKind,
    /// Permanently lit (e.g. a torch-lit room).
    pub lit: bool,
}

impl TileDescriptor {
    pub const fn new(terrain: TerrainKind) -> Self {
        Self {
            terrain,
            lit: false,
        }
    }

    pub fn flags(self) -> TileFlags {
        self.terrain.flags()
    }

    pub fn is_passable(self) -> bool {
        self.flags().contains(TileFlags::PASSABLE)
    }

    pub fn is_opaque(self) -> bool {
        self.flags().contains(TileFlags::OPAQUE)
    }

    pub fn is_flammable(self) -> bool {
        self.flags().contains(TileFlags::FLAMMABLE)
    }
}

/// One level's tiles in row-major order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Grid {
    dimensions: MapDimensions,
    tiles: Vec<TileDescriptor>,
}

impl Grid {
    pub fn filled(width: u32, height: u32, terrain: TerrainKind) -> Self {
        Self {
            dimensions: MapDimensions::new(width, height),
            tiles: vec![TileDescriptor::new(terrain); (width * height) as usize],
        }
    }

    /// Builds a grid from ASCII rows (`#` wall, `.` floor, `~` water, `"` grass,
    /// `T` tree, `_` ice, `,` ash, `+` door). Short rows are padded with walls.
    pub fn from_rows(rows: &[&str]) -> Self {
        let height = rows.len() as u32;
        let width = rows.iter().map(|row| row.chars().count()).max().unwrap_or(0) as u32;
        let mut grid = Self::filled(width, height, TerrainKind::Wall);
        for (y, row) in rows.iter().enumerate() {
            for (x, glyph) in row.chars().enumerate() {
                grid.set(
                    Position::new(x as i32, y as i32),
                    TerrainKind::from_glyph(glyph),
                );
            }
        }
        grid
    }

    fn index(&self, position: Position) -> Option<usize> {
        self.dimensions
            .contains(position)
            .then(|| (position.y as u32 * self.dimensions.width + position.x as u32) as usize)
    }

    pub fn set(&mut self, position: Position, terrain: TerrainKind) {
        if let Some(index) = self.index(position) {
            self.tiles[index].terrain = terrain;
        }
    }

    pub fn set_lit(&mut self, position: Position, lit: bool) {
        if let Some(index) = self.index(position) {
            self.tiles[index].lit = lit;
        }
    }

    pub fn get(&self, position: Position) -> Option<TileDescriptor> {
        self.index(position).map(|index| self.tiles[index])
    }
}

/// In-memory map oracle holding one grid per level.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridMap {
    levels: BTreeMap<LevelId, Grid>,
}

impl GridMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// A map with a single level 0.
    pub fn single(grid: Grid) -> Self {
        Self::new().with_level(LevelId(0), grid)
    }

    pub fn with_level(mut self, level: LevelId, grid: Grid) -> Self {
        self.levels.insert(level, grid);
        self
    }

    pub fn level_mut(&mut self, level: LevelId) -> Option<&mut Grid> {
        self.levels.get_mut(&level)
    }
}

impl MapOracle for GridMap {
    fn dimensions(&self, level: LevelId) -> MapDimensions {
        self.levels
            .get(&level)
            .map(|grid| grid.dimensions)
            .unwrap_or_default()
    }

    fn tile(&self, level: LevelId, position: Position) -> Option<TileDescriptor> {
        self.levels.get(&level)?.get(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_parse_into_terrain() {
        let map = GridMap::single(Grid::from_rows(&["#####", "#.\"~#", "#####"]));
        let level = LevelId(0);

        assert_eq!(map.dimensions(level), MapDimensions::new(5, 3));
        assert!(map.tile(level, Position::new(1, 1)).is_some_and(|t| t.is_passable()));
        assert!(map.tile(level, Position::new(2, 1)).is_some_and(|t| t.is_flammable()));
        assert!(map.tile(level, Position::new(0, 0)).is_some_and(|t| t.is_opaque()));
        assert_eq!(map.tile(level, Position::new(9, 9)), None);
        assert_eq!(map.tile(LevelId(3), Position::new(1, 1)), None);
    }

    #[test]
    fn elemental_reactions() {
        assert_eq!(TerrainKind::Grass.react(DamageType::Fire), Some(TerrainKind::Ash));
        assert_eq!(TerrainKind::Tree.react(DamageType::Fire), Some(TerrainKind::Ash));
        assert_eq!(TerrainKind::Water.react(DamageType::Cold), Some(TerrainKind::Ice));
        assert_eq!(TerrainKind::Ice.react(DamageType::Fire), Some(TerrainKind::Water));
        assert_eq!(TerrainKind::Floor.react(DamageType::Fire), None);
        assert_eq!(TerrainKind::Water.react(DamageType::Fire), None);
    }
}
