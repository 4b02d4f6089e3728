use crate::combat::{Damage, DamageType};
use crate::config::GameConfig;
use crate::env::{Catalog, GameEnv, Grid, GridMap, SequenceRng, TerrainKind};
use crate::state::{Actor, EntityId, GameState, Item, ItemId, LevelId, Position, WeaponCategory};

pub(crate) const SEED: u64 = 0x5eed;

/// Everything a test world needs besides its state.
pub(crate) struct Sandbox {
    pub map: GridMap,
    pub rng: SequenceRng,
    pub config: GameConfig,
    pub catalog: Catalog,
}

impl Sandbox {
    /// An all-floor level 0 with scripted die faces.
    pub fn open(width: u32, height: u32, faces: impl IntoIterator<Item = u32>) -> Self {
        Self::with_grid(Grid::filled(width, height, TerrainKind::Floor), faces)
    }

    /// Level 0 drawn from ASCII rows (see [`Grid::from_rows`]).
    pub fn from_rows(rows: &[&str], faces: impl IntoIterator<Item = u32>) -> Self {
        Self::with_grid(Grid::from_rows(rows), faces)
    }

    fn with_grid(grid: Grid, faces: impl IntoIterator<Item = u32>) -> Self {
        Self {
            map: GridMap::single(grid),
            rng: SequenceRng::new(faces),
            config: GameConfig::default(),
            catalog: Catalog::new(),
        }
    }

    pub fn state_with(&self, actors: impl IntoIterator<Item = Actor>) -> GameState {
        let mut state = GameState::new(SEED);
        for actor in actors {
            state.add_actor(actor).expect("actor placed");
        }
        state
    }

    pub fn env(&self) -> GameEnv<'_> {
        GameEnv::from_parts(&self.map, &self.rng, &self.config).with_catalog(&self.catalog)
    }
}

/// A 30 HP sword fighter on level 0, hostile to the player.
pub(crate) fn brute(id: u32, position: Position) -> Actor {
    Actor::new(EntityId(id), "brute", 30)
        .with_item(Item::weapon(
            ItemId(100 + id),
            "sword",
            WeaponCategory::Sword,
            vec![Damage::new(1, 6, DamageType::Slashing)],
        ))
        .at(LevelId(0), position)
}

/// The player, 20 HP and empty-handed.
pub(crate) fn hero(position: Position) -> Actor {
    Actor::new(EntityId::PLAYER, "hero", 20).at(LevelId(0), position)
}
