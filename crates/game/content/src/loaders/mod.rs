//! One loader per data file.
//!
//! Monster and item templates and maps are RON; the config and the encounter
//! tables are TOML. [`ContentFactory`] resolves them under a data directory
//! and cross-checks the references between them.

pub mod actors;
pub mod config;
pub mod encounters;
pub mod factory;
pub mod item;
pub mod map;

pub use actors::ActorLoader;
pub use config::ConfigLoader;
pub use encounters::EncounterLoader;
pub use factory::ContentFactory;
pub use item::ItemLoader;
pub use map::MapLoader;

use std::path::Path;

use anyhow::Context;

pub type LoadResult<T> = anyhow::Result<T>;

pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}
