pub mod actor;
pub mod common;
pub mod entities;
pub mod item;
pub mod stat;
pub mod turn;
pub mod world;

pub use actor::{Actor, ActorFlags, Disposition};
pub use common::{Direction, EntityId, ItemId, LevelId, Position, TraitId};
pub use entities::EntitiesState;
pub use item::{Inventory, Item, Slot};
pub use stat::{ability_modifier, Attribute, Stat, StatBlock, WeaponCategory};
pub use turn::TurnState;
pub use world::{FloorItem, WorldState};
