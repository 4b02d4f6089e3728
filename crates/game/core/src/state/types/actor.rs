use super::{
    ability_modifier, Attribute, EntityId, Inventory, Item, LevelId, Position, Stat, StatBlock,
};
use crate::combat::Damage;
use crate::traits::{Trait, TraitKind, TraitSet};

/// Whether an actor is hostile and whose side it fights on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Disposition {
    /// Hostile but not yet roused. Becomes `Active` when damaged.
    Dormant,
    #[default]
    Active,
    Neutral,
    Friendly,
}

impl Disposition {
    fn side(self) -> Option<Side> {
        match self {
            Disposition::Dormant | Disposition::Active => Some(Side::Monsters),
            Disposition::Friendly => Some(Side::Player),
            Disposition::Neutral => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    Player,
    Monsters,
}

bitflags::bitflags! {
    /// Role and lifecycle markers.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ActorFlags: u8 {
        /// Non-combat townsfolk; drops no loot.
        const VILLAGER = 1 << 0;
        /// Killing this actor wins the game.
        const BOSS = 1 << 1;
        /// Pending removal from the scheduler and the world.
        const REMOVE_FROM_QUEUE = 1 << 2;
    }
}

/// A living entity that takes scheduled turns.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Actor {
    pub id: EntityId,
    pub name: String,
    /// Catalog template this actor was built from, if any.
    pub template: Option<String>,
    pub stats: StatBlock,
    pub energy: f64,
    pub recovery: f64,
    pub traits: TraitSet,
    pub inventory: Inventory,
    pub level: LevelId,
    pub position: Option<Position>,
    pub disposition: Disposition,
    /// Natural weapons used when nothing is wielded.
    pub innate_damage: Vec<Damage>,
    pub flags: ActorFlags,
}

impl Actor {
    pub fn new(id: EntityId, name: impl Into<String>, hp: i32) -> Self {
        Self {
            id,
            name: name.into(),
            template: None,
            stats: StatBlock::new().with(Attribute::Hp, Stat::full(hp)),
            energy: 0.0,
            recovery: 1.0,
            traits: TraitSet::new(),
            inventory: Inventory::new(),
            level: LevelId::default(),
            position: None,
            disposition: Disposition::Active,
            innate_damage: Vec::new(),
            flags: ActorFlags::empty(),
        }
    }

    pub fn at(mut self, level: LevelId, position: Position) -> Self {
        self.level = level;
        self.position = Some(position);
        self
    }

    pub fn with_stat(mut self, attribute: Attribute, value: i32) -> Self {
        self.stats.set(attribute, Stat::full(value));
        self
    }

    pub fn with_recovery(mut self, recovery: f64) -> Self {
        self.recovery = recovery;
        self
    }

    pub fn with_disposition(mut self, disposition: Disposition) -> Self {
        self.disposition = disposition;
        self
    }

    pub fn with_item(mut self, item: Item) -> Self {
        self.inventory.items.push(item);
        self
    }

    pub fn with_trait(mut self, kind: Trait) -> Self {
        self.traits.push_permanent(kind);
        self
    }

    pub fn with_innate(mut self, damage: Damage) -> Self {
        self.innate_damage.push(damage);
        self
    }

    pub fn with_flags(mut self, flags: ActorFlags) -> Self {
        self.flags |= flags;
        self
    }

    #[inline]
    pub fn is_player(&self) -> bool {
        self.id.is_player()
    }

    pub fn hp(&self) -> i32 {
        self.stats.curr(Attribute::Hp)
    }

    pub fn is_alive(&self) -> bool {
        self.hp() >= 1
    }

    pub fn is_villager(&self) -> bool {
        self.flags.contains(ActorFlags::VILLAGER)
    }

    pub fn is_boss(&self) -> bool {
        self.flags.contains(ActorFlags::BOSS)
    }

    pub fn is_removed(&self) -> bool {
        self.flags.contains(ActorFlags::REMOVE_FROM_QUEUE)
    }

    pub fn has(&self, kind: TraitKind) -> bool {
        self.traits.has(kind)
    }

    /// Effective value of an attribute: the stored stat plus every active
    /// `StatBuff` carried by the actor or by an equipped item.
    pub fn attribute(&self, attribute: Attribute) -> i32 {
        let buffs = self
            .traits
            .iter()
            .chain(self.inventory.equipped().flat_map(|item| item.traits.iter()))
            .filter_map(|entry| match entry.kind {
                Trait::StatBuff {
                    attribute: buffed,
                    amount,
                } if buffed == attribute => Some(amount),
                _ => None,
            })
            .sum::<i32>();
        self.stats.curr(attribute) + buffs
    }

    pub fn modifier(&self, attribute: Attribute) -> i32 {
        ability_modifier(self.attribute(attribute))
    }

    pub fn wielded(&self) -> Option<&Item> {
        self.inventory.wielded()
    }

    /// Unaware targets take doubled base damage.
    pub fn is_unaware(&self) -> bool {
        self.disposition == Disposition::Dormant || self.has(TraitKind::Asleep)
    }

    /// Whether the actor can take a step of its own accord.
    pub fn can_move(&self) -> bool {
        !self.has(TraitKind::Paralyzed) && !self.has(TraitKind::Grappled) && !self.has(TraitKind::Asleep)
    }

    /// Opposing sides are hostile; neutrals are hostile to nobody.
    /// The player always fights on the player side.
    pub fn is_hostile_to(&self, other: &Actor) -> bool {
        let side = |actor: &Actor| {
            if actor.is_player() {
                Some(Side::Player)
            } else {
                actor.disposition.side()
            }
        };
        match (side(self), side(other)) {
            (Some(a), Some(b)) => a != b,
            _ => false,
        }
    }
}
