//! Stats: clamped current/maximum pairs keyed by attribute kind.

use std::collections::BTreeMap;

/// Current/maximum integer pair.
///
/// # Invariants
///
/// - `0 <= curr <= max` after every mutation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stat {
    curr: i32,
    max: i32,
}

impl Stat {
    pub fn new(curr: i32, max: i32) -> Self {
        let max = max.max(0);
        Self {
            curr: curr.clamp(0, max),
            max,
        }
    }

    /// A stat whose current value sits at its maximum.
    pub fn full(max: i32) -> Self {
        Self::new(max, max)
    }

    #[inline]
    pub fn curr(&self) -> i32 {
        self.curr
    }

    #[inline]
    pub fn max(&self) -> i32 {
        self.max
    }

    /// Adds `delta` to the current value, clamped into `0..=max`.
    /// Returns the amount actually applied.
    pub fn change(&mut self, delta: i32) -> i32 {
        let before = self.curr;
        self.curr = before.saturating_add(delta).clamp(0, self.max);
        self.curr - before
    }

    pub fn set_curr(&mut self, value: i32) {
        self.curr = value.clamp(0, self.max);
    }

    /// Sets the maximum; the current value is pulled down if it now exceeds it.
    pub fn set_max(&mut self, value: i32) {
        self.max = value.max(0);
        self.curr = self.curr.min(self.max);
    }

    pub fn is_full(&self) -> bool {
        self.curr >= self.max
    }
}

/// Weapon families. Each keeps its own practice counter on the wielder.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum WeaponCategory {
    #[default]
    Unarmed,
    Sword,
    Axe,
    Mace,
    Polearm,
    Dagger,
    Rapier,
    Bow,
    Crossbow,
    Sling,
    Thrown,
    Spell,
}

impl WeaponCategory {
    /// Categories that use Dexterity instead of Strength for to-hit and damage.
    pub fn is_finesse(self) -> bool {
        matches!(
            self,
            WeaponCategory::Dagger
                | WeaponCategory::Rapier
                | WeaponCategory::Bow
                | WeaponCategory::Crossbow
                | WeaponCategory::Sling
                | WeaponCategory::Thrown
        )
    }

    pub fn is_ranged(self) -> bool {
        matches!(
            self,
            WeaponCategory::Bow
                | WeaponCategory::Crossbow
                | WeaponCategory::Sling
                | WeaponCategory::Thrown
        )
    }
}

/// Kinds of attribute an actor can carry a [`Stat`] for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Attribute {
    Strength,
    Dexterity,
    Constitution,
    Intelligence,
    Wisdom,
    Hp,
    ArmourClass,
    MeleeAttackBonus,
    MissileAttackBonus,
    SpellAttackBonus,
    Stress,
    /// Practice counter for one weapon category.
    Practice(WeaponCategory),
}

impl Attribute {
    /// Value assumed for an ability score the actor does not carry.
    pub const DEFAULT_SCORE: i32 = 10;

    pub fn is_ability(self) -> bool {
        matches!(
            self,
            Attribute::Strength
                | Attribute::Dexterity
                | Attribute::Constitution
                | Attribute::Intelligence
                | Attribute::Wisdom
        )
    }
}

/// Ability modifier for a score: `floor((score - 10) / 2)`.
pub fn ability_modifier(score: i32) -> i32 {
    (score - Attribute::DEFAULT_SCORE).div_euclid(2)
}

/// Per-actor attribute table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatBlock {
    stats: BTreeMap<Attribute, Stat>,
}

impl StatBlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, attribute: Attribute, stat: Stat) -> Self {
        self.stats.insert(attribute, stat);
        self
    }

    pub fn get(&self, attribute: Attribute) -> Option<&Stat> {
        self.stats.get(&attribute)
    }

    pub fn get_mut(&mut self, attribute: Attribute) -> Option<&mut Stat> {
        self.stats.get_mut(&attribute)
    }

    /// Returns the stat for `attribute`, creating it at `Stat::new(0, max)` when absent.
    pub fn entry(&mut self, attribute: Attribute, max: i32) -> &mut Stat {
        self.stats
            .entry(attribute)
            .or_insert_with(|| Stat::new(0, max))
    }

    pub fn set(&mut self, attribute: Attribute, stat: Stat) {
        self.stats.insert(attribute, stat);
    }

    /// Current value, falling back to the default score for missing abilities
    /// and to zero for everything else.
    pub fn curr(&self, attribute: Attribute) -> i32 {
        match self.stats.get(&attribute) {
            Some(stat) => stat.curr(),
            None if attribute.is_ability() => Attribute::DEFAULT_SCORE,
            None => 0,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Attribute, &Stat)> {
        self.stats.iter()
    }
}
