//! Trait/effect model.
//!
//! A [`Trait`] is a closed sum type with one case per effect kind. Traits are
//! owned by exactly one entity (an actor or an item) through its [`TraitSet`].
//! *Timed* traits carry an expiry turn and subscribe to End-of-Round; *latent*
//! traits are capabilities that combat resolution queries by [`TraitKind`].
//!
//! Application goes through [`afflict`] (save gate + apply) or [`apply`]
//! (unconditional). Both register the listeners the trait needs with the
//! event registry.

mod apply;
mod handlers;
mod save;

pub use apply::{afflict, apply, is_affected, remove_trait, Applied};
pub use handlers::{on_death, on_end_of_round, release_grapples};
pub use save::{roll_save, saving_throw, SaveOutcome};

use arrayvec::ArrayVec;

use crate::combat::{Damage, DamageType};
use crate::events::EventKind;
use crate::state::{Actor, Attribute, EntityId, TraitId};

/// Colour of emitted light. Only used for presentation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum LightColour {
    #[default]
    White,
    Yellow,
    Red,
    Blue,
    Green,
}

/// Every effect or capability an entity can carry.
#[derive(Clone, Debug, PartialEq, strum::EnumDiscriminants)]
#[strum_discriminants(name(TraitKind))]
#[strum_discriminants(derive(Hash, PartialOrd, Ord, strum::Display))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Trait {
    // ===== timed statuses =====
    StatBuff { attribute: Attribute, amount: i32 },
    Poisoned { dc: i32, strength: i32 },
    Paralyzed { dc: i32 },
    Grappled { grappler: EntityId, dc: i32 },
    OnFire { spreads: bool },
    Intoxicated { level: i32 },
    Nauseous,
    Asleep,
    /// Extra damage dice added to every hit while active.
    Rage { extra: Damage },

    // ===== periodic / ambient =====
    Regeneration { rate: i32 },
    LightSource { radius: i32, colour: LightColour },

    // ===== item enchantments =====
    WeaponBonus { amount: i32 },
    Armour { bonus: i32 },
    /// A single-use coating; may be consumed after delivering.
    PoisonCoated { dc: i32, strength: i32, duration: u64 },

    // ===== latent capabilities =====
    Cleave,
    Impale,
    Knockback,
    Grapple { dc: i32 },
    Poisoner { dc: i32, strength: i32, duration: u64 },
    Corrosive,
    ParalyzingGaze { dc: i32, duration: u64 },
    AcidSplash { damage: Damage },
    Dodge { chance: u32 },
    Displacement,
    DamageMultiplier { percent: i32 },
    Resistance { kind: DamageType },
    Vulnerability { kind: DamageType },
    Immunity { kind: DamageType },
    Retribution { damage: Damage, radius: i32 },
    /// The carrier is a transformed creature; `original` is restored on death.
    Polymorphed { original: Box<Actor> },
}

impl Trait {
    pub fn kind(&self) -> TraitKind {
        TraitKind::from(self)
    }

    /// True when both traits occupy the same non-stacking slot.
    ///
    /// Parameterised buffs and defences key on their parameter, everything else
    /// on its variant alone.
    pub fn same_slot(&self, other: &Trait) -> bool {
        match (self, other) {
            (Trait::StatBuff { attribute: a, .. }, Trait::StatBuff { attribute: b, .. }) => a == b,
            (Trait::Resistance { kind: a }, Trait::Resistance { kind: b })
            | (Trait::Vulnerability { kind: a }, Trait::Vulnerability { kind: b })
            | (Trait::Immunity { kind: a }, Trait::Immunity { kind: b }) => a == b,
            _ => self.kind() == other.kind(),
        }
    }

    /// Folds a repeated application into the existing instance.
    fn merge(&mut self, incoming: &Trait) {
        match (self, incoming) {
            (
                Trait::Poisoned { dc, strength },
                Trait::Poisoned {
                    dc: new_dc,
                    strength: new_strength,
                },
            ) => {
                *dc = (*dc).max(*new_dc);
                *strength = (*strength).max(*new_strength);
            }
            (Trait::Paralyzed { dc }, Trait::Paralyzed { dc: new_dc }) => {
                *dc = (*dc).max(*new_dc);
            }
            (Trait::StatBuff { amount, .. }, Trait::StatBuff { amount: new, .. }) => {
                if new.abs() > amount.abs() {
                    *amount = *new;
                }
            }
            (Trait::Intoxicated { level }, Trait::Intoxicated { level: new }) => {
                *level = (*level).max(*new);
            }
            // The first grappler keeps hold.
            (Trait::Grappled { dc, .. }, Trait::Grappled { dc: new_dc, .. }) => {
                *dc = (*dc).max(*new_dc);
            }
            _ => {}
        }
    }

    /// Statuses that act every round regardless of whether they have an expiry.
    fn ticks(&self) -> bool {
        matches!(
            self,
            Trait::Poisoned { .. }
                | Trait::Paralyzed { .. }
                | Trait::OnFire { .. }
                | Trait::Regeneration { .. }
        )
    }
}

/// One trait owned by an entity.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TraitInstance {
    pub id: TraitId,
    pub kind: Trait,
    /// Last turn on which the trait acts. `None` is permanent.
    pub expires_at: Option<u64>,
}

impl TraitInstance {
    pub fn is_expired(&self, turn: u64) -> bool {
        self.expires_at.is_some_and(|expiry| expiry < turn)
    }

    /// Event subscriptions this instance needs: `(kind, target filter)`.
    pub fn subscriptions(&self) -> ArrayVec<(EventKind, Option<EntityId>), 2> {
        let mut subs = ArrayVec::new();
        if self.expires_at.is_some() || self.kind.ticks() {
            subs.push((EventKind::EndOfRound, None));
        }
        if let Trait::Grappled { grappler, .. } = self.kind {
            subs.push((EventKind::Death, Some(grappler)));
        }
        subs
    }
}

/// Outcome of [`TraitSet::insert`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Insertion {
    Added(TraitId),
    /// An instance in the same slot absorbed the new one.
    Merged(TraitId),
}

impl Insertion {
    pub fn id(self) -> TraitId {
        match self {
            Insertion::Added(id) | Insertion::Merged(id) => id,
        }
    }
}

/// Ordered collection of trait instances owned by a single entity.
///
/// # Invariants
///
/// - At most one instance per slot (see [`Trait::same_slot`]).
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TraitSet {
    entries: Vec<TraitInstance>,
}

impl TraitSet {
    const LOCAL_ID_FLOOR: u32 = u32::MAX / 2;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TraitInstance> {
        self.entries.iter()
    }

    /// Inserts `instance`, merging into an existing instance of the same slot.
    ///
    /// A merge keeps the later expiry (permanent wins) and the stronger
    /// parameters; it never creates a second instance.
    pub fn insert(&mut self, instance: TraitInstance) -> Insertion {
        if let Some(existing) = self
            .entries
            .iter_mut()
            .find(|entry| entry.kind.same_slot(&instance.kind))
        {
            existing.kind.merge(&instance.kind);
            existing.expires_at = match (existing.expires_at, instance.expires_at) {
                (Some(a), Some(b)) => Some(a.max(b)),
                _ => None,
            };
            return Insertion::Merged(existing.id);
        }
        let id = instance.id;
        self.entries.push(instance);
        Insertion::Added(id)
    }

    /// Adds a permanent trait without a world-allocated id.
    ///
    /// Used for template-built capabilities that never subscribe to events.
    /// Local ids count down from `u32::MAX`, away from allocated ones.
    pub fn push_permanent(&mut self, kind: Trait) {
        let lowest_local = self
            .entries
            .iter()
            .map(|entry| entry.id.0)
            .filter(|id| *id >= Self::LOCAL_ID_FLOOR)
            .min();
        let id = TraitId(lowest_local.map_or(u32::MAX, |lowest| lowest - 1));
        self.insert(TraitInstance {
            id,
            kind,
            expires_at: None,
        });
    }

    pub fn get(&self, id: TraitId) -> Option<&TraitInstance> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn get_mut(&mut self, id: TraitId) -> Option<&mut TraitInstance> {
        self.entries.iter_mut().find(|entry| entry.id == id)
    }

    pub fn contains(&self, id: TraitId) -> bool {
        self.get(id).is_some()
    }

    pub fn remove(&mut self, id: TraitId) -> Option<TraitInstance> {
        let index = self.entries.iter().position(|entry| entry.id == id)?;
        Some(self.entries.remove(index))
    }

    pub fn remove_kind(&mut self, kind: TraitKind) -> Vec<TraitInstance> {
        let (removed, kept) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|entry| entry.kind.kind() == kind);
        self.entries = kept;
        removed
    }

    pub fn has(&self, kind: TraitKind) -> bool {
        self.find(kind).is_some()
    }

    pub fn find(&self, kind: TraitKind) -> Option<&TraitInstance> {
        self.entries.iter().find(|entry| entry.kind.kind() == kind)
    }

    /// Ids of instances whose expiry turn lies at or before `turn`.
    pub fn expiring_by(&self, turn: u64) -> Vec<TraitId> {
        self.entries
            .iter()
            .filter(|entry| entry.expires_at.is_some_and(|expiry| expiry <= turn))
            .map(|entry| entry.id)
            .collect()
    }

    /// Resistance multiplier in percent for one damage type.
    pub fn damage_scale(&self, damage_type: DamageType) -> i32 {
        let mut percent = 100;
        for entry in &self.entries {
            match entry.kind {
                Trait::Immunity { kind } if kind == damage_type => return 0,
                Trait::Resistance { kind } if kind == damage_type => percent /= 2,
                Trait::Vulnerability { kind } if kind == damage_type => percent *= 2,
                _ => {}
            }
        }
        percent
    }
}
