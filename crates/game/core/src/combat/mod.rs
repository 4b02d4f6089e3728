//! Combat resolution.
//!
//! # Module Structure
//!
//! - `hit`: attack profile, averaged attack roll, armour class
//! - `damage`: damage dice, defences, `receive_damage` and `inflict`
//! - `reactions`: dodge/displacement and post-hit status triggers
//! - `maneuvers`: cleave, impale, knockback, grapple
//! - `resolve`: melee, missile and magic entry points
//! - `death`: the death pipeline
//!
//! Everything here mutates state through a [`ResolveContext`](crate::context::ResolveContext)
//! and only ever returns `Err` for a [`Termination`](crate::engine::Termination).

pub mod damage;
pub mod death;
pub mod hit;
pub mod maneuvers;
pub mod reactions;
pub mod resolve;

pub use damage::{
    inflict, mitigated_total, receive_damage, roll_all, Damage, DamagePart, DamageReport,
    DamageType,
};
pub use death::kill;
pub use hit::{armour_class, attack_profile, attack_roll, AttackMode, AttackProfile};
pub use resolve::{resolve_magic, resolve_melee, resolve_missile, strike, Strike};
