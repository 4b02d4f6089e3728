//! Core action types.
//!
//! - `Action`: one actor's intent for its turn
//! - `ActionResult`: what resolving it produced
//! - `AnimationRequest`: a discrete "play this" request handed to presentation

use crate::combat::Damage;
use crate::state::{Direction, EntityId, Position};
use crate::traits::Trait;

// ============================================================================
// Action
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Action {
    pub actor: EntityId,
    pub kind: ActionKind,
}

impl Action {
    pub fn new(actor: EntityId, kind: ActionKind) -> Self {
        Self { actor, kind }
    }

    pub fn wait(actor: EntityId) -> Self {
        Self::new(actor, ActionKind::Wait)
    }
}

#[derive(Clone, Debug, PartialEq, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum ActionKind {
    Wait,
    Move(Direction),
    Melee {
        target: EntityId,
    },
    Missile {
        target: EntityId,
        cue: Option<VisualCue>,
    },
    Magic {
        target: EntityId,
        spell: Spell,
        cue: Option<VisualCue>,
    },
    /// Walk off the level for good.
    LeaveLevel,
}

/// An offensive spell: its damage dice and an optional status it inflicts on
/// a hit, for the given number of rounds.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Spell {
    pub name: String,
    pub damage: Vec<Damage>,
    pub effect: Option<(Trait, u64)>,
}

impl Spell {
    pub fn new(name: impl Into<String>, damage: Vec<Damage>) -> Self {
        Self {
            name: name.into(),
            damage,
            effect: None,
        }
    }

    pub fn with_effect(mut self, effect: Trait, duration: u64) -> Self {
        self.effect = Some((effect, duration));
        self
    }
}

// ============================================================================
// Presentation
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum VisualCue {
    Arrow,
    Stone,
    Bolt,
    Fireball,
    Frost,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnimationRequest {
    pub cue: VisualCue,
    pub from: Position,
    pub to: Position,
}

// ============================================================================
// Action Result
// ============================================================================

/// Outcome of one resolved action.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionResult {
    /// False when the action could not be carried out at all.
    pub complete: bool,
    /// Energy the action consumed. Fast weapons cost less than 1.0.
    pub energy_cost: f64,
    /// Ordered, human-readable descriptions of what happened.
    pub messages: Vec<String>,
    pub animations: Vec<AnimationRequest>,
}

impl ActionResult {
    pub fn completed(energy_cost: f64) -> Self {
        Self {
            complete: true,
            energy_cost,
            messages: Vec::new(),
            animations: Vec::new(),
        }
    }

    /// Nothing happened and no energy is spent.
    pub fn incomplete() -> Self {
        Self {
            complete: false,
            energy_cost: 0.0,
            messages: Vec::new(),
            animations: Vec::new(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.messages.push(message.into());
        self
    }
}
