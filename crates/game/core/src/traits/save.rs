//! Saving throws.
//!
//! One polarity everywhere: the defender resists when `d20 + modifier >= DC`
//! and the effect lands when the total falls below the DC.

use crate::env::Dice;
use crate::state::{Actor, Attribute};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveOutcome {
    Resisted,
    Affected,
}

impl SaveOutcome {
    pub fn resisted(self) -> bool {
        self == SaveOutcome::Resisted
    }
}

/// Pure comparison used by every save in the crate.
pub fn saving_throw(roll: i32, modifier: i32, dc: i32) -> SaveOutcome {
    if roll + modifier >= dc {
        SaveOutcome::Resisted
    } else {
        SaveOutcome::Affected
    }
}

/// Rolls a d20 save for `defender` using the modifier of `attribute`.
pub fn roll_save(dice: &mut Dice<'_>, defender: &Actor, attribute: Attribute, dc: i32) -> SaveOutcome {
    let roll = dice.d20();
    let modifier = defender.modifier(attribute);
    let outcome = saving_throw(roll, modifier, dc);
    tracing::debug!(
        target: "delve::traits",
        defender = %defender.id,
        ?attribute,
        roll,
        modifier,
        dc,
        ?outcome,
        "saving throw"
    );
    outcome
}
