//! Errors raised while populating the world.
//!
//! Placement and id allocation are the only state operations that can fail;
//! everything that happens during a tick treats bad input as a no-op instead.

use crate::env::OracleError;
use crate::error::{ErrorSeverity, GameError};
use crate::state::{EntityId, Position};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    /// An actor with this id is already present.
    #[error("entity {id} already exists")]
    DuplicateEntity { id: EntityId },

    /// Id counters are exhausted.
    #[error("id allocator overflow at {current}")]
    IdOverflow { current: u32 },

    /// Another actor stands on the requested tile.
    #[error("position {position} is already occupied by {occupant}")]
    PositionOccupied {
        position: Position,
        occupant: EntityId,
    },

    /// The requested tile is outside the map or cannot be stood on.
    #[error("position {position} cannot hold an actor")]
    PositionBlocked { position: Position },

    #[error(transparent)]
    Catalog(#[from] OracleError),
}

impl GameError for StateError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            StateError::IdOverflow { .. } => ErrorSeverity::Fatal,
            StateError::Catalog(err) => err.severity(),
            StateError::DuplicateEntity { .. }
            | StateError::PositionOccupied { .. }
            | StateError::PositionBlocked { .. } => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            StateError::DuplicateEntity { .. } => "STATE_DUPLICATE_ENTITY",
            StateError::IdOverflow { .. } => "STATE_ID_OVERFLOW",
            StateError::PositionOccupied { .. } => "STATE_POSITION_OCCUPIED",
            StateError::PositionBlocked { .. } => "STATE_POSITION_BLOCKED",
            StateError::Catalog(err) => err.error_code(),
        }
    }
}
