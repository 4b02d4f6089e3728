//! Error types surfaced by the driver.

use crate::env::OracleError;
use crate::error::{ErrorSeverity, GameError};
use crate::state::EntityId;

/// Game-ending outcome. The only thing that unwinds a resolution chain.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Termination {
    #[error("player defeated: {message}")]
    PlayerDefeated { message: String },

    #[error("victory: {message}")]
    Victory { message: String },
}

impl Termination {
    /// Final summary for the application shell.
    pub fn message(&self) -> &str {
        match self {
            Termination::PlayerDefeated { message } | Termination::Victory { message } => message,
        }
    }
}

impl GameError for Termination {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Termination::PlayerDefeated { .. } => "TERMINATION_PLAYER_DEFEATED",
            Termination::Victory { .. } => "TERMINATION_VICTORY",
        }
    }
}

/// Errors surfaced while executing an action through the game engine.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ExecuteError {
    #[error(transparent)]
    Terminated(#[from] Termination),

    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error("invalid actor: action actor {actor} is not the current actor ({current_actor:?})")]
    ActorNotCurrent {
        actor: EntityId,
        current_actor: Option<EntityId>,
    },

    #[error("unknown actor {0}")]
    UnknownActor(EntityId),
}

impl GameError for ExecuteError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            ExecuteError::Terminated(inner) => inner.severity(),
            ExecuteError::Oracle(inner) => inner.severity(),
            ExecuteError::ActorNotCurrent { .. } | ExecuteError::UnknownActor(_) => {
                ErrorSeverity::Validation
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            ExecuteError::Terminated(inner) => inner.error_code(),
            ExecuteError::Oracle(inner) => inner.error_code(),
            ExecuteError::ActorNotCurrent { .. } => "EXECUTE_ACTOR_NOT_CURRENT",
            ExecuteError::UnknownActor(_) => "EXECUTE_UNKNOWN_ACTOR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn termination_is_fatal_and_carries_summary() {
        let end = Termination::PlayerDefeated {
            message: "slain by a kobold".into(),
        };
        assert_eq!(end.severity(), ErrorSeverity::Fatal);
        assert_eq!(end.message(), "slain by a kobold");

        let wrapped = ExecuteError::from(end);
        assert_eq!(wrapped.error_code(), "TERMINATION_PLAYER_DEFEATED");
        assert!(!ExecuteError::UnknownActor(EntityId(3)).severity().ends_session());
    }
}
