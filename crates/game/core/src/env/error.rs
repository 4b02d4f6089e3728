//! Oracle access errors.

use crate::error::{ErrorSeverity, GameError};
use crate::state::{LevelId, Position};

/// Errors raised when the environment cannot supply required world data.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    #[error("MapOracle not available")]
    MapNotAvailable,

    #[error("RngOracle not available")]
    RngNotAvailable,

    #[error("catalog not available")]
    CatalogNotAvailable,

    #[error("position {1} is outside level {0}")]
    PositionOutOfBounds(LevelId, Position),

    #[error("actor template '{0}' not found")]
    ActorTemplateNotFound(String),

    #[error("item template '{0}' not found")]
    ItemTemplateNotFound(String),
}

impl GameError for OracleError {
    fn severity(&self) -> ErrorSeverity {
        use OracleError::*;
        match self {
            // The engine cannot proceed without its oracles.
            MapNotAvailable | RngNotAvailable | CatalogNotAvailable => ErrorSeverity::Fatal,

            PositionOutOfBounds(..) | ActorTemplateNotFound(_) | ItemTemplateNotFound(_) => {
                ErrorSeverity::Validation
            }
        }
    }

    fn error_code(&self) -> &'static str {
        use OracleError::*;
        match self {
            MapNotAvailable => "ORACLE_MAP_NOT_AVAILABLE",
            RngNotAvailable => "ORACLE_RNG_NOT_AVAILABLE",
            CatalogNotAvailable => "ORACLE_CATALOG_NOT_AVAILABLE",
            PositionOutOfBounds(..) => "ORACLE_POSITION_OUT_OF_BOUNDS",
            ActorTemplateNotFound(_) => "ORACLE_ACTOR_TEMPLATE_NOT_FOUND",
            ItemTemplateNotFound(_) => "ORACLE_ITEM_TEMPLATE_NOT_FOUND",
        }
    }
}
