//! Common error infrastructure for delve-core.
//!
//! Domain errors (`OracleError`, `ExecuteError`, `PersistError`) live next to
//! the code that raises them. This module holds the shared classification.
//!
//! # Propagation policy
//!
//! - Expected game-state edge cases are not errors; they come back as
//!   "no effect" outcomes.
//! - Invariant violations are detected defensively and turned into no-ops.
//! - Only [`crate::engine::Termination`] unwinds the driver loop.

/// How the application shell should treat an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// The request was wrong; the world is untouched.
    ///
    /// Examples: acting out of turn, an unknown template.
    Validation,

    /// Core state disagrees with itself.
    Internal,

    /// The session is over.
    ///
    /// Examples: player defeated, corrupted snapshot.
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// The caller may fix the input and submit again.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Validation)
    }

    /// The driver loop must stop.
    pub const fn ends_session(&self) -> bool {
        matches!(self, Self::Fatal)
    }
}

/// Classification shared by every delve-core error enum.
///
/// Implementors derive `thiserror::Error` for the message and pick the
/// severity per variant.
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    /// Stable identifier for logs, e.g. `"PERSIST_DIGEST_MISMATCH"`.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
