//! Snapshot and restore of the whole world.
//!
//! A [`Blob`] is the bincode encoding of a [`GameState`] sealed with its
//! SHA-256 digest. The event registry is not stored; [`restore`] derives it
//! again from the traits that survived.

use sha2::{Digest, Sha256};

use crate::error::{ErrorSeverity, GameError};
use crate::state::GameState;

/// Sealed, versioned snapshot of a [`GameState`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Blob {
    pub version: u16,
    pub digest: [u8; 32],
    pub payload: Vec<u8>,
}

impl Blob {
    /// Current snapshot format.
    pub const VERSION: u16 = 1;
    const HEADER_LEN: usize = 2 + 32;

    /// Flat form: little-endian version, digest, payload.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(Self::HEADER_LEN + self.payload.len());
        bytes.extend_from_slice(&self.version.to_le_bytes());
        bytes.extend_from_slice(&self.digest);
        bytes.extend_from_slice(&self.payload);
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PersistError> {
        if bytes.len() < Self::HEADER_LEN {
            return Err(PersistError::Truncated { len: bytes.len() });
        }
        let (version, rest) = bytes.split_at(2);
        let (digest, payload) = rest.split_at(32);
        let mut sealed = [0u8; 32];
        sealed.copy_from_slice(digest);
        Ok(Self {
            version: u16::from_le_bytes([version[0], version[1]]),
            digest: sealed,
            payload: payload.to_vec(),
        })
    }

    fn seal(payload: &[u8]) -> [u8; 32] {
        Sha256::digest(payload).into()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PersistError {
    #[error("snapshot is {len} bytes, shorter than its header")]
    Truncated { len: usize },

    #[error("unsupported snapshot version {found} (expected {expected})")]
    UnsupportedVersion { found: u16, expected: u16 },

    #[error("snapshot digest does not match its payload")]
    DigestMismatch,

    #[error("failed to encode snapshot: {0}")]
    Encode(String),

    #[error("failed to decode snapshot: {0}")]
    Decode(String),
}

impl GameError for PersistError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            PersistError::Encode(_) => ErrorSeverity::Internal,
            PersistError::UnsupportedVersion { .. } => ErrorSeverity::Validation,
            PersistError::Truncated { .. }
            | PersistError::DigestMismatch
            | PersistError::Decode(_) => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            PersistError::Truncated { .. } => "PERSIST_TRUNCATED",
            PersistError::UnsupportedVersion { .. } => "PERSIST_UNSUPPORTED_VERSION",
            PersistError::DigestMismatch => "PERSIST_DIGEST_MISMATCH",
            PersistError::Encode(_) => "PERSIST_ENCODE",
            PersistError::Decode(_) => "PERSIST_DECODE",
        }
    }
}

/// Encodes `state` and seals it.
pub fn snapshot(state: &GameState) -> Result<Blob, PersistError> {
    let payload = bincode::serialize(state).map_err(|e| PersistError::Encode(e.to_string()))?;
    let digest = Blob::seal(&payload);
    tracing::info!(
        target: "delve::persist",
        turn = state.turn.turn,
        nonce = state.turn.nonce,
        bytes = payload.len(),
        "snapshot taken"
    );
    Ok(Blob {
        version: Blob::VERSION,
        digest,
        payload,
    })
}

/// Verifies and decodes `blob`, then re-registers every listener its traits
/// subscribe to.
pub fn restore(blob: &Blob) -> Result<GameState, PersistError> {
    if blob.version != Blob::VERSION {
        return Err(PersistError::UnsupportedVersion {
            found: blob.version,
            expected: Blob::VERSION,
        });
    }
    if Blob::seal(&blob.payload) != blob.digest {
        tracing::warn!(target: "delve::persist", "snapshot digest mismatch");
        return Err(PersistError::DigestMismatch);
    }
    let mut state: GameState =
        bincode::deserialize(&blob.payload).map_err(|e| PersistError::Decode(e.to_string()))?;
    state.rebuild_events();
    tracing::info!(
        target: "delve::persist",
        turn = state.turn.turn,
        actors = state.entities.len(),
        "snapshot restored"
    );
    Ok(state)
}
