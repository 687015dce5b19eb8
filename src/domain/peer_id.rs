//! Hub-assigned peer identifier.
//!
//! [`PeerId`] is a newtype wrapper around [`uuid::Uuid`] (v4). Identifiers
//! are minted by the [`super::PeerRegistry`] on admission and never chosen by
//! the peer. Random v4 ids make the id space effectively non-repeating, so a
//! message addressed to a just-departed peer can never reach a newcomer.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of one live participant.
///
/// Serialized as the bare hyphenated UUID string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerId(uuid::Uuid);

impl PeerId {
    /// Mints a new random `PeerId` (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Wraps an existing [`uuid::Uuid`].
    #[must_use]
    pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner [`uuid::Uuid`].
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for PeerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<uuid::Uuid> for PeerId {
    fn from(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }
}
