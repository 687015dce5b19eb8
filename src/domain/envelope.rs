//! Wire envelopes exchanged with peers after onboarding.
//!
//! Every frame is a JSON object `{"type": "<kind>", "payload": {...}}`.
//! [`ClientMessage`] is the closed set of kinds a peer may send;
//! [`ServerMessage`] is the closed set the hub emits. Negotiation bodies
//! (offers, answers, candidates) are carried as [`Opaque`] values and are
//! never inspected.

use serde::{Deserialize, Serialize};

use super::PeerId;

/// Uninterpreted negotiation body, passed through byte-for-byte in meaning.
pub type Opaque = serde_json::Value;

/// Peer → hub envelope.
///
/// Only the target and the opaque body are read. Any other field a client
/// adds to the payload (including a forged `from`) is ignored.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum ClientMessage {
    /// Request relay of a session offer.
    CallUser {
        /// Target peer.
        to: PeerId,
        /// Opaque offer body.
        offer: Opaque,
    },
    /// Request relay of a session answer.
    AnswerUser {
        /// Target peer.
        to: PeerId,
        /// Opaque answer body.
        answer: Opaque,
    },
    /// Request relay of a connectivity candidate.
    NewIceCandidate {
        /// Target peer.
        to: PeerId,
        /// Opaque candidate body.
        candidate: Opaque,
    },
}

impl ClientMessage {
    /// Returns the peer this envelope is addressed to.
    #[must_use]
    pub const fn target(&self) -> PeerId {
        match self {
            Self::CallUser { to, .. }
            | Self::AnswerUser { to, .. }
            | Self::NewIceCandidate { to, .. } => *to,
        }
    }

    /// Returns the wire kind of this envelope.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::CallUser { .. } => "call-user",
            Self::AnswerUser { .. } => "answer-user",
            Self::NewIceCandidate { .. } => "new-ice-candidate",
        }
    }

    /// Converts the request into the envelope delivered to its target,
    /// stamping `from` with the hub-assigned sender id.
    #[must_use]
    pub fn into_delivery(self, from: PeerId) -> ServerMessage {
        match self {
            Self::CallUser { offer, .. } => ServerMessage::NewCall { from, offer },
            Self::AnswerUser { answer, .. } => ServerMessage::NewAnswer { from, answer },
            Self::NewIceCandidate { candidate, .. } => {
                ServerMessage::NewIceCandidate { from, candidate }
            }
        }
    }
}

/// Hub → peer envelope.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum ServerMessage {
    /// Presence snapshot, sent once to a newcomer. Never contains the
    /// recipient's own id.
    UserList {
        /// Ids of every other live peer.
        ids: Vec<PeerId>,
    },
    /// A peer joined.
    AddUser {
        /// The newcomer.
        id: PeerId,
    },
    /// A peer left.
    RemoveUser {
        /// The departed peer.
        id: PeerId,
    },
    /// Delivered offer.
    NewCall {
        /// Hub-assigned id of the sender.
        from: PeerId,
        /// Opaque offer body.
        offer: Opaque,
    },
    /// Delivered answer.
    NewAnswer {
        /// Hub-assigned id of the sender.
        from: PeerId,
        /// Opaque answer body.
        answer: Opaque,
    },
    /// Delivered connectivity candidate.
    NewIceCandidate {
        /// Hub-assigned id of the sender.
        from: PeerId,
        /// Opaque candidate body.
        candidate: Opaque,
    },
}

impl ServerMessage {
    /// Returns the wire kind of this envelope.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::UserList { .. } => "user-list",
            Self::AddUser { .. } => "add-user",
            Self::RemoveUser { .. } => "remove-user",
            Self::NewCall { .. } => "new-call",
            Self::NewAnswer { .. } => "new-answer",
            Self::NewIceCandidate { .. } => "new-ice-candidate",
        }
    }
}
