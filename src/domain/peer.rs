//! Registry-side handle to one live connection.

use tokio::sync::mpsc;

use super::{PeerId, ServerMessage};

/// Sending half of a connection's bounded outbound queue.
pub type Outbound = mpsc::Sender<ServerMessage>;

/// Receiving half, drained by the connection loop into the socket.
pub type OutboundRx = mpsc::Receiver<ServerMessage>;

/// Creates an outbound queue with room for `capacity` pending envelopes.
#[must_use]
pub fn outbound_queue(capacity: usize) -> (Outbound, OutboundRx) {
    mpsc::channel(capacity.max(1))
}

/// Result of handing one envelope to one peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Queued for the target's socket.
    Delivered,
    /// No live peer has the requested id.
    TargetNotFound,
    /// The target's queue was full or already closed.
    Dropped,
}

/// A live peer as seen by the registry.
///
/// Cloning is cheap; clones share the same outbound queue.
#[derive(Debug, Clone)]
pub struct PeerHandle {
    id: PeerId,
    outbound: Outbound,
}

impl PeerHandle {
    /// Wraps an outbound queue under the given id.
    #[must_use]
    pub const fn new(id: PeerId, outbound: Outbound) -> Self {
        Self { id, outbound }
    }

    /// The peer's hub-assigned id.
    #[must_use]
    pub const fn id(&self) -> PeerId {
        self.id
    }

    /// Enqueues `msg` without waiting.
    ///
    /// A full queue drops the message for this peer only; the caller keeps
    /// going with its remaining targets.
    pub fn deliver(&self, msg: ServerMessage) -> Delivery {
        match self.outbound.try_send(msg) {
            Ok(()) => Delivery::Delivered,
            Err(mpsc::error::TrySendError::Full(msg)) => {
                tracing::warn!(
                    peer_id = %self.id,
                    kind = msg.kind(),
                    "outbound queue full, message dropped"
                );
                Delivery::Dropped
            }
            Err(mpsc::error::TrySendError::Closed(msg)) => {
                tracing::debug!(peer_id = %self.id, kind = msg.kind(), "peer closing, message dropped");
                Delivery::Dropped
            }
        }
    }
}
