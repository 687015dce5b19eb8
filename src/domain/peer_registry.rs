//! Process-wide presence registry.
//!
//! [`PeerRegistry`] is the single source of truth for who is currently
//! reachable. All membership changes run inside one write-locked critical
//! section together with the notices they cause, so no peer can observe a
//! membership change out of order with the messages announcing it.
//!
//! The registry never performs socket I/O. It only enqueues envelopes on
//! each peer's bounded outbound queue (see [`PeerHandle::deliver`]), which
//! never blocks, so holding the lock across a fan-out is cheap.

use std::collections::HashMap;

use tokio::sync::RwLock;

use super::peer::{Delivery, Outbound, PeerHandle};
use super::{PeerId, ServerMessage};

#[derive(Debug)]
struct Entry {
    /// Admission sequence number, used to keep snapshots in join order.
    seq: u64,
    handle: PeerHandle,
}

#[derive(Debug, Default)]
struct Members {
    peers: HashMap<PeerId, Entry>,
    next_seq: u64,
}

impl Members {
    fn snapshot(&self, excluding: Option<PeerId>) -> Vec<PeerId> {
        let mut live: Vec<(u64, PeerId)> = self
            .peers
            .iter()
            .filter(|(id, _)| Some(**id) != excluding)
            .map(|(id, entry)| (entry.seq, *id))
            .collect();
        live.sort_unstable_by_key(|(seq, _)| *seq);
        live.into_iter().map(|(_, id)| id).collect()
    }

    fn broadcast(&self, excluding: PeerId, msg: &ServerMessage) -> usize {
        let mut notified = 0;
        for (id, entry) in &self.peers {
            if *id != excluding && entry.handle.deliver(msg.clone()) == Delivery::Delivered {
                notified += 1;
            }
        }
        notified
    }
}

/// Mapping from hub-assigned id to live connection.
///
/// # Concurrency
///
/// - `admit` and `remove` take the write lock for the whole
///   insert/remove-and-announce sequence.
/// - `lookup`, `snapshot`, `broadcast` and the counters take the read lock
///   and see a consistent membership for their single pass.
/// - No operation awaits anything but the lock itself.
#[derive(Debug, Default)]
pub struct PeerRegistry {
    members: RwLock<Members>,
}

impl PeerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Admits a new connection and returns its freshly minted id.
    ///
    /// Onboarding is one atomic unit: the newcomer's `user-list` snapshot is
    /// queued first, then the newcomer becomes visible, then `add-user` is
    /// queued to every other peer. No third party can address the newcomer
    /// before its own snapshot is on the wire.
    pub async fn admit(&self, outbound: Outbound) -> PeerId {
        let mut members = self.members.write().await;

        let mut id = PeerId::new();
        while members.peers.contains_key(&id) {
            id = PeerId::new();
        }

        let handle = PeerHandle::new(id, outbound);
        let ids = members.snapshot(None);
        let existing = ids.len();
        handle.deliver(ServerMessage::UserList { ids });

        let seq = members.next_seq;
        members.next_seq = seq.wrapping_add(1);
        members.peers.insert(id, Entry { seq, handle });

        let notified = members.broadcast(id, &ServerMessage::AddUser { id });
        tracing::info!(peer_id = %id, existing, notified, "peer admitted");
        id
    }

    /// Removes `id` and announces its departure to every remaining peer.
    ///
    /// Idempotent: returns `false` and announces nothing when `id` is not
    /// registered (double close, or a close racing another removal).
    pub async fn remove(&self, id: PeerId) -> bool {
        let mut members = self.members.write().await;
        if members.peers.remove(&id).is_none() {
            tracing::debug!(peer_id = %id, "remove of unknown peer ignored");
            return false;
        }
        let notified = members.broadcast(id, &ServerMessage::RemoveUser { id });
        tracing::info!(peer_id = %id, remaining = members.peers.len(), notified, "peer removed");
        true
    }

    /// Returns the handle for `id`, if that peer is live.
    pub async fn lookup(&self, id: PeerId) -> Option<PeerHandle> {
        let members = self.members.read().await;
        members.peers.get(&id).map(|entry| entry.handle.clone())
    }

    /// Returns every live id except `excluding`, in join order.
    pub async fn snapshot(&self, excluding: PeerId) -> Vec<PeerId> {
        self.members.read().await.snapshot(Some(excluding))
    }

    /// Queues `msg` to every live peer except `excluding`.
    ///
    /// Each target is independent: a full or closed queue skips that peer
    /// only. Returns the number of peers the message was queued for.
    pub async fn broadcast(&self, excluding: PeerId, msg: &ServerMessage) -> usize {
        self.members.read().await.broadcast(excluding, msg)
    }

    /// Returns `true` if `id` is currently registered.
    pub async fn contains(&self, id: PeerId) -> bool {
        self.members.read().await.peers.contains_key(&id)
    }

    /// Returns the number of live peers.
    pub async fn len(&self) -> usize {
        self.members.read().await.peers.len()
    }

    /// Returns `true` if no peer is registered.
    pub async fn is_empty(&self) -> bool {
        self.members.read().await.peers.is_empty()
    }
}
