//! Relay service: turns connection lifecycle events and inbound envelopes
//! into registry operations and outbound envelopes.

use std::sync::Arc;

use crate::domain::{ClientMessage, Delivery, Outbound, PeerId, PeerRegistry};
use crate::error::RelayError;

/// Routing layer between connections and the [`PeerRegistry`].
///
/// Stateless coordinator: all membership lives in the registry. The
/// service enforces addressing (the target must be live) and identity
/// (`from` is always the hub-assigned id of the connection the envelope
/// arrived on). Relay is fire-and-forget: nothing is ever reported back to
/// the sender.
#[derive(Debug, Clone)]
pub struct RelayService {
    registry: Arc<PeerRegistry>,
}

impl RelayService {
    /// Creates a new `RelayService` over the given registry.
    #[must_use]
    pub fn new(registry: Arc<PeerRegistry>) -> Self {
        Self { registry }
    }

    /// Returns a reference to the inner [`PeerRegistry`].
    #[must_use]
    pub fn registry(&self) -> &Arc<PeerRegistry> {
        &self.registry
    }

    /// Onboards a freshly accepted connection.
    ///
    /// The returned id is the connection's identity for its whole life. By
    /// the time this returns, the newcomer's `user-list` is queued and every
    /// other peer has been sent `add-user`.
    pub async fn connect(&self, outbound: Outbound) -> PeerId {
        self.registry.admit(outbound).await
    }

    /// Tears down a closed connection and announces `remove-user`.
    ///
    /// Safe to call more than once; only the first call announces.
    pub async fn disconnect(&self, id: PeerId) -> bool {
        self.registry.remove(id).await
    }

    /// Parses one inbound text frame from `from` and relays it.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::MalformedEnvelope`] when the frame is not a
    /// valid client envelope. The caller drops that message and keeps the
    /// connection open.
    pub async fn handle_frame(&self, from: PeerId, frame: &str) -> Result<Delivery, RelayError> {
        let msg: ClientMessage = serde_json::from_str(frame)?;
        Ok(self.dispatch(from, msg).await)
    }

    /// Relays a parsed envelope to its target.
    ///
    /// An unknown or just-departed target is a normal outcome
    /// ([`Delivery::TargetNotFound`]), not an error.
    pub async fn dispatch(&self, from: PeerId, msg: ClientMessage) -> Delivery {
        let to = msg.target();
        let kind = msg.kind();

        let Some(target) = self.registry.lookup(to).await else {
            tracing::debug!(peer_id = %from, %to, kind, "relay target not connected");
            return Delivery::TargetNotFound;
        };

        let outcome = target.deliver(msg.into_delivery(from));
        if outcome == Delivery::Delivered {
            tracing::debug!(peer_id = %from, %to, kind, "relayed");
        }
        outcome
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::{OutboundRx, ServerMessage, outbound_queue};

    fn make_service() -> RelayService {
        RelayService::new(Arc::new(PeerRegistry::new()))
    }

    async fn join(service: &RelayService) -> (PeerId, OutboundRx) {
        let (tx, mut rx) = outbound_queue(16);
        let id = service.connect(tx).await;
        let Some(ServerMessage::UserList { .. }) = rx.recv().await else {
            panic!("first message must be the snapshot");
        };
        (id, rx)
    }

    #[tokio::test]
    async fn call_user_reaches_target_with_sender_id() {
        let service = make_service();
        let (a, _rx_a) = join(&service).await;
        let (b, mut rx_b) = join(&service).await;

        let frame = json!({
            "type": "call-user",
            "payload": { "to": b, "offer": { "sdp": "o" } }
        })
        .to_string();
        let result = service.handle_frame(a, &frame).await;
        assert!(matches!(result, Ok(Delivery::Delivered)));

        let Some(ServerMessage::NewCall { from, offer }) = rx_b.recv().await else {
            panic!("expected new-call");
        };
        assert_eq!(from, a);
        assert_eq!(offer, json!({ "sdp": "o" }));
    }

    #[tokio::test]
    async fn answer_and_candidate_are_relayed() {
        let service = make_service();
        let (a, mut rx_a) = join(&service).await;
        let (b, _rx_b) = join(&service).await;
        let Some(ServerMessage::AddUser { .. }) = rx_a.recv().await else {
            panic!("expected add-user");
        };

        let answer = ClientMessage::AnswerUser {
            to: a,
            answer: json!("ans"),
        };
        assert_eq!(service.dispatch(b, answer).await, Delivery::Delivered);
        let candidate = ClientMessage::NewIceCandidate {
            to: a,
            candidate: json!({ "sdpMid": "0" }),
        };
        assert_eq!(service.dispatch(b, candidate).await, Delivery::Delivered);

        assert_eq!(
            rx_a.recv().await,
            Some(ServerMessage::NewAnswer {
                from: b,
                answer: json!("ans")
            })
        );
        assert_eq!(
            rx_a.recv().await,
            Some(ServerMessage::NewIceCandidate {
                from: b,
                candidate: json!({ "sdpMid": "0" })
            })
        );
    }

    #[tokio::test]
    async fn unknown_target_is_silently_dropped() {
        let service = make_service();
        let (a, mut rx_a) = join(&service).await;

        let msg = ClientMessage::CallUser {
            to: PeerId::new(),
            offer: json!(null),
        };
        assert_eq!(service.dispatch(a, msg).await, Delivery::TargetNotFound);
        assert!(rx_a.try_recv().is_err());
    }

    #[tokio::test]
    async fn relay_to_departed_peer_is_noop() {
        let service = make_service();
        let (a, _rx_a) = join(&service).await;
        let (b, _rx_b) = join(&service).await;

        assert!(service.disconnect(b).await);
        let msg = ClientMessage::CallUser {
            to: b,
            offer: json!("late"),
        };
        assert_eq!(service.dispatch(a, msg).await, Delivery::TargetNotFound);
    }

    #[tokio::test]
    async fn malformed_frame_is_an_error_without_side_effects() {
        let service = make_service();
        let (a, _rx_a) = join(&service).await;
        let (_b, mut rx_b) = join(&service).await;

        for frame in ["not json", r#"{"type":"call-user"}"#, r#"{"type":"wave","payload":{}}"#] {
            let result = service.handle_frame(a, frame).await;
            assert!(matches!(result, Err(RelayError::MalformedEnvelope(_))));
        }
        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test]
    async fn double_disconnect_announces_once() {
        let service = make_service();
        let (a, mut rx_a) = join(&service).await;
        let (b, _rx_b) = join(&service).await;
        let _ = rx_a.recv().await;

        assert!(service.disconnect(b).await);
        assert!(!service.disconnect(b).await);

        assert_eq!(rx_a.recv().await, Some(ServerMessage::RemoveUser { id: b }));
        assert!(rx_a.try_recv().is_err());
        assert!(!service.registry().contains(b).await);
        assert!(service.registry().contains(a).await);
    }
}
