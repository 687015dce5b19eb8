//! WebSocket connection state machine.
//!
//! A connection is onboarded before its first frame is read, relays
//! envelopes while open, and is removed from the registry exactly once
//! when it closes, times out, or fails to write.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::Instrument;

use crate::config::RelayConfig;
use crate::domain::{OutboundRx, PeerId, outbound_queue};
use crate::error::RelayError;
use crate::service::RelayService;

/// Lower bound on the ping period.
const MIN_HEARTBEAT_INTERVAL: Duration = Duration::from_millis(100);

/// Onboards `socket` as a new peer and runs it until it closes.
pub async fn run_connection(
    socket: WebSocket,
    relay: Arc<RelayService>,
    config: Arc<RelayConfig>,
) {
    let (outbound, outbound_rx) = outbound_queue(config.peer_queue_capacity);
    let peer_id = relay.connect(outbound).await;

    let span = tracing::info_span!("peer", %peer_id);
    serve_peer(socket, peer_id, outbound_rx, &relay, &config)
        .instrument(span.clone())
        .await;

    relay.disconnect(peer_id).instrument(span).await;
}

/// Read/write loop for an onboarded peer.
///
/// - Inbound frames are dispatched in arrival order.
/// - Envelopes queued by the registry or by other peers' relays are
///   written out as JSON text frames.
/// - A ping goes out every heartbeat; a peer silent for longer than the
///   client timeout is dropped.
async fn serve_peer(
    socket: WebSocket,
    peer_id: PeerId,
    mut outbound_rx: OutboundRx,
    relay: &RelayService,
    config: &RelayConfig,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    let period = config.heartbeat_interval.max(MIN_HEARTBEAT_INTERVAL);
    let mut heartbeat = tokio::time::interval_at(Instant::now() + period, period);
    heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_seen = Instant::now();

    loop {
        tokio::select! {
            // Incoming frame from the peer
            frame = ws_rx.next() => {
                let msg = match frame {
                    Some(Ok(msg)) => msg,
                    Some(Err(e)) => {
                        tracing::debug!(error = %e, "ws read failed");
                        break;
                    }
                    None => break,
                };
                last_seen = Instant::now();
                match msg {
                    Message::Text(text) => handle_frame(relay, peer_id, text.as_str()).await,
                    Message::Binary(bytes) => match std::str::from_utf8(&bytes) {
                        Ok(text) => handle_frame(relay, peer_id, text).await,
                        Err(_) => {
                            tracing::warn!(error = %RelayError::NonUtf8Frame, "frame dropped");
                        }
                    },
                    Message::Close(_) => break,
                    // Pongs are queued by the transport itself.
                    Message::Ping(_) | Message::Pong(_) => {}
                }
            }
            // Envelope queued for this peer
            Some(envelope) = outbound_rx.recv() => {
                let json = match serde_json::to_string(&envelope) {
                    Ok(json) => json,
                    Err(e) => {
                        tracing::warn!(error = %e, kind = envelope.kind(), "envelope not serializable");
                        continue;
                    }
                };
                if ws_tx.send(Message::text(json)).await.is_err() {
                    break;
                }
            }
            _ = heartbeat.tick() => {
                if last_seen.elapsed() > config.client_timeout {
                    tracing::info!("heartbeat timed out, disconnecting");
                    break;
                }
                if ws_tx.send(Message::Ping(Bytes::new())).await.is_err() {
                    break;
                }
            }
        }
    }

    let _ = ws_tx.close().await;
    tracing::debug!("ws connection closed");
}

/// Dispatches one inbound frame. Failures affect this message only.
async fn handle_frame(relay: &RelayService, peer_id: PeerId, text: &str) {
    if let Err(e) = relay.handle_frame(peer_id, text).await {
        tracing::warn!(error = %e, "frame dropped");
    }
}
