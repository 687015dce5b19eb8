//! Domain layer: peer identity, wire envelopes, and the presence registry.
//!
//! This module contains the hub's core model: hub-assigned peer ids, the
//! closed set of envelopes peers and hub exchange, per-peer outbound
//! handles, and the registry that maps ids to live connections.

pub mod envelope;
pub mod peer;
pub mod peer_id;
pub mod peer_registry;

pub use envelope::{ClientMessage, Opaque, ServerMessage};
pub use peer::{Delivery, Outbound, OutboundRx, PeerHandle, outbound_queue};
pub use peer_id::PeerId;
pub use peer_registry::PeerRegistry;
