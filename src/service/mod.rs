//! Service layer: relay orchestration.
//!
//! [`RelayService`] onboards and tears down connections through the
//! [`super::domain::PeerRegistry`] and routes directed envelopes between
//! live peers.

pub mod relay_service;

pub use relay_service::RelayService;
