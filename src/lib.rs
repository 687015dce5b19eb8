//! # signal-hub
//!
//! WebSocket signaling relay for peer-to-peer session negotiation.
//!
//! Peers connect, receive a hub-assigned id and a snapshot of who else is
//! online, and exchange opaque offers, answers, and connectivity candidates
//! addressed by id. The hub routes; it never interprets negotiation
//! payloads.
//!
//! ## Architecture
//!
//! ```text
//! Peers (WebSocket /ws)        HTTP (/health)
//!     │                            │
//!     ├── WS Handler + connection loop (ws/)
//!     │                            ├── API handlers (api/)
//!     ├── RelayService (service/)
//!     │
//!     └── PeerRegistry (domain/)
//!           └── per-peer bounded outbound queues
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod server;
pub mod service;
pub mod ws;
