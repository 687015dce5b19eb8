//! WebSocket layer: upgrade handling and the per-connection loop.
//!
//! The endpoint at `/ws` is the hub's only transport. Each accepted socket
//! becomes one peer for exactly as long as the socket stays open.

pub mod connection;
pub mod handler;
