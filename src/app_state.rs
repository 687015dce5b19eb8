//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::config::RelayConfig;
use crate::domain::PeerRegistry;
use crate::service::RelayService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Relay service for onboarding and routing.
    pub relay: Arc<RelayService>,
    /// Runtime configuration.
    pub config: Arc<RelayConfig>,
}

impl AppState {
    /// Builds state around a fresh, empty registry.
    #[must_use]
    pub fn new(config: RelayConfig) -> Self {
        let registry = Arc::new(PeerRegistry::new());
        Self {
            relay: Arc::new(RelayService::new(registry)),
            config: Arc::new(config),
        }
    }
}
