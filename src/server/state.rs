//! Shared application state for the HTTP server.

use std::sync::Arc;

use crate::relay::{Broadcaster, Registry};

/// Application state shared across all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Broadcast engine over the process-wide registry.
    pub relay: Broadcaster,
}

impl AppState {
    /// Creates state around an existing registry.
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            relay: Broadcaster::new(registry),
        }
    }

    /// Number of connected clients.
    pub fn online(&self) -> usize {
        self.relay.online()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Arc::new(Registry::new()))
    }
}
