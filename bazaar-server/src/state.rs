//! Application state shared across all request handlers.

use bazaar_core::framework::NotificationStore;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (everything is behind Arc).
#[derive(Clone)]
pub struct AppState {
    /// Notification record store.
    pub store: Arc<dyn NotificationStore>,
    /// Serialized client messages, fanned out to websocket connections.
    pub deliveries: broadcast::Sender<String>,
}

impl AppState {
    pub fn new(store: Arc<dyn NotificationStore>, deliveries: broadcast::Sender<String>) -> Self {
        Self { store, deliveries }
    }
}
