//! Delivery sink feeding websocket clients.

use bazaar_core::processors::{DeliveryError, NotifyFn};
use bazaar_sdk::objects::Wrapper;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Serializes each message to a JSON text frame and broadcasts it.
///
/// Having no connected client is not an error; the message is dropped.
pub fn broadcast_sink(tx: broadcast::Sender<String>) -> NotifyFn {
    Arc::new(move |wrapper: Wrapper| {
        let frame =
            serde_json::to_string(&wrapper).map_err(|e| DeliveryError::Failed(e.to_string()))?;
        match tx.send(frame) {
            Ok(receivers) => {
                tracing::trace!(key = wrapper.key(), receivers, "Broadcast client message");
            }
            Err(_) => {
                tracing::trace!(key = wrapper.key(), "No websocket clients connected");
            }
        }
        Ok(())
    })
}
