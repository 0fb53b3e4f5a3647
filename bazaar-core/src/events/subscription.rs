//! Subscriber-side handle.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::sync::mpsc;
use tokio_stream::Stream;
use tracing::{debug, warn};

use super::bus::BusInner;
use super::error::BusError;
use super::kind::{Envelope, Kind};

/// A live subscription: a queue of envelopes of the subscribed kinds.
///
/// Consume it with [`recv`](Self::recv) or as a [`Stream`]. Dropping it
/// detaches it from the bus; [`close`](Self::close) does the same and waits
/// until the bus no longer references it.
pub struct Subscription {
    id: u64,
    kinds: Vec<Kind>,
    rx: Option<mpsc::Receiver<Envelope>>,
    bus: Arc<BusInner>,
}

impl Subscription {
    pub(crate) fn new(
        id: u64,
        kinds: Vec<Kind>,
        rx: mpsc::Receiver<Envelope>,
        bus: Arc<BusInner>,
    ) -> Self {
        Self {
            id,
            kinds,
            rx: Some(rx),
            bus,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// The deduplicated kinds this subscription receives.
    pub fn kinds(&self) -> &[Kind] {
        &self.kinds
    }

    pub fn is_closed(&self) -> bool {
        self.rx.is_none()
    }

    /// Next event, or `None` once the subscription is closed.
    pub async fn recv(&mut self) -> Option<Envelope> {
        match self.rx.as_mut() {
            Some(rx) => rx.recv().await,
            None => None,
        }
    }

    /// Detaches from the bus.
    ///
    /// Queued and in-flight events are drained and discarded so that a
    /// publisher blocked on this subscription's full queue can finish and
    /// release the bus. Returns [`BusError::AlreadyClosed`] on a second call.
    pub async fn close(&mut self) -> Result<(), BusError> {
        let Some(mut rx) = self.rx.take() else {
            return Err(BusError::AlreadyClosed);
        };

        let drain = tokio::spawn(async move {
            let mut discarded = 0usize;
            while rx.recv().await.is_some() {
                discarded += 1;
            }
            discarded
        });

        // Removing the registry entries drops the last sender, which ends the drain.
        self.bus.detach(self.id, &self.kinds).await;

        match drain.await {
            Ok(discarded) => {
                debug!(subscriber = self.id, discarded, "Subscription closed");
            }
            Err(e) => {
                warn!(subscriber = self.id, error = %e, "Subscription drain task failed");
            }
        }
        Ok(())
    }
}

impl Stream for Subscription {
    type Item = Envelope;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Envelope>> {
        match self.get_mut().rx.as_mut() {
            Some(rx) => rx.poll_recv(cx),
            None => Poll::Ready(None),
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        // Dropping the receiver first fails any send blocked on this queue.
        if self.rx.take().is_none() {
            return;
        }

        let bus = Arc::clone(&self.bus);
        let id = self.id;
        let kinds = std::mem::take(&mut self.kinds);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move { bus.detach(id, &kinds).await });
            }
            Err(_) => {
                if !bus.try_detach(id, &kinds) {
                    warn!(subscriber = id, "Dropped subscription outside a runtime while bus was busy");
                }
            }
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("kinds", &self.kinds)
            .field("closed", &self.is_closed())
            .finish()
    }
}
