//! The type-indexed event bus.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{Mutex, mpsc};
use tracing::{debug, trace};

use super::error::BusError;
use super::kind::{Envelope, Event, IntoKinds, Kind};
use super::options::{SubSettings, SubscriptionOpt};
use super::subscription::Subscription;

pub(crate) type Index = HashMap<Kind, Vec<Arc<Subscriber>>>;

/// Registry entry for one subscription. Holds the only sender of the
/// subscription's queue, so removing it from every list closes the queue.
pub(crate) struct Subscriber {
    pub(crate) id: u64,
    tx: mpsc::Sender<Envelope>,
    settings: SubSettings,
}

#[derive(Default)]
pub(crate) struct BusInner {
    subscribers: Mutex<Index>,
    next_id: AtomicU64,
}

impl BusInner {
    pub(crate) async fn detach(&self, id: u64, kinds: &[Kind]) {
        let mut index = self.subscribers.lock().await;
        detach_locked(&mut index, id, kinds);
    }

    /// Non-blocking variant for contexts without a runtime.
    pub(crate) fn try_detach(&self, id: u64, kinds: &[Kind]) -> bool {
        match self.subscribers.try_lock() {
            Ok(mut index) => {
                detach_locked(&mut index, id, kinds);
                true
            }
            Err(_) => false,
        }
    }
}

fn detach_locked(index: &mut Index, id: u64, kinds: &[Kind]) {
    for kind in kinds {
        if let Some(list) = index.get_mut(kind) {
            list.retain(|sub| sub.id != id);
            if list.is_empty() {
                index.remove(kind);
            }
        }
    }
}

/// In-process publish/subscribe hub routing events by their concrete type.
///
/// Cloning the bus yields another handle to the same registry.
///
/// Delivery is synchronous with respect to the publisher: [`emit`](Self::emit)
/// returns once every matching subscriber has the event in its queue, and
/// waits while any of those queues is full. The registry lock is held for the
/// whole delivery, so a given subscriber sees events in emission order and
/// subscribe/close wait for in-flight emits.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to `kinds` with default options.
    pub async fn subscribe(&self, kinds: impl IntoKinds) -> Result<Subscription, BusError> {
        self.subscribe_with(kinds, Vec::new()).await
    }

    /// Subscribes to `kinds`.
    ///
    /// Duplicate kinds collapse. An empty set is rejected with
    /// [`BusError::InvalidSubscriberKind`].
    pub async fn subscribe_with(
        &self,
        kinds: impl IntoKinds,
        opts: Vec<SubscriptionOpt>,
    ) -> Result<Subscription, BusError> {
        let mut kinds = kinds.into_kinds();
        let mut seen = Vec::with_capacity(kinds.len());
        kinds.retain(|kind| {
            if seen.contains(kind) {
                false
            } else {
                seen.push(*kind);
                true
            }
        });
        if kinds.is_empty() {
            return Err(BusError::InvalidSubscriberKind(
                "subscription names no event kinds".to_string(),
            ));
        }

        let settings = SubSettings::from_opts(opts)?;
        let (tx, rx) = mpsc::channel(settings.buffer);
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let subscriber = Arc::new(Subscriber { id, tx, settings });

        {
            let mut index = self.inner.subscribers.lock().await;
            for kind in &kinds {
                index.entry(*kind).or_default().push(Arc::clone(&subscriber));
            }
        }

        debug!(subscriber = id, kinds = ?kinds, "Subscription created");
        Ok(Subscription::new(id, kinds, rx, Arc::clone(&self.inner)))
    }

    /// Publishes `event` to every subscriber of its kind.
    pub async fn emit<E: Event>(&self, event: E) {
        self.emit_envelope(Envelope::new(event)).await;
    }

    /// Publishes an already wrapped event. Subscribers of its kind receive
    /// a clone of the same envelope.
    pub async fn emit_envelope(&self, envelope: Envelope) {
        let index = self.inner.subscribers.lock().await;
        let Some(subscribers) = index.get(&envelope.kind()) else {
            trace!(kind = %envelope.kind(), "No subscribers for event");
            return;
        };

        for subscriber in subscribers {
            if !subscriber.settings.accepts(&envelope) {
                trace!(subscriber = subscriber.id, kind = %envelope.kind(), "Event filtered out");
                continue;
            }
            if subscriber.tx.send(envelope.clone()).await.is_err() {
                // Receiver already dropped; the subscription is being detached.
                trace!(
                    subscriber = subscriber.id,
                    kind = %envelope.kind(),
                    "Skipping detached subscriber"
                );
            }
        }
    }

    /// Number of live subscriptions that include `kind`.
    pub async fn subscriber_count(&self, kind: Kind) -> usize {
        let index = self.inner.subscribers.lock().await;
        index.get(&kind).map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::timeout;
    use tokio_stream::StreamExt;

    use super::*;
    use crate::events::options::{buf_size, filter, match_fields};

    #[derive(Debug, Clone, PartialEq)]
    struct Tick(u32);

    impl Event for Tick {}

    #[derive(Debug, Clone, PartialEq)]
    struct Quote {
        symbol: String,
    }

    impl Event for Quote {
        fn field(&self, name: &str) -> Option<String> {
            match name {
                "symbol" => Some(self.symbol.clone()),
                _ => None,
            }
        }
    }

    fn quote(symbol: &str) -> Quote {
        Quote {
            symbol: symbol.to_string(),
        }
    }

    const WAIT: Duration = Duration::from_secs(2);

    #[tokio::test]
    async fn test_routes_by_type() {
        let bus = EventBus::new();
        let mut ticks = bus.subscribe(Kind::of::<Tick>()).await.unwrap();
        let mut quotes = bus.subscribe(Kind::of::<Quote>()).await.unwrap();

        bus.emit(Tick(1)).await;
        bus.emit(quote("BTC")).await;

        let got = ticks.recv().await.unwrap();
        assert_eq!(got.downcast_ref::<Tick>(), Some(&Tick(1)));
        let got = quotes.recv().await.unwrap();
        assert_eq!(got.downcast_ref::<Quote>(), Some(&quote("BTC")));

        assert!(timeout(Duration::from_millis(50), ticks.recv()).await.is_err());
        assert!(timeout(Duration::from_millis(50), quotes.recv()).await.is_err());

        ticks.close().await.unwrap();
        quotes.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_multi_kind_subscription_preserves_order() {
        let bus = EventBus::new();
        let mut sub = bus
            .subscribe([Kind::of::<Tick>(), Kind::of::<Quote>()])
            .await
            .unwrap();
        assert_eq!(sub.kinds().len(), 2);

        bus.emit(Tick(1)).await;
        bus.emit(quote("A")).await;
        bus.emit(Tick(2)).await;

        let first = sub.recv().await.unwrap();
        let second = sub.recv().await.unwrap();
        let third = sub.recv().await.unwrap();
        assert_eq!(first.downcast_ref::<Tick>(), Some(&Tick(1)));
        assert_eq!(second.downcast_ref::<Quote>(), Some(&quote("A")));
        assert_eq!(third.downcast_ref::<Tick>(), Some(&Tick(2)));
    }

    #[tokio::test]
    async fn test_every_subscriber_gets_a_copy() {
        let bus = EventBus::new();
        let mut a = bus.subscribe(Kind::of::<Tick>()).await.unwrap();
        let mut b = bus.subscribe(Kind::of::<Tick>()).await.unwrap();
        bus.emit(Tick(9)).await;
        assert!(a.recv().await.unwrap().is::<Tick>());
        assert!(b.recv().await.unwrap().is::<Tick>());
    }

    #[tokio::test]
    async fn test_emit_without_subscribers_is_noop() {
        let bus = EventBus::new();
        timeout(WAIT, bus.emit(Tick(1))).await.unwrap();
        assert_eq!(bus.subscriber_count(Kind::of::<Tick>()).await, 0);
    }

    #[tokio::test]
    async fn test_empty_kind_set_rejected() {
        let bus = EventBus::new();
        let err = bus.subscribe(Vec::new()).await.err().unwrap();
        assert!(matches!(err, BusError::InvalidSubscriberKind(_)));
    }

    #[tokio::test]
    async fn test_duplicate_kinds_collapse() {
        let bus = EventBus::new();
        let mut sub = bus
            .subscribe([Kind::of::<Tick>(), Kind::of::<Tick>()])
            .await
            .unwrap();
        assert_eq!(sub.kinds(), &[Kind::of::<Tick>()]);
        assert_eq!(bus.subscriber_count(Kind::of::<Tick>()).await, 1);

        bus.emit(Tick(1)).await;
        assert!(sub.recv().await.is_some());
        assert!(timeout(Duration::from_millis(50), sub.recv()).await.is_err());
    }

    #[tokio::test]
    async fn test_rejected_option_fails_subscription() {
        let bus = EventBus::new();
        let err = bus
            .subscribe_with(Kind::of::<Tick>(), vec![buf_size(0)])
            .await
            .err()
            .unwrap();
        assert!(matches!(err, BusError::OptionRejected { .. }));
        assert_eq!(bus.subscriber_count(Kind::of::<Tick>()).await, 0);
    }

    #[tokio::test]
    async fn test_match_fields_filters_delivery() {
        let bus = EventBus::new();
        let mut btc = bus
            .subscribe_with(Kind::of::<Quote>(), vec![match_fields([("symbol", "BTC")])])
            .await
            .unwrap();

        bus.emit(quote("LTC")).await;
        bus.emit(quote("BTC")).await;

        let got = btc.recv().await.unwrap();
        assert_eq!(got.field("symbol").as_deref(), Some("BTC"));
        assert!(timeout(Duration::from_millis(50), btc.recv()).await.is_err());
    }

    #[tokio::test]
    async fn test_typed_filter() {
        let bus = EventBus::new();
        let mut even = bus
            .subscribe_with(
                [Kind::of::<Tick>(), Kind::of::<Quote>()],
                vec![filter(|t: &Tick| t.0 % 2 == 0)],
            )
            .await
            .unwrap();

        for n in 1..=4 {
            bus.emit(Tick(n)).await;
        }
        bus.emit(quote("ANY")).await;

        let got: Vec<_> = (&mut even).take(3).collect().await;
        assert_eq!(got[0].downcast_ref::<Tick>(), Some(&Tick(2)));
        assert_eq!(got[1].downcast_ref::<Tick>(), Some(&Tick(4)));
        assert!(got[2].is::<Quote>());
    }

    #[tokio::test]
    async fn test_full_queue_blocks_publisher() {
        let bus = EventBus::new();
        let mut sub = bus
            .subscribe_with(Kind::of::<Tick>(), vec![buf_size(1)])
            .await
            .unwrap();

        bus.emit(Tick(1)).await;
        let publisher = bus.clone();
        let blocked = tokio::spawn(async move { publisher.emit(Tick(2)).await });

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!blocked.is_finished());

        assert_eq!(sub.recv().await.unwrap().downcast_ref::<Tick>(), Some(&Tick(1)));
        timeout(WAIT, blocked).await.unwrap().unwrap();
        assert_eq!(sub.recv().await.unwrap().downcast_ref::<Tick>(), Some(&Tick(2)));
    }

    #[tokio::test]
    async fn test_close_releases_blocked_emit() {
        let bus = EventBus::new();
        let mut sub = bus
            .subscribe_with(Kind::of::<Tick>(), vec![buf_size(1)])
            .await
            .unwrap();

        bus.emit(Tick(1)).await;
        let publisher = bus.clone();
        let second = tokio::spawn(async move { publisher.emit(Tick(2)).await });
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!second.is_finished());

        timeout(WAIT, sub.close()).await.unwrap().unwrap();
        timeout(WAIT, second).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_close_unblocks_publisher_and_detaches() {
        let bus = EventBus::new();
        let mut sub = bus
            .subscribe_with(Kind::of::<Tick>(), vec![buf_size(1)])
            .await
            .unwrap();

        let publisher = bus.clone();
        let flood = tokio::spawn(async move {
            for n in 0..10 {
                publisher.emit(Tick(n)).await;
            }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;

        timeout(WAIT, sub.close()).await.unwrap().unwrap();
        timeout(WAIT, flood).await.unwrap().unwrap();

        assert_eq!(bus.subscriber_count(Kind::of::<Tick>()).await, 0);
        assert!(sub.recv().await.is_none());
        assert!(matches!(sub.close().await, Err(BusError::AlreadyClosed)));
    }

    #[tokio::test]
    async fn test_close_leaves_other_subscribers() {
        let bus = EventBus::new();
        let mut gone = bus.subscribe(Kind::of::<Tick>()).await.unwrap();
        let mut kept = bus.subscribe(Kind::of::<Tick>()).await.unwrap();
        gone.close().await.unwrap();

        assert_eq!(bus.subscriber_count(Kind::of::<Tick>()).await, 1);
        bus.emit(Tick(5)).await;
        assert!(kept.recv().await.unwrap().is::<Tick>());
    }

    #[tokio::test]
    async fn test_drop_detaches() {
        let bus = EventBus::new();
        let sub = bus.subscribe(Kind::of::<Tick>()).await.unwrap();
        assert_eq!(bus.subscriber_count(Kind::of::<Tick>()).await, 1);
        drop(sub);

        timeout(WAIT, async {
            while bus.subscriber_count(Kind::of::<Tick>()).await != 0 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
        timeout(WAIT, bus.emit(Tick(1))).await.unwrap();
    }

    #[tokio::test]
    async fn test_concurrent_publishers() {
        let bus = EventBus::new();
        let mut sub = bus.subscribe(Kind::of::<Tick>()).await.unwrap();

        let mut handles = Vec::new();
        for p in 0..4u32 {
            let bus = bus.clone();
            handles.push(tokio::spawn(async move {
                for n in 0..25u32 {
                    bus.emit(Tick(p * 100 + n)).await;
                }
            }));
        }

        let mut last_seen = [None::<u32>; 4];
        for _ in 0..100 {
            let envelope = timeout(WAIT, sub.recv()).await.unwrap().unwrap();
            let Tick(n) = *envelope.downcast_ref::<Tick>().unwrap();
            let (p, seq) = ((n / 100) as usize, n % 100);
            if let Some(prev) = last_seen[p] {
                assert!(seq > prev, "publisher {p} out of order");
            }
            last_seen[p] = Some(seq);
        }
        for handle in handles {
            handle.await.unwrap();
        }
    }
}
