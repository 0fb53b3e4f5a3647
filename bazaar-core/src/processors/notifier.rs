//! Notifier processor.
//!
//! The Notifier is responsible for:
//! - Subscribing to notification, chat, wallet and publish-status events
//! - Stamping each notification with a fresh id and its type tag
//! - Persisting notifications before handing them to the delivery sink
//! - Wrapping every other event in its client envelope and delivering it
//!
//! Handling is strictly sequential, so clients see events in the order they
//! were read from each subscription.

use std::sync::Arc;

use bazaar_sdk::objects::{
    BlockReceived, ChatMessage, ChatRead, ChatTyping, DisputeAccepted, DisputeClose, DisputeOpen,
    DisputeUpdate, Follow, NewOrder, Notification, OrderCancel, OrderCompletion,
    OrderConfirmation, OrderDeclined, OrderFulfillment, OrderFunded, OrderPaymentReceived,
    PublishFinished, PublishStarted, PublishStatus, PublishingError, Refund,
    SpendFromPaymentAddress, TransactionReceived, Unfollow, VendorFinalizedPayment, WalletMessage,
    WalletUpdate, Wrapper,
};
use kanau::processor::Processor;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::entities::{NotificationRecord, new_notification_id};
use crate::events::{Envelope, Event, EventBus, Kind, Subscription};
use crate::framework::{self, NotificationStore, StoreError};

/// Errors a delivery sink may report.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Nobody can receive messages anymore
    #[error("delivery channel closed")]
    Closed,

    /// The message could not be handed over
    #[error("delivery failed: {0}")]
    Failed(String),
}

/// Errors that can occur while handling a bus event.
#[derive(Debug, Error)]
pub enum NotifierError {
    /// Payload serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Storage error; the notification was not delivered
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Delivery sink error
    #[error("delivery error: {0}")]
    Delivery(#[from] DeliveryError),

    /// The envelope is not of a kind this handler covers
    #[error("unexpected event kind: {0}")]
    UnexpectedKind(Kind),
}

/// Delivery sink. Called once per wrapped event, in handling order.
pub type NotifyFn = Arc<dyn Fn(Wrapper) -> Result<(), DeliveryError> + Send + Sync>;

/// Emitted once the Notifier holds all of its subscriptions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotifierStarted;

impl Event for NotifierStarted {}

macro_rules! notification_kinds {
    ($($kind:ident),+ $(,)?) => {
        /// Kinds persisted as notification records.
        pub fn notification_kinds() -> Vec<Kind> {
            vec![$(Kind::of::<$kind>()),+]
        }

        fn to_notification(envelope: &Envelope) -> Option<Notification> {
            $(
                if let Some(event) = envelope.downcast_ref::<$kind>() {
                    return Some(Notification::from(event.clone()));
                }
            )+
            None
        }
    };
}

notification_kinds!(
    NewOrder,
    OrderFunded,
    OrderPaymentReceived,
    OrderConfirmation,
    OrderDeclined,
    OrderCancel,
    Refund,
    OrderFulfillment,
    OrderCompletion,
    DisputeOpen,
    DisputeUpdate,
    DisputeClose,
    DisputeAccepted,
    VendorFinalizedPayment,
    Follow,
    Unfollow,
);

pub fn chat_kinds() -> Vec<Kind> {
    vec![
        Kind::of::<ChatMessage>(),
        Kind::of::<ChatRead>(),
        Kind::of::<ChatTyping>(),
    ]
}

pub fn wallet_kinds() -> Vec<Kind> {
    vec![
        Kind::of::<BlockReceived>(),
        Kind::of::<TransactionReceived>(),
        Kind::of::<SpendFromPaymentAddress>(),
        Kind::of::<WalletUpdate>(),
    ]
}

pub fn status_kinds() -> Vec<Kind> {
    vec![
        Kind::of::<PublishStarted>(),
        Kind::of::<PublishFinished>(),
        Kind::of::<PublishingError>(),
    ]
}

/// Envelope for events delivered without persistence.
fn passthrough_wrapper(envelope: &Envelope) -> Option<Wrapper> {
    if let Some(event) = envelope.downcast_ref::<ChatMessage>() {
        return Some(Wrapper::ChatMessage(event.clone()));
    }
    if let Some(event) = envelope.downcast_ref::<ChatRead>() {
        return Some(Wrapper::MessageRead(event.clone()));
    }
    if let Some(event) = envelope.downcast_ref::<ChatTyping>() {
        return Some(Wrapper::MessageTyping(event.clone()));
    }
    if let Some(event) = envelope.downcast_ref::<BlockReceived>() {
        return Some(Wrapper::Wallet(WalletMessage::Block(event.clone())));
    }
    if let Some(event) = envelope.downcast_ref::<TransactionReceived>() {
        return Some(Wrapper::Wallet(WalletMessage::Transaction(event.clone())));
    }
    if let Some(event) = envelope.downcast_ref::<SpendFromPaymentAddress>() {
        return Some(Wrapper::Wallet(WalletMessage::Spend(event.clone())));
    }
    if let Some(event) = envelope.downcast_ref::<WalletUpdate>() {
        return Some(Wrapper::WalletUpdate(event.clone()));
    }
    if envelope.is::<PublishStarted>() {
        return Some(Wrapper::Status(PublishStatus::Publishing));
    }
    if envelope.is::<PublishFinished>() {
        return Some(Wrapper::Status(PublishStatus::Complete));
    }
    if envelope.is::<PublishingError>() {
        return Some(Wrapper::Status(PublishStatus::Error));
    }
    None
}

/// A notification-class event read from the bus.
#[derive(Debug, Clone)]
pub struct NotificationEvent(pub Envelope);

/// A chat, wallet or publish-status event read from the bus.
#[derive(Debug, Clone)]
pub struct PassthroughEvent(pub Envelope);

/// Notifier turns bus events into client messages.
pub struct Notifier<S> {
    bus: EventBus,
    store: S,
    notify: NotifyFn,
}

impl<S: NotificationStore> Notifier<S> {
    /// Create a new Notifier.
    ///
    /// # Arguments
    ///
    /// * `bus` - Bus to subscribe on
    /// * `store` - Where notification records are written
    /// * `notify` - Delivery sink for wrapped messages
    pub fn new(bus: EventBus, store: S, notify: NotifyFn) -> Self {
        Self { bus, store, notify }
    }

    /// Run the Notifier until shutdown is signalled.
    ///
    /// A subscription that cannot be created is logged and its class of
    /// events is never handled; the others still run.
    pub async fn run(self, mut shutdown_rx: watch::Receiver<bool>) {
        info!("Notifier started");

        let mut notifications = self.open("notification", notification_kinds()).await;
        let mut chats = self.open("chat", chat_kinds()).await;
        let mut wallet = self.open("wallet", wallet_kinds()).await;
        let mut status = self.open("status", status_kinds()).await;

        self.bus.emit(NotifierStarted).await;

        while !*shutdown_rx.borrow() {
            tokio::select! {
                biased;

                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        info!("Notifier received shutdown signal");
                        break;
                    }
                }

                Some(envelope) = next_event(&mut notifications) => {
                    debug!(kind = %envelope.kind(), "Received notification event");
                    if let Err(e) = self.process(NotificationEvent(envelope)).await {
                        error!(error = %e, "Failed to handle notification");
                    }
                }

                Some(envelope) = next_event(&mut chats) => {
                    self.forward(envelope).await;
                }

                Some(envelope) = next_event(&mut wallet) => {
                    self.forward(envelope).await;
                }

                Some(envelope) = next_event(&mut status) => {
                    self.forward(envelope).await;
                }
            }
        }

        // Closed together: a publisher blocked on one full queue holds the bus
        // lock, so every queue must start draining before any close waits on it.
        tokio::join!(
            close_subscription(notifications),
            close_subscription(chats),
            close_subscription(wallet),
            close_subscription(status),
        );

        info!("Notifier shutdown complete");
    }

    async fn open(&self, channel: &'static str, kinds: Vec<Kind>) -> Option<Subscription> {
        match self.bus.subscribe(kinds).await {
            Ok(subscription) => Some(subscription),
            Err(e) => {
                error!(channel, error = %e, "Failed to subscribe, events will not be handled");
                None
            }
        }
    }

    async fn forward(&self, envelope: Envelope) {
        let kind = envelope.kind();
        match self.process(PassthroughEvent(envelope)).await {
            Ok(key) => debug!(kind = %kind, key, "Delivered event"),
            Err(e) => error!(kind = %kind, error = %e, "Failed to deliver event"),
        }
    }
}

/// Next envelope from `subscription`; never resolves when there is none.
async fn next_event(subscription: &mut Option<Subscription>) -> Option<Envelope> {
    match subscription {
        Some(subscription) => subscription.recv().await,
        None => std::future::pending().await,
    }
}

async fn close_subscription(subscription: Option<Subscription>) {
    if let Some(mut subscription) = subscription {
        if let Err(e) = subscription.close().await {
            warn!(subscriber = subscription.id(), error = %e, "Failed to close subscription");
        }
    }
}

// ---------------------------------------------------------------------------
// Processor trait implementations
// ---------------------------------------------------------------------------

impl<S: NotificationStore> Processor<NotificationEvent> for Notifier<S> {
    type Output = String;
    type Error = NotifierError;

    /// Stamps, persists and delivers one notification. Returns its id.
    async fn process(&self, event: NotificationEvent) -> Result<String, NotifierError> {
        let NotificationEvent(envelope) = event;
        let Some(mut notification) = to_notification(&envelope) else {
            return Err(NotifierError::UnexpectedKind(envelope.kind()));
        };

        let id = new_notification_id();
        notification.stamp(id.clone());

        let record = NotificationRecord::from_notification(&notification)?;
        framework::update(&self.store, move |tx| {
            Box::pin(async move { tx.save(&record).await })
        })
        .await?;

        debug!(id = %id, kind = notification.tag(), "Notification persisted");
        (self.notify)(Wrapper::Notification(notification))?;
        Ok(id)
    }
}

impl<S: NotificationStore> Processor<PassthroughEvent> for Notifier<S> {
    type Output = &'static str;
    type Error = NotifierError;

    /// Wraps and delivers one event. Returns the envelope key.
    async fn process(&self, event: PassthroughEvent) -> Result<&'static str, NotifierError> {
        let PassthroughEvent(envelope) = event;
        let wrapper = passthrough_wrapper(&envelope)
            .ok_or_else(|| NotifierError::UnexpectedKind(envelope.kind()))?;
        let key = wrapper.key();
        (self.notify)(wrapper)?;
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::time::Duration;

    use async_trait::async_trait;
    use bazaar_sdk::objects::PeerConnected;
    use tokio::sync::mpsc;
    use tokio::task::JoinHandle;
    use tokio::time::timeout;

    use super::*;
    use crate::framework::{MemoryStore, Transaction};

    const WAIT: Duration = Duration::from_secs(2);

    fn capture() -> (NotifyFn, mpsc::UnboundedReceiver<Wrapper>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let notify: NotifyFn = Arc::new(move |wrapper| {
            tx.send(wrapper).map_err(|_| DeliveryError::Closed)
        });
        (notify, rx)
    }

    struct Running {
        bus: EventBus,
        shutdown_tx: watch::Sender<bool>,
        handle: JoinHandle<()>,
    }

    async fn start<S: NotificationStore + 'static>(store: S, notify: NotifyFn) -> Running {
        let bus = EventBus::new();
        let mut ready = bus.subscribe(Kind::of::<NotifierStarted>()).await.unwrap();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let notifier = Notifier::new(bus.clone(), store, notify);
        let handle = tokio::spawn(notifier.run(shutdown_rx));
        timeout(WAIT, ready.recv()).await.unwrap().unwrap();
        ready.close().await.unwrap();
        Running {
            bus,
            shutdown_tx,
            handle,
        }
    }

    impl Running {
        async fn stop(self) {
            self.shutdown_tx.send(true).unwrap();
            timeout(WAIT, self.handle).await.unwrap().unwrap();
        }
    }

    async fn next(rx: &mut mpsc::UnboundedReceiver<Wrapper>) -> Wrapper {
        timeout(WAIT, rx.recv()).await.unwrap().unwrap()
    }

    fn one_of_each_notification() -> Vec<Envelope> {
        vec![
            Envelope::new(NewOrder::default()),
            Envelope::new(OrderFunded::default()),
            Envelope::new(OrderPaymentReceived::default()),
            Envelope::new(OrderConfirmation::default()),
            Envelope::new(OrderDeclined::default()),
            Envelope::new(OrderCancel::default()),
            Envelope::new(Refund::default()),
            Envelope::new(OrderFulfillment::default()),
            Envelope::new(OrderCompletion::default()),
            Envelope::new(DisputeOpen::default()),
            Envelope::new(DisputeUpdate::default()),
            Envelope::new(DisputeClose::default()),
            Envelope::new(DisputeAccepted::default()),
            Envelope::new(VendorFinalizedPayment::default()),
            Envelope::new(Follow::default()),
            Envelope::new(Unfollow::default()),
        ]
    }

    fn is_lower_hex(s: &str) -> bool {
        s.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
    }

    #[tokio::test]
    async fn test_every_notification_kind_is_stamped_persisted_and_delivered() {
        let store = MemoryStore::new();
        let (notify, mut rx) = capture();
        let running = start(store.clone(), notify).await;

        let envelopes = one_of_each_notification();
        assert_eq!(envelopes.len(), Notification::TAGS.len());
        for envelope in envelopes {
            running.bus.emit_envelope(envelope).await;
        }

        let mut ids = HashSet::new();
        for tag in Notification::TAGS {
            let Wrapper::Notification(notification) = next(&mut rx).await else {
                panic!("expected a notification wrapper");
            };
            assert_eq!(notification.tag(), *tag);
            assert_eq!(notification.typ(), *tag);
            assert_eq!(notification.id().len(), 40);
            assert!(is_lower_hex(notification.id()));
            assert!(ids.insert(notification.id().to_owned()), "duplicate id");

            let record = store.get(notification.id()).unwrap();
            assert_eq!(record.notification_type, *tag);
            assert!(!record.read);
            assert_eq!(record.notification().unwrap(), notification);
        }
        assert_eq!(store.len(), 16);

        running.stop().await;
    }

    #[tokio::test]
    async fn test_record_exists_before_delivery() {
        let store = MemoryStore::new();
        let (seen_tx, mut seen_rx) = mpsc::unbounded_channel();
        let probe = store.clone();
        let notify: NotifyFn = Arc::new(move |wrapper| {
            if let Wrapper::Notification(notification) = wrapper {
                let _ = seen_tx.send(probe.get(notification.id()).is_some());
            }
            Ok(())
        });
        let running = start(store, notify).await;

        running
            .bus
            .emit(Follow {
                peer_id: "QmFollower".to_string(),
                ..Default::default()
            })
            .await;

        assert!(timeout(WAIT, seen_rx.recv()).await.unwrap().unwrap());
        running.stop().await;
    }

    #[tokio::test]
    async fn test_chat_events_pass_through_in_order() {
        let store = MemoryStore::new();
        let (notify, mut rx) = capture();
        let running = start(store.clone(), notify).await;

        running
            .bus
            .emit(ChatMessage {
                message_id: "m1".to_string(),
                message: "hello".to_string(),
                ..Default::default()
            })
            .await;
        running.bus.emit(ChatTyping::default()).await;
        running
            .bus
            .emit(ChatRead {
                message_id: "m1".to_string(),
                ..Default::default()
            })
            .await;

        let Wrapper::ChatMessage(message) = next(&mut rx).await else {
            panic!("expected chatMessage");
        };
        assert_eq!(message.message, "hello");
        assert!(matches!(next(&mut rx).await, Wrapper::MessageTyping(_)));
        assert!(matches!(next(&mut rx).await, Wrapper::MessageRead(read) if read.message_id == "m1"));
        assert!(store.is_empty());

        running.stop().await;
    }

    #[tokio::test]
    async fn test_wallet_and_status_wrappers() {
        let (notify, mut rx) = capture();
        let running = start(MemoryStore::new(), notify).await;

        running.bus.emit(BlockReceived::default()).await;
        running.bus.emit(TransactionReceived::default()).await;
        running.bus.emit(SpendFromPaymentAddress::default()).await;
        running.bus.emit(WalletUpdate::default()).await;
        running.bus.emit(PublishStarted { id: 1 }).await;
        running.bus.emit(PublishFinished { id: 1 }).await;
        running
            .bus
            .emit(PublishingError {
                error: "dht unreachable".to_string(),
            })
            .await;

        assert!(matches!(
            next(&mut rx).await,
            Wrapper::Wallet(WalletMessage::Block(_))
        ));
        assert!(matches!(
            next(&mut rx).await,
            Wrapper::Wallet(WalletMessage::Transaction(_))
        ));
        assert!(matches!(
            next(&mut rx).await,
            Wrapper::Wallet(WalletMessage::Spend(_))
        ));
        assert!(matches!(next(&mut rx).await, Wrapper::WalletUpdate(_)));
        assert_eq!(next(&mut rx).await, Wrapper::Status(PublishStatus::Publishing));
        assert_eq!(next(&mut rx).await, Wrapper::Status(PublishStatus::Complete));
        assert_eq!(next(&mut rx).await, Wrapper::Status(PublishStatus::Error));

        running.stop().await;
    }

    #[tokio::test]
    async fn test_unrelated_events_are_ignored() {
        let (notify, mut rx) = capture();
        let running = start(MemoryStore::new(), notify).await;

        running
            .bus
            .emit(PeerConnected {
                peer: "QmPeer".to_string(),
            })
            .await;
        assert_eq!(running.bus.subscriber_count(Kind::of::<PeerConnected>()).await, 0);
        assert!(timeout(Duration::from_millis(50), rx.recv()).await.is_err());

        running.stop().await;
    }

    struct BrokenStore;

    #[async_trait]
    impl NotificationStore for BrokenStore {
        async fn begin(&self) -> Result<Box<dyn Transaction>, StoreError> {
            Err(StoreError::TransactionClosed)
        }

        async fn recent(&self, _limit: usize) -> Result<Vec<NotificationRecord>, StoreError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_persistence_failure_skips_delivery() {
        let (notify, mut rx) = capture();
        let running = start(BrokenStore, notify).await;

        running.bus.emit(Follow::default()).await;
        running.bus.emit(ChatTyping::default()).await;

        // The chat event still flows; the notification never does.
        assert!(matches!(next(&mut rx).await, Wrapper::MessageTyping(_)));
        assert!(timeout(Duration::from_millis(50), rx.recv()).await.is_err());

        running.stop().await;
    }

    #[tokio::test]
    async fn test_delivery_failure_is_not_fatal() {
        let store = MemoryStore::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let notify: NotifyFn = Arc::new(move |wrapper| {
            if counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst) == 0 {
                return Err(DeliveryError::Failed("socket reset".to_string()));
            }
            tx.send(wrapper).map_err(|_| DeliveryError::Closed)
        });
        let running = start(store.clone(), notify).await;

        running.bus.emit(Follow::default()).await;
        running.bus.emit(Unfollow::default()).await;

        let Wrapper::Notification(delivered) = next(&mut rx).await else {
            panic!("expected a notification wrapper");
        };
        assert_eq!(delivered.tag(), "Unfollow");
        // Both records were written even though the first delivery failed.
        assert_eq!(store.len(), 2);

        running.stop().await;
    }

    #[tokio::test]
    async fn test_shutdown_releases_subscriptions() {
        let (notify, _rx) = capture();
        let running = start(MemoryStore::new(), notify).await;
        let bus = running.bus.clone();
        assert_eq!(bus.subscriber_count(Kind::of::<NewOrder>()).await, 1);
        assert_eq!(bus.subscriber_count(Kind::of::<ChatMessage>()).await, 1);

        running.stop().await;

        for kind in notification_kinds()
            .into_iter()
            .chain(chat_kinds())
            .chain(wallet_kinds())
            .chain(status_kinds())
        {
            assert_eq!(bus.subscriber_count(kind).await, 0, "{kind} still subscribed");
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_shutdown_with_publisher_blocked_on_chat_queue() {
        let slow: NotifyFn = Arc::new(|_| {
            std::thread::sleep(Duration::from_millis(20));
            Ok(())
        });
        let running = start(MemoryStore::new(), slow).await;

        let bus = running.bus.clone();
        let publisher = tokio::spawn(async move {
            for _ in 0..40 {
                bus.emit(ChatTyping::default()).await;
            }
        });

        // Let the chat queue fill so the publisher blocks while holding the bus.
        tokio::time::sleep(Duration::from_millis(100)).await;
        running.shutdown_tx.send(true).unwrap();

        timeout(WAIT, running.handle)
            .await
            .expect("notifier did not shut down")
            .unwrap();
        timeout(WAIT, publisher)
            .await
            .expect("publisher stayed blocked")
            .unwrap();
        assert_eq!(running.bus.subscriber_count(Kind::of::<ChatTyping>()).await, 0);
    }

    #[tokio::test]
    async fn test_process_rejects_foreign_kinds() {
        let (notify, _rx) = capture();
        let notifier = Notifier::new(EventBus::new(), MemoryStore::new(), notify);

        let err = notifier
            .process(NotificationEvent(Envelope::new(ChatTyping::default())))
            .await
            .unwrap_err();
        assert!(matches!(err, NotifierError::UnexpectedKind(kind) if kind == Kind::of::<ChatTyping>()));

        let err = notifier
            .process(PassthroughEvent(Envelope::new(Follow::default())))
            .await
            .unwrap_err();
        assert!(matches!(err, NotifierError::UnexpectedKind(_)));
    }

    #[tokio::test]
    async fn test_process_returns_stamped_id() {
        let store = MemoryStore::new();
        let (notify, mut rx) = capture();
        let notifier = Notifier::new(EventBus::new(), store.clone(), notify);

        let id = notifier
            .process(NotificationEvent(Envelope::new(OrderCancel::default())))
            .await
            .unwrap();

        assert_eq!(store.records()[0].id, id);
        let Wrapper::Notification(notification) = rx.recv().await.unwrap() else {
            panic!("expected a notification wrapper");
        };
        assert_eq!(notification.id(), id);
    }
}
