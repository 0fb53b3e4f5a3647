//! Subscription options.
//!
//! Options are applied in order when a subscription is created. A rejected
//! option fails the whole subscription.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::error::BusError;
use super::kind::{Envelope, Event, Kind};

/// Default buffer size of a subscription queue.
///
/// A publisher blocks once a subscriber has this many undelivered events.
pub const DEFAULT_CHANNEL_BUFFER: usize = 16;

type Predicate = Arc<dyn Fn(&Envelope) -> bool + Send + Sync>;

/// A setting applied to a subscription at creation.
#[derive(Clone)]
pub enum SubscriptionOpt {
    /// Capacity of the subscriber's queue. Must be at least 1.
    BufSize(usize),
    /// Deliver only events whose named fields equal the given strings.
    MatchFields(BTreeMap<String, String>),
    /// Deliver only events of `kind` accepted by the predicate. Events of
    /// other kinds are unaffected.
    Filter { kind: Kind, predicate: Predicate },
}

impl fmt::Debug for SubscriptionOpt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BufSize(n) => f.debug_tuple("BufSize").field(n).finish(),
            Self::MatchFields(fields) => f.debug_tuple("MatchFields").field(fields).finish(),
            Self::Filter { kind, .. } => f.debug_struct("Filter").field("kind", kind).finish(),
        }
    }
}

pub fn buf_size(n: usize) -> SubscriptionOpt {
    SubscriptionOpt::BufSize(n)
}

/// Requires every listed field to equal its value. A field the event does
/// not expose compares as the empty string.
pub fn match_fields<I, K, V>(fields: I) -> SubscriptionOpt
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    SubscriptionOpt::MatchFields(
        fields
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect(),
    )
}

/// Typed predicate over events of kind `E`.
pub fn filter<E, F>(predicate: F) -> SubscriptionOpt
where
    E: Event,
    F: Fn(&E) -> bool + Send + Sync + 'static,
{
    SubscriptionOpt::Filter {
        kind: Kind::of::<E>(),
        predicate: Arc::new(move |envelope: &Envelope| {
            envelope.downcast_ref::<E>().is_none_or(&predicate)
        }),
    }
}

/// Resolved options of one subscription.
#[derive(Clone)]
pub(crate) struct SubSettings {
    pub(crate) buffer: usize,
    match_fields: BTreeMap<String, String>,
    filters: Vec<(Kind, Predicate)>,
}

impl Default for SubSettings {
    fn default() -> Self {
        Self {
            buffer: DEFAULT_CHANNEL_BUFFER,
            match_fields: BTreeMap::new(),
            filters: Vec::new(),
        }
    }
}

impl SubSettings {
    pub(crate) fn from_opts(opts: Vec<SubscriptionOpt>) -> Result<Self, BusError> {
        let mut settings = Self::default();
        for opt in opts {
            settings.apply(opt)?;
        }
        Ok(settings)
    }

    fn apply(&mut self, opt: SubscriptionOpt) -> Result<(), BusError> {
        match opt {
            SubscriptionOpt::BufSize(0) => Err(BusError::OptionRejected {
                option: "buf_size",
                reason: "buffer must hold at least one event".to_string(),
            }),
            SubscriptionOpt::BufSize(n) => {
                self.buffer = n;
                Ok(())
            }
            SubscriptionOpt::MatchFields(fields) => {
                for (name, value) in fields {
                    match self.match_fields.get(&name) {
                        Some(existing) if *existing != value => {
                            return Err(BusError::OptionRejected {
                                option: "match_fields",
                                reason: format!(
                                    "field `{name}` already required to be {existing:?}"
                                ),
                            });
                        }
                        _ => {
                            self.match_fields.insert(name, value);
                        }
                    }
                }
                Ok(())
            }
            SubscriptionOpt::Filter { kind, predicate } => {
                self.filters.push((kind, predicate));
                Ok(())
            }
        }
    }

    /// Whether `envelope` passes every field requirement and every filter
    /// registered for its kind.
    pub(crate) fn accepts(&self, envelope: &Envelope) -> bool {
        let fields_match = self.match_fields.iter().all(|(name, expected)| {
            envelope.field(name).unwrap_or_default() == *expected
        });
        fields_match
            && self
                .filters
                .iter()
                .filter(|(kind, _)| *kind == envelope.kind())
                .all(|(_, predicate)| predicate(envelope))
    }
}
