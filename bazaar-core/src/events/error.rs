use thiserror::Error;

/// Errors returned by the event bus.
#[derive(Debug, Error)]
pub enum BusError {
    /// The subscription named no kinds.
    #[error("invalid subscriber kind: {0}")]
    InvalidSubscriberKind(String),

    /// A subscription option could not be applied.
    #[error("subscription option `{option}` rejected: {reason}")]
    OptionRejected {
        option: &'static str,
        reason: String,
    },

    /// `close` was called on a subscription that is already closed.
    #[error("subscription already closed")]
    AlreadyClosed,
}
