//! Payload types shared between a bazaar node and its clients.
//!
//! Everything in this crate is plain data: the events that travel on the
//! node's in-process bus, the [`Notification`](objects::Notification) sum
//! type over the persisted notification catalog, and the single-key
//! envelopes ([`Wrapper`](objects::Wrapper)) handed to delivery sinks.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]
#![forbid(unsafe_code)]

pub mod objects;
