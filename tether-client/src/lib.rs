//! JSON-RPC 2.0 client correlation layer over pluggable transports
//!
//! This crate implements the client side of the protocol engine without
//! committing to any transport. Two client variants cover the two
//! transport families:
//!
//! - [`RequestClient`]: half-duplex, for one-round-trip channels (HTTP
//!   fetch and friends). Stateless between calls.
//! - [`StreamClient`]: full-duplex, for socket-like channels. Owns the
//!   pending-call table and subscriber set, correlates out-of-order
//!   responses by call id, and supports notifications and long-lived
//!   subscriptions.
//!
//! Both implement the [`Client`] base contract: `can_subscribe`,
//! `create_id`, and `request`.
//!
//! Transports plug in through the [`transport::SingleShot`] and
//! [`transport::Duplex`] contracts; see the `transport` module.

pub mod base;
pub mod transport;

mod pending;
mod request;
mod stream;
mod subscribers;

pub use base::{fresh_id, Client};
pub use request::RequestClient;
pub use stream::{Events, Phase, StreamClient, Subscription};
