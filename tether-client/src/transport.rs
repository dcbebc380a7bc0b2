//! Transport collaborator contracts
//!
//! The clients in this crate never open sockets themselves. They are
//! written against two small contracts that concrete transports (HTTP
//! fetch, IPC sockets, WebSocket, in-process channels) implement
//! elsewhere:
//!
//! - [`SingleShot`]: one request envelope in, one reply envelope out.
//!   Enough for half-duplex clients.
//! - [`Duplex`]: an outbound sink plus a one-time takeable inbound event
//!   stream with explicit failure/completion signals. Required by the
//!   stream client.

use async_trait::async_trait;
use std::future::Future;
use tether_core::{Envelope, Result};
use tokio::sync::mpsc;

/// Single round-trip transport: send one envelope, receive its reply.
#[async_trait]
pub trait SingleShot: Send + Sync {
    /// Perform one send-and-receive exchange.
    async fn send(&self, request: Envelope) -> Result<Envelope>;
}

/// Adapt an async function into a [`SingleShot`] transport.
///
/// # Examples
///
/// ```rust
/// use tether_client::transport::fetch_fn;
/// use tether_core::{Envelope, Id};
/// use serde_json::json;
///
/// let fetch = fetch_fn(|req: Envelope| async move {
///     let id = req.id.unwrap_or(Id::Null);
///     Ok(Envelope::success(id, json!("pong")))
/// });
/// ```
pub fn fetch_fn<F, Fut>(f: F) -> FetchFn<F>
where
    F: Fn(Envelope) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Envelope>> + Send + 'static,
{
    FetchFn(f)
}

/// Wrapper produced by [`fetch_fn`].
pub struct FetchFn<F>(F);

#[async_trait]
impl<F, Fut> SingleShot for FetchFn<F>
where
    F: Fn(Envelope) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Envelope>> + Send + 'static,
{
    async fn send(&self, request: Envelope) -> Result<Envelope> {
        (self.0)(request).await
    }
}

/// One event on a duplex transport's inbound side.
#[derive(Debug)]
pub enum TransportEvent {
    /// An envelope arrived from the peer.
    Message(Envelope),
    /// The transport failed; no further events will follow.
    Failed(String),
    /// The transport completed gracefully; no further events will follow.
    Completed,
}

/// Full-duplex transport: an outbound sink, an inbound event stream, and
/// a graceful-close signal.
///
/// The inbound stream is handed over exactly once: the first call to
/// [`incoming`](Duplex::incoming) returns the receiver, later calls
/// return `None`. The stream client relies on this to make `connect()`
/// idempotent.
#[async_trait]
pub trait Duplex: Send + Sync + 'static {
    /// Queue one envelope for delivery to the peer.
    async fn send(&self, envelope: Envelope) -> Result<()>;

    /// Take the inbound event stream. `None` once taken.
    fn incoming(&self) -> Option<mpsc::UnboundedReceiver<TransportEvent>>;

    /// Ask the transport to finish gracefully. The transport answers by
    /// emitting [`TransportEvent::Completed`] on its inbound stream.
    async fn complete(&self);
}
