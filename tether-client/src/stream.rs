//! Full-duplex client over a streaming transport
//!
//! This client owns the correlation state for concurrent in-flight calls
//! over one duplex channel: a pending-call table keyed by call id and a
//! subscriber set for unsolicited envelopes. Responses may arrive in any
//! order; a single receive loop processes each inbound message to
//! completion before the next, so table updates never race.
//!
//! # Lifecycle
//!
//! ```text
//! Disconnected → Connected → (Failed | Closed)
//! ```
//!
//! `connect()` is idempotent. Transport failure force-fails every pending
//! call and subscriber; graceful completion force-completes them. Both
//! leave the collections empty — a terminated client never leaks a
//! pending call.
//!
//! # Examples
//!
//! ```rust,no_run
//! use tether_client::{Client, StreamClient};
//! use tether_client::transport::Duplex;
//!
//! # async fn demo(transport: impl Duplex) -> tether_core::Result<()> {
//! let client = StreamClient::new(transport);
//! client.connect()?;
//!
//! let answer = client.request("status", None).await?;
//!
//! let mut updates = client.observe("watch", None).await?;
//! while let Some(update) = updates.next().await {
//!     println!("{:?}", update?);
//! }
//! # Ok(())
//! # }
//! ```

use crate::base::Client;
use crate::pending::{locked, CallTable, Delivery};
use crate::subscribers::SubscriberSet;
use crate::transport::{Duplex, TransportEvent};
use async_trait::async_trait;
use futures::Stream;
use serde_json::Value;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tether_core::{Envelope, Error, Id, Result, RpcError};
use tokio::sync::mpsc;

/// Lifecycle phase of a stream client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Initial state; no receive loop running.
    Disconnected,
    /// Receive loop attached to the transport.
    Connected,
    /// Transport failed; all pending work was failed.
    Failed,
    /// Transport completed gracefully; all pending work was completed.
    Closed,
}

/// JSON-RPC client for duplex transports (sockets, in-process channels).
///
/// Cheaply cloneable; clones share the connection and correlation state.
#[derive(Clone)]
pub struct StreamClient {
    transport: Arc<dyn Duplex>,
    calls: CallTable,
    subscribers: SubscriberSet,
    phase: Arc<Mutex<Phase>>,
}

impl StreamClient {
    /// Wrap a duplex transport. The client starts disconnected; call
    /// [`connect`](StreamClient::connect) to attach the receive loop.
    pub fn new(transport: impl Duplex) -> Self {
        Self {
            transport: Arc::new(transport),
            calls: CallTable::new(),
            subscribers: SubscriberSet::new(),
            phase: Arc::new(Mutex::new(Phase::Disconnected)),
        }
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        *locked(&self.phase)
    }

    /// Whether the receive loop is attached.
    pub fn is_connected(&self) -> bool {
        self.phase() == Phase::Connected
    }

    /// Number of in-flight calls. Drops to zero on transport termination.
    pub fn pending_calls(&self) -> usize {
        self.calls.len()
    }

    /// Number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Attach the receive loop to the transport's inbound stream.
    ///
    /// Calling this while already connected is a no-op. Connecting a
    /// client whose transport already terminated fails with
    /// [`Error::Closed`].
    pub fn connect(&self) -> Result<()> {
        let mut phase = locked(&self.phase);
        if *phase == Phase::Connected {
            return Ok(());
        }
        let events = self.transport.incoming().ok_or(Error::Closed)?;
        *phase = Phase::Connected;
        drop(phase);

        tokio::spawn(Self::receive_loop(
            events,
            self.calls.clone(),
            self.subscribers.clone(),
            Arc::clone(&self.phase),
        ));
        Ok(())
    }

    /// Ask the transport to complete gracefully. Pending calls and
    /// subscribers are completed when the transport's completion signal
    /// arrives back through the receive loop.
    pub async fn disconnect(&self) {
        self.transport.complete().await;
    }

    /// Issue a call and return its delivery stream.
    ///
    /// The returned [`Subscription`] yields every result the server
    /// delivers for this call id and terminates on an error response or
    /// server-side completion. Dropping or cancelling the handle removes
    /// the pending call; cancellation is idempotent and safe after the
    /// call has already completed.
    pub async fn observe(&self, method: &str, params: Option<Value>) -> Result<Subscription> {
        if !self.is_connected() {
            return Err(Error::NotConnected);
        }
        let id = self.create_id();
        let rx = self.calls.register(id.clone());
        let request = Envelope::request(id.clone(), method, params);
        if let Err(e) = self.transport.send(request).await {
            self.calls.remove(&id);
            return Err(e);
        }
        Ok(Subscription {
            id,
            rx,
            calls: self.calls.clone(),
        })
    }

    /// Send a notification: fire-and-forget, no id, no pending call.
    pub async fn notify(&self, method: &str, params: Option<Value>) -> Result<()> {
        self.transport
            .send(Envelope::notification(method, params))
            .await
    }

    /// Register a sink for unsolicited (id-less) inbound envelopes.
    ///
    /// The returned handle yields every broadcast envelope until it is
    /// unsubscribed (idempotent) or the transport terminates.
    pub fn subscribe(&self) -> Result<Events> {
        if !self.is_connected() {
            return Err(Error::NotConnected);
        }
        let (token, rx) = self.subscribers.register();
        Ok(Events {
            token,
            rx,
            subscribers: self.subscribers.clone(),
        })
    }

    async fn receive_loop(
        mut events: mpsc::UnboundedReceiver<TransportEvent>,
        calls: CallTable,
        subscribers: SubscriberSet,
        phase: Arc<Mutex<Phase>>,
    ) {
        while let Some(event) = events.recv().await {
            match event {
                TransportEvent::Message(envelope) => {
                    Self::route_inbound(envelope, &calls, &subscribers);
                }
                TransportEvent::Failed(reason) => {
                    tracing::debug!(%reason, "transport failed");
                    let error = Error::Transport(reason);
                    calls.fail_all(error.clone());
                    subscribers.fail_all(error);
                    *locked(&phase) = Phase::Failed;
                    return;
                }
                TransportEvent::Completed => {
                    calls.complete_all();
                    subscribers.complete_all();
                    *locked(&phase) = Phase::Closed;
                    return;
                }
            }
        }
        // Inbound stream dropped without a final signal: graceful end.
        calls.complete_all();
        subscribers.complete_all();
        *locked(&phase) = Phase::Closed;
    }

    fn route_inbound(envelope: Envelope, calls: &CallTable, subscribers: &SubscriberSet) {
        let Some(id) = envelope.id.clone() else {
            subscribers.broadcast(envelope);
            return;
        };
        let matched = match envelope.error {
            Some(error) => calls.fail(&id, Error::Rpc(RpcError::from_object(error))),
            None => calls.deliver(&id, envelope.result.unwrap_or(Value::Null)),
        };
        if !matched {
            tracing::warn!(%id, "dropping response with no pending call");
        }
    }
}

#[async_trait]
impl Client for StreamClient {
    fn can_subscribe(&self) -> bool {
        true
    }

    /// Single-value resolution of a call: the first delivery settles the
    /// request and the underlying registration is cancelled.
    async fn request(&self, method: &str, params: Option<Value>) -> Result<Value> {
        if !self.is_connected() {
            return Err(Error::NotConnected);
        }
        let mut subscription = self.observe(method, params).await?;
        let settled = match subscription.next().await {
            Some(Ok(value)) => Ok(value),
            Some(Err(error)) => Err(error),
            None => Err(Error::Closed),
        };
        subscription.cancel();
        settled
    }
}

/// Delivery stream for one call issued via
/// [`observe`](StreamClient::observe).
///
/// Yields `Ok(result)` per delivery; an `Err` is terminal. Dropping the
/// handle cancels the call.
pub struct Subscription {
    id: Id,
    rx: mpsc::UnboundedReceiver<Delivery<Value>>,
    calls: CallTable,
}

impl Subscription {
    /// The call id this subscription is correlated by.
    pub fn id(&self) -> &Id {
        &self.id
    }

    /// Next delivery; `None` once the call has terminated.
    pub async fn next(&mut self) -> Option<Result<Value>> {
        match self.rx.recv().await {
            Some(Delivery::Item(value)) => Some(Ok(value)),
            Some(Delivery::Failed(error)) => Some(Err(error)),
            Some(Delivery::Done) | None => None,
        }
    }

    /// Remove the pending call. Idempotent; a no-op after completion.
    pub fn cancel(&self) {
        self.calls.remove(&self.id);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.calls.remove(&self.id);
    }
}

impl Stream for Subscription {
    type Item = Result<Value>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match self.rx.poll_recv(cx) {
            Poll::Ready(Some(Delivery::Item(value))) => Poll::Ready(Some(Ok(value))),
            Poll::Ready(Some(Delivery::Failed(error))) => Poll::Ready(Some(Err(error))),
            Poll::Ready(Some(Delivery::Done)) | Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Delivery stream of unsolicited envelopes for one subscriber.
///
/// Yields `Ok(envelope)` per broadcast; an `Err` reports transport
/// failure and is terminal. Dropping the handle unsubscribes.
pub struct Events {
    token: u64,
    rx: mpsc::UnboundedReceiver<Delivery<Envelope>>,
    subscribers: SubscriberSet,
}

impl Events {
    /// Next broadcast envelope; `None` once unsubscribed or completed.
    pub async fn next(&mut self) -> Option<Result<Envelope>> {
        match self.rx.recv().await {
            Some(Delivery::Item(envelope)) => Some(Ok(envelope)),
            Some(Delivery::Failed(error)) => Some(Err(error)),
            Some(Delivery::Done) | None => None,
        }
    }

    /// Remove this subscriber. Idempotent.
    pub fn unsubscribe(&self) {
        self.subscribers.remove(self.token);
    }
}

impl Drop for Events {
    fn drop(&mut self) {
        self.subscribers.remove(self.token);
    }
}

impl Stream for Events {
    type Item = Result<Envelope>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match self.rx.poll_recv(cx) {
            Poll::Ready(Some(Delivery::Item(envelope))) => Poll::Ready(Some(Ok(envelope))),
            Poll::Ready(Some(Delivery::Failed(error))) => Poll::Ready(Some(Err(error))),
            Poll::Ready(Some(Delivery::Done)) | Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }
}
