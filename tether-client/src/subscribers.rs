//! Subscriber registry for unsolicited inbound envelopes
//!
//! Envelopes that arrive without an id are not correlated to any pending
//! call; they are broadcast to every registered subscriber. Membership is
//! keyed by an opaque token so removal is idempotent and unrelated to
//! envelope content.

use crate::pending::{locked, Delivery};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tether_core::{Envelope, Error};
use tokio::sync::mpsc;

/// Set of subscribers, exclusively owned by one stream client.
#[derive(Clone, Default)]
pub(crate) struct SubscriberSet {
    sinks: Arc<Mutex<HashMap<u64, mpsc::UnboundedSender<Delivery<Envelope>>>>>,
    next_token: Arc<AtomicU64>,
}

impl SubscriberSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a subscriber; returns its removal token and delivery queue.
    pub fn register(&self) -> (u64, mpsc::UnboundedReceiver<Delivery<Envelope>>) {
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        locked(&self.sinks).insert(token, tx);
        (token, rx)
    }

    /// Remove a subscriber. Idempotent.
    pub fn remove(&self, token: u64) {
        locked(&self.sinks).remove(&token);
    }

    /// Deliver an envelope to every current subscriber.
    pub fn broadcast(&self, envelope: Envelope) {
        for tx in locked(&self.sinks).values() {
            let _ = tx.send(Delivery::Item(envelope.clone()));
        }
    }

    /// Force-complete every subscriber with `error` and clear the set.
    pub fn fail_all(&self, error: Error) {
        for (_, tx) in locked(&self.sinks).drain() {
            let _ = tx.send(Delivery::Failed(error.clone()));
        }
    }

    /// Force-complete every subscriber normally and clear the set.
    pub fn complete_all(&self) {
        for (_, tx) in locked(&self.sinks).drain() {
            let _ = tx.send(Delivery::Done);
        }
    }

    pub fn len(&self) -> usize {
        locked(&self.sinks).len()
    }
}
