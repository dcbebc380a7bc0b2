//! Pending-call bookkeeping
//!
//! Every in-flight call on a stream client owns one entry here, keyed by
//! its call id. Responses arrive in any order; correlation is strictly by
//! id, never by send order. An entry survives successful deliveries (a
//! subscription receives many) and is destroyed by an error response,
//! explicit cancellation, or transport termination.
//!
//! The table is guarded by a `std::sync::Mutex` so cancellation is
//! synchronous: once `remove` returns, no future delivery can reach the
//! cancelled call.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tether_core::{Error, Id};
use tokio::sync::mpsc;

/// One item pushed into a pending call's or subscriber's delivery queue.
#[derive(Debug)]
pub(crate) enum Delivery<T> {
    /// A value was delivered; the entry stays alive.
    Item(T),
    /// Normal completion; the entry is gone.
    Done,
    /// Terminal failure; the entry is gone.
    Failed(Error),
}

pub(crate) fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Table of pending calls, exclusively owned by one client instance.
#[derive(Clone, Default)]
pub(crate) struct CallTable {
    calls: Arc<Mutex<HashMap<Id, mpsc::UnboundedSender<Delivery<Value>>>>>,
}

impl CallTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pending call and return its delivery queue.
    pub fn register(&self, id: Id) -> mpsc::UnboundedReceiver<Delivery<Value>> {
        let (tx, rx) = mpsc::unbounded_channel();
        locked(&self.calls).insert(id, tx);
        rx
    }

    /// Deliver a successful result, keeping the call alive for further
    /// deliveries. Returns false when no call matches `id`.
    pub fn deliver(&self, id: &Id, value: Value) -> bool {
        match locked(&self.calls).get(id) {
            Some(tx) => {
                let _ = tx.send(Delivery::Item(value));
                true
            }
            None => false,
        }
    }

    /// Complete a call with an error and remove it. Returns false when no
    /// call matches `id`.
    pub fn fail(&self, id: &Id, error: Error) -> bool {
        match locked(&self.calls).remove(id) {
            Some(tx) => {
                let _ = tx.send(Delivery::Failed(error));
                true
            }
            None => false,
        }
    }

    /// Remove a call without delivering anything. Idempotent; used by
    /// cancellation.
    pub fn remove(&self, id: &Id) {
        locked(&self.calls).remove(id);
    }

    /// Force-complete every call with `error` and clear the table.
    pub fn fail_all(&self, error: Error) {
        for (_, tx) in locked(&self.calls).drain() {
            let _ = tx.send(Delivery::Failed(error.clone()));
        }
    }

    /// Force-complete every call with the normal completion signal and
    /// clear the table.
    pub fn complete_all(&self) {
        for (_, tx) in locked(&self.calls).drain() {
            let _ = tx.send(Delivery::Done);
        }
    }

    pub fn len(&self) -> usize {
        locked(&self.calls).len()
    }
}
