//! In-process duplex transport for exercising the stream client.
//!
//! `pair()` returns the client-facing transport plus a `Remote` handle
//! the test drives: inject inbound envelopes, signal failure/completion,
//! and inspect what the client sent.

use async_trait::async_trait;
use std::sync::{Mutex, PoisonError};
use tether_client::transport::{Duplex, TransportEvent};
use tether_core::{Envelope, Error, Result};
use tokio::sync::mpsc;

pub struct ChannelDuplex {
    outbound: mpsc::UnboundedSender<Envelope>,
    events: Mutex<Option<mpsc::UnboundedReceiver<TransportEvent>>>,
    event_tx: mpsc::UnboundedSender<TransportEvent>,
}

pub struct Remote {
    events: mpsc::UnboundedSender<TransportEvent>,
    outbound: mpsc::UnboundedReceiver<Envelope>,
}

/// Build a connected transport/remote pair.
pub fn pair() -> (ChannelDuplex, Remote) {
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (out_tx, out_rx) = mpsc::unbounded_channel();
    (
        ChannelDuplex {
            outbound: out_tx,
            events: Mutex::new(Some(event_rx)),
            event_tx: event_tx.clone(),
        },
        Remote {
            events: event_tx,
            outbound: out_rx,
        },
    )
}

#[async_trait]
impl Duplex for ChannelDuplex {
    async fn send(&self, envelope: Envelope) -> Result<()> {
        self.outbound
            .send(envelope)
            .map_err(|_| Error::Transport("peer is gone".into()))
    }

    fn incoming(&self) -> Option<mpsc::UnboundedReceiver<TransportEvent>> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    async fn complete(&self) {
        let _ = self.event_tx.send(TransportEvent::Completed);
    }
}

impl Remote {
    /// Push an inbound envelope to the client.
    pub fn deliver(&self, envelope: Envelope) {
        let _ = self.events.send(TransportEvent::Message(envelope));
    }

    /// Signal a transport failure.
    pub fn fail(&self, reason: &str) {
        let _ = self.events.send(TransportEvent::Failed(reason.to_string()));
    }

    /// Signal graceful completion.
    pub fn complete(&self) {
        let _ = self.events.send(TransportEvent::Completed);
    }

    /// Next envelope the client sent, if any arrives.
    pub async fn recv(&mut self) -> Option<Envelope> {
        self.outbound.recv().await
    }
}
