//! Half-duplex client over a single-shot transport
//!
//! The transport performs one full round trip per call, so no pending-call
//! table is needed: the one reply the transport returns is by construction
//! the reply to the one request that was sent. The client stays stateless
//! between calls.

use crate::base::Client;
use crate::transport::SingleShot;
use async_trait::async_trait;
use serde_json::Value;
use tether_core::{Envelope, Error, Result, RpcError};

/// JSON-RPC client for request/response transports (HTTP-like channels).
///
/// Does not support subscriptions or notifications; see the stream client
/// for duplex transports.
///
/// # Examples
///
/// ```rust
/// use tether_client::{Client, RequestClient};
/// use tether_client::transport::fetch_fn;
/// use tether_core::{Envelope, Id};
/// use serde_json::json;
///
/// # async fn demo() -> tether_core::Result<()> {
/// let client = RequestClient::new(fetch_fn(|req: Envelope| async move {
///     Ok(Envelope::success(req.id.unwrap_or(Id::Null), json!(7)))
/// }));
///
/// let value = client.request("lucky", None).await?;
/// assert_eq!(value, json!(7));
/// # Ok(())
/// # }
/// ```
pub struct RequestClient<T> {
    fetch: T,
}

impl<T: SingleShot> RequestClient<T> {
    /// Wrap a single-shot transport.
    pub fn new(fetch: T) -> Self {
        Self { fetch }
    }
}

#[async_trait]
impl<T: SingleShot> Client for RequestClient<T> {
    async fn request(&self, method: &str, params: Option<Value>) -> Result<Value> {
        let request = Envelope::request(self.create_id(), method, params);
        let reply = self.fetch.send(request).await?;
        if let Some(error) = reply.error {
            return Err(Error::Rpc(RpcError::from_object(error)));
        }
        Ok(reply.result.unwrap_or(Value::Null))
    }
}
