//! Base client contract
//!
//! Every client variant implements the same small capability set: a
//! subscription capability flag, fresh call-id generation, and `request`.
//! The contract itself is not callable — invoking `request` on a type
//! that does not override it fails with [`Error::NotImplemented`] — but
//! it lets callers hold any client behind one trait object.
//!
//! # Call Ids
//!
//! Generated ids are 21-character random strings over the url-safe
//! alphabet `A-Za-z0-9_-` (126 bits), so two consecutive ids differ with
//! overwhelming probability even under rapid successive generation.

use async_trait::async_trait;
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tether_core::{Error, Id, Result};

const ID_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";
const ID_LENGTH: usize = 21;

/// Generate a fresh, collision-resistant call id.
pub fn fresh_id() -> String {
    let mut rng = rand::thread_rng();
    (0..ID_LENGTH)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect()
}

/// Capability set shared by every client variant.
///
/// Concrete clients override [`request`](Client::request); the provided
/// body is the abstract contract and always fails.
///
/// # Examples
///
/// ```rust
/// use tether_client::Client;
///
/// struct Abstract;
/// impl Client for Abstract {}
///
/// let c = Abstract;
/// assert!(!c.can_subscribe());
/// assert_ne!(c.create_id(), c.create_id());
/// ```
#[async_trait]
pub trait Client: Send + Sync {
    /// Whether this client supports long-lived subscriptions. False for
    /// one-shot transports, true for duplex ones.
    fn can_subscribe(&self) -> bool {
        false
    }

    /// A fresh identifier for an outgoing request.
    fn create_id(&self) -> Id {
        Id::String(fresh_id())
    }

    /// Send a request and await its result.
    async fn request(&self, method: &str, params: Option<Value>) -> Result<Value> {
        let _ = (method, params);
        Err(Error::NotImplemented)
    }

    /// Typed convenience around [`request`](Client::request): serializes
    /// `params` and deserializes the result. A `Null` params value is
    /// sent as an absent `params` field.
    async fn call<P, R>(&self, method: &str, params: P) -> Result<R>
    where
        P: Serialize + Send + Sync,
        R: DeserializeOwned,
        Self: Sized,
    {
        let params =
            serde_json::to_value(params).map_err(|e| Error::Serialization(e.to_string()))?;
        let params = if params.is_null() { None } else { Some(params) };
        let result = self.request(method, params).await?;
        serde_json::from_value(result).map_err(|e| Error::Serialization(e.to_string()))
    }
}
