//! JSON-RPC 2.0 envelope types
//!
//! The envelope is the unit of wire exchange. One struct covers the three
//! message shapes the protocol defines:
//!
//! 1. **Request**: `method` + optional `params`, with an `id` so the
//!    response can be correlated back
//! 2. **Notification**: the same without an `id`; no response expected
//! 3. **Response**: the `id` of the request plus exactly one of
//!    `result`/`error`
//!
//! # Lenient Decoding
//!
//! Inbound envelopes are decoded leniently: a wrong or missing `jsonrpc`
//! marker and a missing `method` both survive deserialization, so the
//! server dispatcher can classify malformed messages itself instead of
//! losing them to a serde error. Outbound envelopes are only built through
//! the shape constructors, which always stamp the `"2.0"` marker.
//!
//! # Examples
//!
//! ```rust
//! use tether_core::{Envelope, Id};
//! use serde_json::json;
//!
//! let req = Envelope::request(Id::Number(1), "add", Some(json!({"a": 1})));
//! assert!(!req.is_notification());
//!
//! let note = Envelope::notification("tick", None);
//! assert!(note.is_notification());
//! ```

use crate::error::{ErrorObject, RpcError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Protocol marker carried by every well-formed envelope.
pub const PROTOCOL: &str = "2.0";

/// JSON-RPC call id: the correlation key between a request and its
/// response.
///
/// The spec allows string, number or null ids. The type is `Hash + Eq` so
/// pending calls can be keyed by id directly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    /// String identifier, as produced by [`Envelope`]-issuing clients.
    String(String),
    /// Numeric identifier.
    Number(i64),
    /// Null identifier; only used on responses to requests whose id could
    /// not be determined.
    Null,
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::String(s) => write!(f, "\"{}\"", s),
            Id::Number(n) => write!(f, "{}", n),
            Id::Null => write!(f, "null"),
        }
    }
}

impl From<String> for Id {
    fn from(s: String) -> Self {
        Id::String(s)
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Id::String(s.to_string())
    }
}

impl From<i64> for Id {
    fn from(n: i64) -> Self {
        Id::Number(n)
    }
}

/// One JSON-RPC message: request, notification, or response.
///
/// Exactly one field combination is valid per shape; the constructors
/// enforce it for outbound messages, while inbound messages keep whatever
/// the peer sent so the dispatcher can reject malformed ones explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Protocol marker; `"2.0"` on every well-formed message. Defaults to
    /// an empty string when missing so the dispatcher sees the violation.
    #[serde(default)]
    pub jsonrpc: String,
    /// Correlation id; absent on notifications.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    /// Method name; present on requests and notifications only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Method parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    /// Successful result; mutually exclusive with `error`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error value; mutually exclusive with `result`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorObject>,
}

impl Envelope {
    fn base() -> Self {
        Self {
            jsonrpc: PROTOCOL.to_string(),
            id: None,
            method: None,
            params: None,
            result: None,
            error: None,
        }
    }

    /// Build a request envelope: `{jsonrpc, id, method, params?}`.
    pub fn request(id: impl Into<Id>, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            id: Some(id.into()),
            method: Some(method.into()),
            params,
            ..Self::base()
        }
    }

    /// Build a notification envelope: a request without an `id`.
    pub fn notification(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            method: Some(method.into()),
            params,
            ..Self::base()
        }
    }

    /// Build a success response: `{jsonrpc, id, result}`.
    pub fn success(id: Id, result: Value) -> Self {
        Self {
            id: Some(id),
            result: Some(result),
            ..Self::base()
        }
    }

    /// Build an error response: `{jsonrpc, id, error}`.
    pub fn failure(id: Id, error: RpcError) -> Self {
        Self {
            id: Some(id),
            error: Some(error.to_object()),
            ..Self::base()
        }
    }

    /// Whether the protocol marker is the required `"2.0"`.
    pub fn has_protocol_marker(&self) -> bool {
        self.jsonrpc == PROTOCOL
    }

    /// Whether this envelope has no correlation id.
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }

    /// Whether this envelope carries a result or an error.
    pub fn is_response(&self) -> bool {
        self.method.is_none() && (self.result.is_some() || self.error.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn id_display() {
        assert_eq!(Id::String("a".into()).to_string(), "\"a\"");
        assert_eq!(Id::Number(7).to_string(), "7");
        assert_eq!(Id::Null.to_string(), "null");
    }

    #[test]
    fn request_shape() {
        let env = Envelope::request(Id::Number(1), "sum", Some(json!([1, 2])));
        let text = serde_json::to_string(&env).unwrap();
        assert!(text.contains("\"jsonrpc\":\"2.0\""));
        assert!(text.contains("\"id\":1"));
        assert!(text.contains("\"method\":\"sum\""));
        assert!(!text.contains("result"));
        assert!(!text.contains("error"));
    }

    #[test]
    fn notification_has_no_id() {
        let env = Envelope::notification("tick", None);
        assert!(env.is_notification());
        let text = serde_json::to_string(&env).unwrap();
        assert!(!text.contains("\"id\""));
        assert!(!text.contains("\"params\""));
    }

    #[test]
    fn response_shapes() {
        let ok = Envelope::success(Id::String("r".into()), json!(3));
        assert!(ok.is_response());
        assert!(!ok.is_notification());

        let err = Envelope::failure(Id::Number(2), RpcError::method_not_found(None));
        assert!(err.is_response());
        let text = serde_json::to_string(&err).unwrap();
        assert!(text.contains("\"code\":-32601"));
        assert!(text.contains("\"message\":\"Method not found\""));
    }

    #[test]
    fn lenient_decode_of_malformed_input() {
        let env: Envelope = serde_json::from_str(r#"{"id":1,"params":{}}"#).unwrap();
        assert!(!env.has_protocol_marker());
        assert!(env.method.is_none());

        let env: Envelope = serde_json::from_str(r#"{"jsonrpc":"1.0","method":"x"}"#).unwrap();
        assert!(!env.has_protocol_marker());
    }

    #[test]
    fn untagged_id_decoding() {
        let env: Envelope =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":"abc","result":null}"#).unwrap();
        assert_eq!(env.id, Some(Id::String("abc".into())));
        let env: Envelope =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":9,"result":1}"#).unwrap();
        assert_eq!(env.id, Some(Id::Number(9)));
    }
}
