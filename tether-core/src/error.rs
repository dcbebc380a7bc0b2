//! JSON-RPC 2.0 error taxonomy
//!
//! This module defines the error-code taxonomy shared by clients and the
//! server dispatcher, and the two error types built on top of it:
//!
//! - **RpcError**: the structured error value exchanged on the wire
//!   (`{code, message, data?}`), with message defaulting rules
//! - **Error**: the crate-level error enum for everything that can go wrong
//!   around the protocol (transport loss, serialization, lifecycle)
//!
//! # Code Ranges
//!
//! JSON-RPC 2.0 reserves a handful of exact codes and one band:
//! - `-32700`: Parse error
//! - `-32600`: Invalid request
//! - `-32601`: Method not found
//! - `-32602`: Invalid params
//! - `-32603`: Internal error
//! - `-32000` to `-32099`: server errors (implementation-defined)
//!
//! Every other code is an application error, chosen intentionally by a
//! method implementation.
//!
//! # Message Defaulting
//!
//! When an error value arrives or is constructed without a message, the
//! message is filled by precedence: exact-code table lookup, else
//! `"Server error"` inside the reserved band, else `"Application error"`.
//!
//! # Examples
//!
//! ```rust
//! use tether_core::error::{classify, default_message, ErrorClass, RpcError};
//!
//! assert_eq!(classify(-32601), ErrorClass::Protocol);
//! assert_eq!(classify(-32050), ErrorClass::Server);
//! assert_eq!(default_message(-32601), "Method not found");
//!
//! let err = RpcError::method_not_found(None);
//! assert_eq!(err.code, -32601);
//! assert_eq!(err.message, "Method not found");
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Result type used throughout the tether crates.
pub type Result<T> = std::result::Result<T, Error>;

/// Parse error: invalid JSON was received.
pub const PARSE_ERROR: i64 = -32700;
/// Invalid request: the envelope is not a valid request object.
pub const INVALID_REQUEST: i64 = -32600;
/// Method not found: the method does not exist on the server.
pub const METHOD_NOT_FOUND: i64 = -32601;
/// Invalid params: the method exists but rejected its parameters.
pub const INVALID_PARAMS: i64 = -32602;
/// Internal error: unexpected failure inside the server.
pub const INTERNAL_ERROR: i64 = -32603;
/// Default code for unclassified handler failures (start of the server band).
pub const SERVER_ERROR: i64 = -32000;

/// Classification of a JSON-RPC error code.
///
/// See [`classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// One of the five protocol-reserved codes.
    Protocol,
    /// Inside the reserved server-error band `[-32099, -32000]`.
    Server,
    /// Anything else: an intentional application-defined error.
    Application,
}

/// Whether `code` falls in the reserved server-error band.
pub fn is_server_error(code: i64) -> bool {
    (-32099..=-32000).contains(&code)
}

/// Classify an error code into its taxonomy bucket.
///
/// The five protocol-reserved codes are `Protocol`; the
/// `[-32099, -32000]` band is `Server`; everything else, including codes
/// below `-32100`, is `Application`.
pub fn classify(code: i64) -> ErrorClass {
    if reserved_message(code).is_some() {
        ErrorClass::Protocol
    } else if is_server_error(code) {
        ErrorClass::Server
    } else {
        ErrorClass::Application
    }
}

/// Exact-code message table for the protocol-reserved codes.
fn reserved_message(code: i64) -> Option<&'static str> {
    match code {
        PARSE_ERROR => Some("Parse error"),
        INVALID_REQUEST => Some("Invalid request"),
        METHOD_NOT_FOUND => Some("Method not found"),
        INVALID_PARAMS => Some("Invalid params"),
        INTERNAL_ERROR => Some("Internal error"),
        _ => None,
    }
}

/// Default message for an error code.
///
/// Precedence: exact-code table, else `"Server error"` for codes in the
/// reserved band, else `"Application error"`.
pub fn default_message(code: i64) -> &'static str {
    reserved_message(code).unwrap_or(if is_server_error(code) {
        "Server error"
    } else {
        "Application error"
    })
}

/// Wire form of a JSON-RPC error value.
///
/// This is the exact shape carried in the `error` field of a response
/// envelope. The `message` is optional on the wire; converting into an
/// [`RpcError`] fills it from the taxonomy defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorObject {
    /// Numeric error code.
    pub code: i64,
    /// Short error description; filled from the code table when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Optional structured context (validation failures, details).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Structured JSON-RPC error value: `{code, message, data?}`.
///
/// This is the rich in-process counterpart of [`ErrorObject`]: the message
/// is always present, defaulted via [`default_message`] when the source
/// omitted it.
///
/// # Examples
///
/// ```rust
/// use tether_core::error::RpcError;
/// use serde_json::json;
///
/// // Explicit application error
/// let err = RpcError::new(7, Some("out of credit".into()), None);
/// assert_eq!(err.message, "out of credit");
///
/// // Message defaulted from the code
/// let err = RpcError::new(-32050, None, Some(json!({"attempt": 3})));
/// assert_eq!(err.message, "Server error");
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
#[error("[{code}] {message}")]
pub struct RpcError {
    /// Numeric error code.
    pub code: i64,
    /// Human-readable message, never empty.
    pub message: String,
    /// Optional structured context.
    pub data: Option<Value>,
}

impl RpcError {
    /// Build an error value, defaulting the message from the code when
    /// `message` is `None`.
    pub fn new(code: i64, message: Option<String>, data: Option<Value>) -> Self {
        let message = match message {
            Some(m) if !m.is_empty() => m,
            _ => default_message(code).to_string(),
        };
        Self {
            code,
            message,
            data,
        }
    }

    /// Convert a wire [`ErrorObject`] into an error value, filling the
    /// message when the peer omitted it.
    pub fn from_object(obj: ErrorObject) -> Self {
        Self::new(obj.code, obj.message, obj.data)
    }

    /// Convert into the wire form.
    pub fn to_object(&self) -> ErrorObject {
        ErrorObject {
            code: self.code,
            message: Some(self.message.clone()),
            data: self.data.clone(),
        }
    }

    /// Parse error (`-32700`) with optional context data.
    pub fn parse_error(data: impl Into<Option<Value>>) -> Self {
        Self::new(PARSE_ERROR, None, data.into())
    }

    /// Invalid request (`-32600`) with optional context data.
    pub fn invalid_request(data: impl Into<Option<Value>>) -> Self {
        Self::new(INVALID_REQUEST, None, data.into())
    }

    /// Method not found (`-32601`) with optional context data.
    pub fn method_not_found(data: impl Into<Option<Value>>) -> Self {
        Self::new(METHOD_NOT_FOUND, None, data.into())
    }

    /// Invalid params (`-32602`) with optional context data.
    pub fn invalid_params(data: impl Into<Option<Value>>) -> Self {
        Self::new(INVALID_PARAMS, None, data.into())
    }

    /// Internal error (`-32603`) with optional context data.
    pub fn internal_error(data: impl Into<Option<Value>>) -> Self {
        Self::new(INTERNAL_ERROR, None, data.into())
    }
}

impl From<ErrorObject> for RpcError {
    fn from(obj: ErrorObject) -> Self {
        RpcError::from_object(obj)
    }
}

/// Crate-level error type for tether operations.
///
/// Covers both structured peer errors ([`RpcError`]) and the local failure
/// modes around them. `Clone` so a single transport failure can be
/// broadcast to every pending call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Structured error received from (or destined for) the peer.
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    /// Failure converting between Rust values and JSON.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The underlying transport reported a failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// Operation requires a connected stream client.
    #[error("not connected")]
    NotConnected,

    /// `request` invoked on the abstract client contract.
    #[error("request is not implemented for this client")]
    NotImplemented,

    /// The channel or transport completed before the call settled.
    #[error("connection closed")]
    Closed,
}

impl Error {
    /// The structured error value, when this error carries one.
    pub fn as_rpc(&self) -> Option<&RpcError> {
        match self {
            Error::Rpc(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classify_reserved_codes() {
        for code in [
            PARSE_ERROR,
            INVALID_REQUEST,
            METHOD_NOT_FOUND,
            INVALID_PARAMS,
            INTERNAL_ERROR,
        ] {
            assert_eq!(classify(code), ErrorClass::Protocol, "code {code}");
        }
    }

    #[test]
    fn classify_band_boundaries() {
        assert_eq!(classify(-32000), ErrorClass::Server);
        assert_eq!(classify(-32099), ErrorClass::Server);
        assert_eq!(classify(-31999), ErrorClass::Application);
        assert_eq!(classify(-32100), ErrorClass::Application);
    }

    #[test]
    fn message_table() {
        assert_eq!(default_message(PARSE_ERROR), "Parse error");
        assert_eq!(default_message(INVALID_REQUEST), "Invalid request");
        assert_eq!(default_message(METHOD_NOT_FOUND), "Method not found");
        assert_eq!(default_message(INVALID_PARAMS), "Invalid params");
        assert_eq!(default_message(INTERNAL_ERROR), "Internal error");
        assert_eq!(default_message(-32000), "Server error");
        assert_eq!(default_message(-32042), "Server error");
        assert_eq!(default_message(42), "Application error");
        assert_eq!(default_message(-32100), "Application error");
    }

    #[test]
    fn new_defaults_empty_message() {
        let err = RpcError::new(METHOD_NOT_FOUND, Some(String::new()), None);
        assert_eq!(err.message, "Method not found");
    }

    #[test]
    fn factories_carry_data() {
        let err = RpcError::invalid_params(json!([{"field": "a"}]));
        assert_eq!(err.code, INVALID_PARAMS);
        assert_eq!(err.message, "Invalid params");
        assert_eq!(err.data, Some(json!([{"field": "a"}])));

        let err = RpcError::parse_error(None);
        assert_eq!(err.code, PARSE_ERROR);
        assert!(err.data.is_none());
    }

    #[test]
    fn from_object_fills_message() {
        let err = RpcError::from_object(ErrorObject {
            code: -32601,
            message: None,
            data: None,
        });
        assert_eq!(err.message, "Method not found");

        let err = RpcError::from_object(ErrorObject {
            code: 12,
            message: Some("custom".into()),
            data: None,
        });
        assert_eq!(err.message, "custom");
    }

    #[test]
    fn object_round_trip() {
        let err = RpcError::new(SERVER_ERROR, None, Some(json!("ctx")));
        let obj = err.to_object();
        assert_eq!(obj.message.as_deref(), Some("Server error"));
        assert_eq!(RpcError::from_object(obj), err);
    }

    #[test]
    fn error_display() {
        let err = Error::Rpc(RpcError::method_not_found(None));
        assert!(err.to_string().contains("-32601"));
        assert!(err.to_string().contains("Method not found"));
        assert_eq!(Error::NotConnected.to_string(), "not connected");
    }
}
