//! Core JSON-RPC 2.0 envelope types, error taxonomy and codec for tether
//!
//! This crate provides the foundation the client and handler crates build
//! on:
//!
//! - **Envelope**: the single wire-exchange unit covering requests,
//!   notifications and responses
//! - **Error taxonomy**: reserved error codes, range classification and
//!   the structured error value with message defaulting
//! - **Codec**: text encoding/decoding with JSON-RPC error mapping
//!
//! The crate is transport-agnostic by design: it says nothing about how
//! envelopes move, only what they look like and how errors are classified.
//!
//! # Example
//!
//! ```rust
//! use tether_core::{codec, Envelope, Id, RpcError};
//!
//! let request = Envelope::request(Id::Number(1), "add", Some(serde_json::json!({"a": 5})));
//! let text = codec::encode(&request).unwrap();
//! assert!(codec::decode(&text).unwrap().has_protocol_marker());
//!
//! let err = RpcError::method_not_found(None);
//! assert_eq!(err.message, "Method not found");
//! ```

pub mod codec;
pub mod envelope;
pub mod error;

pub use envelope::{Envelope, Id, PROTOCOL};
pub use error::{
    classify, default_message, is_server_error, Error, ErrorClass, ErrorObject, Result, RpcError,
    INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND, PARSE_ERROR, SERVER_ERROR,
};
