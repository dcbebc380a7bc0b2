//! Envelope serialization and deserialization
//!
//! Thin wrapper over serde_json that applies the JSON-RPC error mapping:
//! any inbound text that fails to parse becomes a `-32700` parse error,
//! and outbound serialization failures surface as [`Error::Serialization`].
//!
//! # Examples
//!
//! ```rust
//! use tether_core::{codec, Envelope, Id};
//!
//! let env = Envelope::request(Id::Number(1), "ping", None);
//! let text = codec::encode(&env).unwrap();
//! let back = codec::decode(&text).unwrap();
//! assert_eq!(back.method.as_deref(), Some("ping"));
//! ```

use crate::envelope::Envelope;
use crate::error::{Error, Result, RpcError};
use serde::Serialize;

/// Encode a message to its wire text.
pub fn encode<T: Serialize>(msg: &T) -> Result<String> {
    serde_json::to_string(msg).map_err(|e| Error::Serialization(e.to_string()))
}

/// Decode wire text into an envelope.
///
/// Parse failures map to a `-32700` parse error; structurally odd but
/// syntactically valid envelopes (wrong marker, missing method) decode
/// fine and are left for the dispatcher to classify.
pub fn decode(data: &str) -> Result<Envelope> {
    serde_json::from_str(data).map_err(|_| Error::Rpc(RpcError::parse_error(None)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::Id;
    use crate::error::PARSE_ERROR;

    #[test]
    fn round_trip() {
        let env = Envelope::request(Id::String("q1".into()), "status", None);
        let decoded = decode(&encode(&env).unwrap()).unwrap();
        assert_eq!(decoded, env);
    }

    #[test]
    fn invalid_json_is_parse_error() {
        match decode("{not json") {
            Err(Error::Rpc(e)) => {
                assert_eq!(e.code, PARSE_ERROR);
                assert_eq!(e.message, "Parse error");
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn malformed_envelope_still_decodes() {
        let env = decode(r#"{"id":3}"#).unwrap();
        assert!(!env.has_protocol_marker());
        assert_eq!(env.id, Some(Id::Number(3)));
    }
}
