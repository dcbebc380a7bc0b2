//! Schema validator collaborator boundary
//!
//! Parameter validation is an external concern: the dispatcher only needs
//! "compile a schema once, check a value, get back a list of failures".
//! This module fixes that boundary. Concrete validators (and their schema
//! DSL) live outside the core; tests use a stub.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// One parameter-validation failure, as carried in the `data` field of an
/// invalid-params error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationFailure {
    /// Failure kind, e.g. `"required"` or `"number"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// What the schema expected, when meaningful.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<Value>,
    /// What the value actually was, when meaningful.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<Value>,
    /// Dotted path of the offending field.
    pub field: String,
    /// Human-readable description.
    pub message: String,
}

/// Compiled parameter checker: `Ok(())` when the value conforms,
/// otherwise every failure found.
pub type Checker =
    Arc<dyn Fn(&Value) -> std::result::Result<(), Vec<ValidationFailure>> + Send + Sync>;

/// Schema validator collaborator.
///
/// Compilation happens once per method at dispatcher build time; a
/// compile failure is a fatal configuration error, never a request-time
/// one.
pub trait Validator: Send + Sync {
    /// Compile `schema` into a reusable checker, or describe why the
    /// schema is unusable.
    fn compile(&self, schema: &Value) -> std::result::Result<Checker, String>;
}
