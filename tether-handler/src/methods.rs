//! Method table definitions and normalization
//!
//! A method table maps names to handlers, optionally guarded by a
//! parameter schema. At build time every entry is normalized into one
//! uniform callable shape: schema'd handlers get their schema compiled
//! once and are wrapped so each invocation checks `params` first. After
//! normalization the table is immutable.

use crate::validate::Validator;
use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tether_core::{default_message, RpcError, SERVER_ERROR};
use thiserror::Error;

/// Outcome of one method invocation.
pub type MethodResult = std::result::Result<Value, MethodError>;

/// Uniform callable shape every table entry normalizes to.
pub type MethodFn<C> = Arc<dyn Fn(C, Value) -> BoxFuture<'static, MethodResult> + Send + Sync>;

/// Failure raised by a method handler.
///
/// Every handler failure is normalized through this type into the wire
/// error value: a structured [`RpcError`] is reused verbatim; a plain
/// failure falls back to its attached code or the generic server-error
/// code `-32000`, and to the taxonomy default message when none is given.
#[derive(Debug, Error)]
pub enum MethodError {
    /// Structured error value, passed through unchanged.
    #[error(transparent)]
    Rpc(#[from] RpcError),
    /// Unstructured failure with optional code and message.
    #[error("{}", .message.as_deref().unwrap_or_else(|| default_message(.code.unwrap_or(SERVER_ERROR))))]
    Failure {
        /// Numeric code to report; `-32000` when absent.
        code: Option<i64>,
        /// Message to report; taxonomy default when absent.
        message: Option<String>,
    },
}

impl MethodError {
    /// Uncoded failure with a message; reported as `-32000`.
    pub fn failure(message: impl Into<String>) -> Self {
        MethodError::Failure {
            code: None,
            message: Some(message.into()),
        }
    }

    /// Failure with an attached numeric code.
    pub fn coded(code: i64, message: impl Into<Option<String>>) -> Self {
        MethodError::Failure {
            code: Some(code),
            message: message.into(),
        }
    }

    /// Normalize into the structured error value sent on the wire.
    pub fn into_rpc_error(self) -> RpcError {
        match self {
            MethodError::Rpc(error) => error,
            MethodError::Failure { code, message } => {
                RpcError::new(code.unwrap_or(SERVER_ERROR), message, None)
            }
        }
    }
}

impl From<String> for MethodError {
    fn from(message: String) -> Self {
        MethodError::failure(message)
    }
}

impl From<&str> for MethodError {
    fn from(message: &str) -> Self {
        MethodError::failure(message)
    }
}

/// One method table entry before normalization.
pub enum MethodDef<C> {
    /// Bare handler, invoked with the raw params value.
    Handler(MethodFn<C>),
    /// Handler guarded by a parameter schema compiled at build time.
    WithSchema {
        /// Schema handed to the validator collaborator.
        params: Value,
        /// Handler invoked once the params check passes.
        handler: MethodFn<C>,
    },
}

/// Adapt an async function into a [`MethodFn`].
///
/// # Examples
///
/// ```rust
/// use tether_handler::from_fn;
/// use serde_json::{json, Value};
///
/// let echo = from_fn(|_ctx: (), params: Value| async move { Ok(params) });
/// ```
pub fn from_fn<C, F, Fut>(f: F) -> MethodFn<C>
where
    C: Send + 'static,
    F: Fn(C, Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = MethodResult> + Send + 'static,
{
    Arc::new(move |ctx, params| Box::pin(f(ctx, params)))
}

/// Adapt an async function with typed params and result into a
/// [`MethodFn`]. Params that fail to deserialize are reported as an
/// invalid-params error.
pub fn from_typed_fn<C, P, R, F, Fut>(f: F) -> MethodFn<C>
where
    C: Send + 'static,
    P: DeserializeOwned + Send,
    R: Serialize,
    F: Fn(C, P) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = std::result::Result<R, MethodError>> + Send + 'static,
{
    let f = Arc::new(f);
    Arc::new(move |ctx, params: Value| {
        let f = Arc::clone(&f);
        Box::pin(async move {
            let typed: P = serde_json::from_value(params).map_err(|e| {
                MethodError::Rpc(RpcError::invalid_params(Value::String(e.to_string())))
            })?;
            let result = f(ctx, typed).await?;
            serde_json::to_value(result).map_err(|e| MethodError::failure(e.to_string()))
        })
    })
}

/// Fatal configuration error raised while building a dispatcher.
#[derive(Debug, Error)]
pub enum BuildError {
    /// A method declares a params schema but no validator was configured.
    #[error("method {method:?} declares a params schema but no validator was configured")]
    MissingValidator {
        /// The offending method name.
        method: String,
    },
    /// The validator rejected a params schema.
    #[error("failed to compile params schema for method {method:?}: {reason}")]
    SchemaCompile {
        /// The offending method name.
        method: String,
        /// The validator's explanation.
        reason: String,
    },
    /// The same method name was defined twice.
    #[error("duplicate definition for method {method:?}")]
    DuplicateMethod {
        /// The offending method name.
        method: String,
    },
}

/// Normalize a method table: compile schemas once and wrap their
/// handlers with the params check.
pub(crate) fn normalize<C>(
    defs: Vec<(String, MethodDef<C>)>,
    validator: Option<&dyn Validator>,
) -> std::result::Result<HashMap<String, MethodFn<C>>, BuildError>
where
    C: Send + 'static,
{
    let mut table: HashMap<String, MethodFn<C>> = HashMap::with_capacity(defs.len());
    for (name, def) in defs {
        let normalized = match def {
            MethodDef::Handler(handler) => handler,
            MethodDef::WithSchema { params, handler } => {
                let validator = validator.ok_or_else(|| BuildError::MissingValidator {
                    method: name.clone(),
                })?;
                let check =
                    validator
                        .compile(&params)
                        .map_err(|reason| BuildError::SchemaCompile {
                            method: name.clone(),
                            reason,
                        })?;
                Arc::new(move |ctx: C, params: Value| -> BoxFuture<'static, MethodResult> {
                    let check = Arc::clone(&check);
                    let handler = Arc::clone(&handler);
                    Box::pin(async move {
                        if let Err(failures) = check(&params) {
                            let data = serde_json::to_value(failures).unwrap_or(Value::Null);
                            return Err(MethodError::Rpc(RpcError::invalid_params(data)));
                        }
                        handler(ctx, params).await
                    })
                }) as MethodFn<C>
            }
        };
        if table.insert(name.clone(), normalized).is_some() {
            return Err(BuildError::DuplicateMethod { method: name });
        }
    }
    Ok(table)
}
