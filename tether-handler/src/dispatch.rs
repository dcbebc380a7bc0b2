//! Message dispatcher
//!
//! The dispatcher is the server-side counterpart of the clients: it takes
//! one inbound envelope plus a host context, validates and routes it, and
//! produces the outbound envelope the host transport should send back —
//! or nothing, for notifications and id-less invalid messages.
//!
//! # Dispatch algorithm
//!
//! 1. Wrong protocol marker or missing method: id-less messages go to
//!    `on_invalid_message` and produce nothing; messages with an id get
//!    an invalid-request error response.
//! 2. Well-formed but id-less: `on_notification`, produce nothing.
//! 3. Unknown method name: method-not-found error response.
//! 4. Invoke the normalized handler with `(ctx, params ?? {})`.
//! 5. Success: `{id, result}`.
//! 6. Failure: `on_handler_error`, then an error response normalized
//!    through the single [`MethodError`] path.
//!
//! A failing handler never crashes the dispatcher; malformed tables are
//! rejected when the dispatcher is built, not when a request arrives.
//!
//! # Examples
//!
//! ```rust
//! use tether_handler::{Dispatcher, from_fn};
//! use tether_core::{Envelope, Id};
//! use serde_json::json;
//!
//! # async fn demo() -> Result<(), tether_handler::BuildError> {
//! let dispatcher = Dispatcher::builder()
//!     .method("echo", from_fn(|_ctx: (), params| async move { Ok(params) }))
//!     .build()?;
//!
//! let request = Envelope::request(Id::String("1".into()), "echo", Some(json!({"v": 1})));
//! let reply = dispatcher.dispatch((), request).await.unwrap();
//! assert_eq!(reply.result, Some(json!({"v": 1})));
//! # Ok(())
//! # }
//! ```

use crate::methods::{normalize, BuildError, MethodDef, MethodError, MethodFn};
use crate::validate::Validator;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tether_core::{codec, Envelope, Id, RpcError};

/// Host callback for notifications and invalid messages.
pub type HookFn<C> = Arc<dyn Fn(&C, &Envelope) + Send + Sync>;

/// Host callback for handler failures.
pub type ErrorHookFn<C> = Arc<dyn Fn(&C, &Envelope, &MethodError) + Send + Sync>;

/// Server-side JSON-RPC message dispatcher.
///
/// Built once from a method table via [`Dispatcher::builder`]; immutable
/// and cheaply cloneable afterwards, safe for concurrent dispatch.
#[derive(Clone)]
pub struct Dispatcher<C> {
    methods: Arc<HashMap<String, MethodFn<C>>>,
    on_handler_error: ErrorHookFn<C>,
    on_invalid_message: HookFn<C>,
    on_notification: HookFn<C>,
}

impl<C> Dispatcher<C>
where
    C: Clone + Send + 'static,
{
    /// Start building a dispatcher.
    pub fn builder() -> DispatcherBuilder<C> {
        DispatcherBuilder::new()
    }

    /// Whether `method` is registered.
    pub fn has_method(&self, method: &str) -> bool {
        self.methods.contains_key(method)
    }

    /// Process one inbound envelope. Returns the response envelope to
    /// send back, or `None` when the message produces no response.
    pub async fn dispatch(&self, ctx: C, message: Envelope) -> Option<Envelope> {
        let method = match (message.has_protocol_marker(), message.method.clone()) {
            (true, Some(method)) => method,
            _ => {
                return match message.id.clone() {
                    None => {
                        (self.on_invalid_message)(&ctx, &message);
                        None
                    }
                    Some(id) => Some(Envelope::failure(id, RpcError::invalid_request(None))),
                };
            }
        };

        let Some(id) = message.id.clone() else {
            (self.on_notification)(&ctx, &message);
            return None;
        };

        let Some(handler) = self.methods.get(&method) else {
            return Some(Envelope::failure(id, RpcError::method_not_found(None)));
        };

        let params = message.params.clone().unwrap_or_else(|| json!({}));
        match handler(ctx.clone(), params).await {
            Ok(result) => Some(Envelope::success(id, result)),
            Err(error) => {
                (self.on_handler_error)(&ctx, &message, &error);
                Some(Envelope::failure(id, error.into_rpc_error()))
            }
        }
    }

    /// Decode `text` and dispatch it. Unparseable input produces a parse
    /// error response with a null id, since no request id can be
    /// recovered from it.
    pub async fn dispatch_text(&self, ctx: C, text: &str) -> Option<Envelope> {
        match codec::decode(text) {
            Ok(message) => self.dispatch(ctx, message).await,
            Err(_) => Some(Envelope::failure(Id::Null, RpcError::parse_error(None))),
        }
    }
}

/// Builder for [`Dispatcher`].
///
/// Collects method definitions, the optional validator collaborator and
/// the host callbacks, then normalizes the table in
/// [`build`](DispatcherBuilder::build). Configuration errors fail the
/// build; they are never deferred to request time.
pub struct DispatcherBuilder<C> {
    defs: Vec<(String, MethodDef<C>)>,
    validator: Option<Arc<dyn Validator>>,
    on_handler_error: Option<ErrorHookFn<C>>,
    on_invalid_message: Option<HookFn<C>>,
    on_notification: Option<HookFn<C>>,
}

impl<C> DispatcherBuilder<C>
where
    C: Clone + Send + 'static,
{
    fn new() -> Self {
        Self {
            defs: Vec::new(),
            validator: None,
            on_handler_error: None,
            on_invalid_message: None,
            on_notification: None,
        }
    }

    /// Register a bare method handler.
    pub fn method(mut self, name: impl Into<String>, handler: MethodFn<C>) -> Self {
        self.defs.push((name.into(), MethodDef::Handler(handler)));
        self
    }

    /// Register a handler guarded by a parameter schema. Requires a
    /// validator to be configured before [`build`](Self::build).
    pub fn method_with_schema(
        mut self,
        name: impl Into<String>,
        params: Value,
        handler: MethodFn<C>,
    ) -> Self {
        self.defs
            .push((name.into(), MethodDef::WithSchema { params, handler }));
        self
    }

    /// Register a pre-built table entry.
    pub fn define(mut self, name: impl Into<String>, def: MethodDef<C>) -> Self {
        self.defs.push((name.into(), def));
        self
    }

    /// Set the schema validator collaborator.
    pub fn validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Called after a handler fails, before the error response is built.
    pub fn on_handler_error(
        mut self,
        hook: impl Fn(&C, &Envelope, &MethodError) + Send + Sync + 'static,
    ) -> Self {
        self.on_handler_error = Some(Arc::new(hook));
        self
    }

    /// Called for id-less messages that are not valid requests.
    pub fn on_invalid_message(mut self, hook: impl Fn(&C, &Envelope) + Send + Sync + 'static) -> Self {
        self.on_invalid_message = Some(Arc::new(hook));
        self
    }

    /// Called for well-formed notifications.
    pub fn on_notification(mut self, hook: impl Fn(&C, &Envelope) + Send + Sync + 'static) -> Self {
        self.on_notification = Some(Arc::new(hook));
        self
    }

    /// Normalize the method table and produce the dispatcher.
    pub fn build(self) -> std::result::Result<Dispatcher<C>, BuildError> {
        let methods = normalize(self.defs, self.validator.as_deref())?;
        Ok(Dispatcher {
            methods: Arc::new(methods),
            on_handler_error: self
                .on_handler_error
                .unwrap_or_else(|| Arc::new(|_, _, _| {})),
            on_invalid_message: self.on_invalid_message.unwrap_or_else(|| {
                Arc::new(|_, message| {
                    tracing::warn!(?message, "unhandled invalid message");
                })
            }),
            on_notification: self.on_notification.unwrap_or_else(|| {
                Arc::new(|_, message| {
                    tracing::warn!(
                        method = message.method.as_deref().unwrap_or(""),
                        "unhandled notification"
                    );
                })
            }),
        })
    }
}
