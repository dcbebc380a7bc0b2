//! Server-side JSON-RPC 2.0 message dispatcher
//!
//! This crate implements the server half of the protocol engine: parse
//! and validate inbound envelopes, route them through an immutable method
//! table, execute the matched handler, and map results and failures back
//! into wire messages.
//!
//! # Building a dispatcher
//!
//! ```rust
//! use tether_handler::{Dispatcher, from_typed_fn};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct AddParams { a: i64, b: i64 }
//!
//! let dispatcher = Dispatcher::builder()
//!     .method("add", from_typed_fn(|_ctx: (), p: AddParams| async move {
//!         Ok(p.a + p.b)
//!     }))
//!     .build()
//!     .unwrap();
//! ```
//!
//! Handlers either return a value or fail with a [`MethodError`]; every
//! failure shape is normalized into the error taxonomy before it reaches
//! the wire. Parameter schemas plug in through the
//! [`validate::Validator`] collaborator and are compiled once at build
//! time.

pub mod validate;

mod dispatch;
mod methods;

pub use dispatch::{Dispatcher, DispatcherBuilder, ErrorHookFn, HookFn};
pub use methods::{
    from_fn, from_typed_fn, BuildError, MethodDef, MethodError, MethodFn, MethodResult,
};
