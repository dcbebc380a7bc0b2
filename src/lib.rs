//! tether — transport-agnostic JSON-RPC 2.0 messaging core
//!
//! This is the convenience crate that re-exports the tether sub-crates.
//! Use it when you want a single dependency covering both sides of the
//! protocol.
//!
//! # Architecture
//!
//! - **tether-core**: envelope types, error taxonomy, codec
//! - **tether-client**: request and stream clients over pluggable
//!   transports
//! - **tether-handler**: server-side message dispatcher
//!
//! # Quick Start - Dispatcher
//!
//! ```rust
//! use tether::handler::{Dispatcher, from_typed_fn};
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
//! # Quick Start - Client
//!
//! ```rust,no_run
//! use tether::client::{Client, StreamClient};
//! use tether::client::transport::Duplex;
//!
//! # async fn demo(transport: impl Duplex) -> tether::core::Result<()> {
//! let client = StreamClient::new(transport);
//! client.connect()?;
//! let status = client.request("status", None).await?;
//! println!("{status}");
//! # Ok(())
//! # }
//! ```

// Re-export all public APIs from sub-crates
pub use tether_client as client;
pub use tether_core as core;
pub use tether_handler as handler;

// Convenience re-exports of the most commonly used types
pub use tether_client::{Client, RequestClient, StreamClient};
pub use tether_core::{Envelope, Error, Id, Result, RpcError};
pub use tether_handler::Dispatcher;
