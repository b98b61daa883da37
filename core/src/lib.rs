//! Typed JSON request builder with lifecycle hooks.
//!
//! # Overview
//! A [`Fetcher`] wraps a [`Transport`] with the five JSON verbs. Options are
//! layered over instance defaults, the request is assembled, sent, and the
//! response body parsed as JSON, with hooks invoked at fixed points that can
//! observe the call or abort it with their own error.
//!
//! ```no_run
//! use fetcher_core::{create_fetcher, FetcherConfig, FetcherError};
//!
//! async fn load_user() -> Result<(), FetcherError> {
//!     let config = FetcherConfig::default().base_url("https://api.example.com");
//!     let fetcher = create_fetcher(config);
//!     let result = fetcher.get("/users/1").json::<serde_json::Value>().await?;
//!     println!("{} -> {}", result.response.status, result.data);
//!     Ok(())
//! }
//! ```
//!
//! # Design
//! - `Fetcher` is immutable after construction; concurrent calls share it by
//!   reference and never interact.
//! - Verb methods return a `PreparedRequest`; only `json` performs I/O.
//! - A non-2xx status is data handed to `on_response_not_ok_error`, not an
//!   error. Callers that want it to fail abort from that hook.
//! - The transport is a trait so the core stays independent of any HTTP
//!   stack; `UreqTransport` is provided behind the `ureq-transport` feature
//!   and runs its blocking exchanges on the tokio blocking pool.

pub mod client;
pub mod config;
pub mod error;
pub mod hooks;
pub mod http;
pub mod options;
mod request;
pub mod transport;

#[cfg(feature = "ureq-transport")]
pub use client::create_fetcher;
pub use client::{FetchResult, Fetcher, PreparedRequest};
pub use config::FetcherConfig;
pub use error::{exception, ErrorKind, FetcherError, HookError, TransportError};
pub use hooks::{Flow, Hooks, JsonErrorContext, ResponseContext};
pub use http::{Headers, Method, RequestInit, Response};
pub use options::{BodyFullOptions, BodyLessOptions, FetchOptions, RequestOptions};
pub use transport::Transport;
#[cfg(feature = "ureq-transport")]
pub use transport::UreqTransport;
