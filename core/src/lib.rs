//! Reusable base for blocking HTTP API clients.
//!
//! # Overview
//! `ApiClient` issues GET/POST/PUT/DELETE requests against a configured
//! host, replays session cookies, retries on timeout and exposes hooks for
//! API-specific customization. `ResultView` offers name-keyed access to
//! decoded results.
//!
//! # Design
//! - Requests and responses are plain data (`HttpRequest`, `HttpResponse`);
//!   the network round-trip lives behind the `Transport` trait, with ureq as
//!   the default implementation.
//! - Only timeouts (408, 504, or a transport timeout) are retried, in a
//!   bounded loop of at most `max_retries` attempts.
//! - API-specific behaviour is injected through `ApiHooks` at construction.

pub mod client;
pub mod config;
pub mod cookies;
pub mod error;
pub mod hooks;
pub mod http;
pub mod result;
pub mod retry;
pub mod transport;
pub mod wire;

pub use client::ApiClient;
pub use config::{CallOptions, ClientConfig, ConfigError};
pub use cookies::CookieJar;
pub use error::ApiError;
pub use hooks::{ApiHooks, NoHooks, Params};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use result::ResultView;
pub use retry::RetryState;
pub use transport::{Connection, Transport, TransportError, UreqTransport};
