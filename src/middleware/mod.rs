//! Middleware layer.
//!
//! Middleware intercepts requests and responses and is the right place for
//! cross-cutting concerns. Anything implementing [`Layer`](crate::Layer)
//! plugs into [`Router::layer`](crate::Router::layer).
//!
//! # Request logging
//!
//! [`RequestLogger`] times each request, describes it with a configurable
//! list of [`Field`]s, and hands one record to a [`Sink`]:
//!
//! | Status | Level |
//! |---|---|
//! | `500` and up | `ERROR` |
//! | `400..=499` | `WARN` |
//! | anything else | `INFO` |
//!
//! The message is `"<METHOD> <path>"`. With the default configuration the
//! attributes are `latency` and `status`, records go to `tracing` under the
//! `tsu::access` target, and every request is logged.
//!
//! A handler error is rendered by the framework error handler first, so the
//! logged status is the one the client gets. Errors other than
//! [`HttpError`](crate::HttpError) also add an `error` attribute. The error
//! itself is always returned unchanged.
//!
//! ```rust,no_run
//! use tsu_slog::middleware::{AccessLogSettings, RequestLogger};
//! use tsu_slog::{Method, Request, Router, Server};
//!
//! # async fn list(_: Request) -> &'static str { "[]" }
//! #[tokio::main]
//! async fn main() -> Result<(), tsu_slog::Error> {
//!     tracing_subscriber::fmt::init();
//!
//!     let logging = AccessLogSettings::load("access_log.toml")?.into_config();
//!     let app = Router::new()
//!         .on(Method::GET, "/items", list)
//!         .layer(RequestLogger::new(logging));
//!
//!     Server::bind("0.0.0.0:3000").serve(app).await
//! }
//! ```

mod attrs;
mod config;
mod field;
mod logger;
mod settings;
mod sink;

pub use attrs::{Attributes, Value};
pub use config::{LoggerConfig, ResolvedConfig, Skipper};
pub use field::{AttrBuilder, DefaultAttrs, Exchange, Field, REQUEST_ID_HEADER, default_attrs};
pub use logger::{RequestLogger, message, severity};
pub use settings::{AccessLogSettings, ENV_PREFIX};
pub use sink::{ACCESS_TARGET, Sink, TracingSink};
