//! The request logger layer.
//!
//! # What happens to one request
//!
//! ```text
//! Logged::call(req)
//!        ↓ skipper(&req) == true?  → next.call(req), nothing else
//! seen = req.clone(); start = Instant::now()
//!        ↓
//! reply = next.call(req).await                       ← the wrapped handler
//!        ↓ Err(e)?  → e.to_response()                 ← framework error handler
//! status < min_status?  → return reply unlogged
//!        ↓
//! attrs = builder.build(config, exchange, start)     ← DefaultAttrs or custom
//!        ↓ non-HTTP error?  → attrs += error
//! sink.emit(severity(status), "GET /items", attrs)
//!        ↓
//! reply                                              ← returned unchanged
//! ```
//!
//! The error is rendered before the threshold and attributes so both see the
//! status the client actually receives. The server renders the same error
//! with the same function later, so nothing observable changes when the
//! logger is removed.

use std::sync::Arc;

use http::Method;
use tokio::time::Instant;
use tracing::Level;

use super::config::{LoggerConfig, ResolvedConfig};
use super::field::Exchange;
use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler, Layer, Reply};
use crate::request::Request;

/// Emits one structured record per request.
///
/// ```rust,no_run
/// use tsu_slog::middleware::{Field, LoggerConfig, RequestLogger};
/// use tsu_slog::{Method, Request, Router};
///
/// # async fn list(_: Request) -> &'static str { "[]" }
/// let app = Router::new()
///     .on(Method::GET, "/items", list)
///     .layer(RequestLogger::new(
///         LoggerConfig::new().fields([Field::Ip, Field::Status, Field::Latency]),
///     ));
/// ```
#[derive(Clone, Debug)]
pub struct RequestLogger {
    config: Arc<ResolvedConfig>,
}

impl RequestLogger {
    /// Resolves `config` once; every wrapped handler shares the result.
    pub fn new(config: LoggerConfig) -> Self {
        let config = config.resolve();
        tracing::debug!(
            fields = ?config.fields(),
            min_status = config.min_status(),
            "request logger configured"
        );
        Self { config: Arc::new(config) }
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }
}

impl Default for RequestLogger {
    fn default() -> Self {
        Self::new(LoggerConfig::default())
    }
}

impl Layer for RequestLogger {
    fn layer(&self, next: BoxedHandler) -> BoxedHandler {
        Arc::new(Logged { config: Arc::clone(&self.config), next })
    }
}

struct Logged {
    config: Arc<ResolvedConfig>,
    next: BoxedHandler,
}

impl ErasedHandler for Logged {
    fn call(&self, req: Request) -> BoxFuture {
        let config = Arc::clone(&self.config);
        let next = Arc::clone(&self.next);

        Box::pin(async move {
            // Skipped requests cost one predicate call: no clone, no clock.
            if (config.skipper)(&req) {
                return next.call(req).await;
            }

            // The handler consumes the request; keep a copy to describe it.
            let seen = req.clone();
            let start = Instant::now();
            let reply = next.call(req).await;
            record(&config, &seen, &reply, start);
            reply
        })
    }
}

/// Builds and emits the record for a finished request.
///
/// `latency` is read inside the builder, so time spent rendering the error
/// and checking the threshold is included.
fn record(config: &ResolvedConfig, req: &Request, reply: &Reply, start: Instant) {
    // On error, describe the response the framework error handler will send.
    let rendered;
    let (response, error) = match reply {
        Ok(res) => (res, None),
        Err(err) => {
            rendered = err.to_response();
            (&rendered, Some(err))
        }
    };

    let status = response.status_code().as_u16();
    if status < config.min_status {
        return;
    }

    let exchange = Exchange::new(req, response, error);
    let mut attrs = config.attrs.build(config, &exchange, start);
    if let Some(err) = error.filter(|e| !e.is_http()) {
        attrs.push("error", err.to_string());
    }

    config.sink.emit(severity(status), &message(req.method(), req.path()), &attrs);
}

/// `ERROR` for 5xx, `WARN` for 4xx, `INFO` for everything else.
pub fn severity(status: u16) -> Level {
    match status {
        500.. => Level::ERROR,
        400..=499 => Level::WARN,
        _ => Level::INFO,
    }
}

/// `"<METHOD> <path>"`, with an empty path shown as `/`.
pub fn message(method: &Method, path: &str) -> String {
    let path = if path.is_empty() { "/" } else { path };
    format!("{method} {path}")
}
