//! # tsu-slog
//!
//! Structured request logging for a minimal HTTP framework that lives
//! behind a reverse proxy.
//!
//! Every request produces one record: a `"<METHOD> <path>"` message, a
//! level picked from the response status, and an ordered list of attributes
//! (latency, status, client address, correlation id, …) chosen by
//! configuration. Where the record goes is up to the [`Sink`]; by default it
//! is a `tracing` event.
//!
//! [`Sink`]: middleware::Sink
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use tsu_slog::middleware::{Field, LoggerConfig, RequestLogger};
//! use tsu_slog::{HttpError, Method, Request, Response, Router, Server, StatusCode};
//!
//! #[tokio::main]
//! async fn main() {
//!     tracing_subscriber::fmt::init();
//!
//!     let app = Router::new()
//!         .on(Method::GET,  "/users/{id}", get_user)
//!         .on(Method::POST, "/users",      create_user)
//!         .layer(RequestLogger::new(
//!             LoggerConfig::new()
//!                 .fields([Field::Id, Field::Ip, Field::Status, Field::Latency])
//!                 .skipper(|req| req.path() == "/healthz"),
//!         ));
//!
//!     Server::bind("0.0.0.0:3000").serve(app).await.unwrap();
//! }
//!
//! async fn get_user(req: Request) -> Response {
//!     let id = req.param("id").unwrap_or("unknown");
//!     Response::json(format!(r#"{{"id":"{id}"}}"#).into_bytes())
//! }
//!
//! async fn create_user(req: Request) -> Result<Response, HttpError> {
//!     if req.body().is_empty() {
//!         return Err(HttpError::new(StatusCode::BAD_REQUEST, "empty body"));
//!     }
//!     Ok(Response::builder()
//!         .status(StatusCode::CREATED)
//!         .header("location", "/users/99")
//!         .json(br#"{"id":"99"}"#.to_vec()))
//! }
//! ```

mod error;
mod handler;
mod request;
mod response;
mod router;
mod server;

pub mod middleware;

pub use error::{Error, HandlerError, HttpError};
pub use handler::{BoxFuture, BoxedHandler, ErasedHandler, Handler, IntoReply, Layer, Reply};
pub use http::{Method, StatusCode};
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
