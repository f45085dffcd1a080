//! Error types.
//!
//! Two families live here. [`Error`] covers infrastructure failures that stop
//! the process from serving at all. [`HandlerError`] is what a route handler
//! returns when a single request goes wrong; the framework renders it into a
//! response via [`HandlerError::to_response`].

use std::error::Error as StdError;
use std::fmt;

use http::StatusCode;

use crate::response::Response;

/// The error type returned by the crate's fallible operations.
///
/// Per-request failures are [`HandlerError`]s, not `Error`s. This type
/// surfaces binding or accepting a connection and loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("config: {0}")]
    Config(#[from] figment::Error),
}

/// An expected HTTP failure carrying its own status code.
///
/// Returning one of these from a handler produces a response with that
/// status and the message as a plain-text body. The request logger treats it
/// as already described by the status and does not attach an `error`
/// attribute.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{status}: {message}")]
pub struct HttpError {
    pub status: StatusCode,
    pub message: String,
}

impl HttpError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }

    /// Uses the canonical reason phrase as the message.
    pub fn from_status(status: StatusCode) -> Self {
        Self::new(status, status.canonical_reason().unwrap_or_default())
    }
}

/// The error half of a handler's [`Reply`](crate::Reply).
///
/// Any `std::error::Error + Send + Sync + 'static` converts into it with `?`.
/// The original value is kept intact so callers further up the chain can
/// downcast it.
pub struct HandlerError(Box<dyn StdError + Send + Sync + 'static>);

impl HandlerError {
    pub fn new(err: impl StdError + Send + Sync + 'static) -> Self {
        Self(Box::new(err))
    }

    /// Returns the wrapped [`HttpError`] if this is one.
    pub fn as_http(&self) -> Option<&HttpError> {
        self.0.downcast_ref::<HttpError>()
    }

    pub fn is_http(&self) -> bool {
        self.as_http().is_some()
    }

    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        self.0.downcast_ref::<E>()
    }

    /// The status the framework answers with for this error.
    pub fn status(&self) -> StatusCode {
        self.as_http()
            .map_or(StatusCode::INTERNAL_SERVER_ERROR, |e| e.status)
    }

    /// Framework error handler: renders the error into the response the
    /// client receives.
    ///
    /// HTTP errors expose their message. Anything else is an internal failure
    /// and the client only sees the reason phrase.
    pub fn to_response(&self) -> Response {
        match self.as_http() {
            Some(e) => Response::builder().status(e.status).text(e.message.clone()),
            None => Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .text("Internal Server Error"),
        }
    }
}

impl<E> From<E> for HandlerError
where
    E: StdError + Send + Sync + 'static,
{
    fn from(err: E) -> Self {
        Self(Box::new(err))
    }
}

impl fmt::Debug for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
