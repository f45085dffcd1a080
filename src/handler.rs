//! Handler trait, type erasure, and the middleware [`Layer`] contract.
//!
//! # How async handlers are stored
//!
//! The router needs to hold handlers of *different* types in a single
//! `HashMap<Method, Tree>`, so every handler is hidden behind the same trait
//! object, [`ErasedHandler`]. Middleware works on that same erased shape: a
//! [`Layer`] receives the next handler as a [`BoxedHandler`] and hands back
//! another [`BoxedHandler`], so layers stack without knowing about each other.
//!
//! ```text
//! async fn hello(req: Request) -> Response { … }   ← user writes this
//!        ↓ router.on(Method::GET, "/", hello)
//! hello.into_boxed_handler()                       ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(hello))                       ← BoxedHandler
//!        ↓ router.layer(RequestLogger::default())
//! Arc::new(Logged { next, … })                     ← still a BoxedHandler
//!        ↓
//! handler.call(req)  at request time               ← one vtable dispatch per layer
//! ```
//!
//! Per request and per layer that costs one `Arc` clone (an atomic
//! increment) and one virtual call, which is noise next to network I/O.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::HandlerError;
use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// What a handler produces: a response, or an error the framework renders.
pub type Reply = Result<Response, HandlerError>;

/// A heap-allocated, type-erased future that resolves to a [`Reply`].
///
/// `Pin<Box<…>>` because the runtime polls the future in place and it must
/// not move after the first poll. `Send + 'static` lets tokio move it between
/// worker threads.
pub type BoxFuture = Pin<Box<dyn Future<Output = Reply> + Send + 'static>>;

/// Dispatch interface shared by route handlers and middleware.
///
/// Implement this when writing a [`Layer`]: the wrapper holds the next
/// [`BoxedHandler`] and decides when to call it.
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture;
}

/// A heap-allocated, type-erased handler shared across concurrent requests.
///
/// `Arc` gives shared ownership across connection tasks without copying the
/// handler or anything it captured.
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

// ── Middleware ────────────────────────────────────────────────────────────────

/// Wraps a handler in another handler of the same shape.
///
/// Applied with [`Router::layer`](crate::Router::layer).
pub trait Layer {
    fn layer(&self, next: BoxedHandler) -> BoxedHandler;
}

// ── Reply conversion ──────────────────────────────────────────────────────────

/// Conversion of a handler's return value into a [`Reply`].
///
/// Anything that is [`IntoResponse`] succeeds. A `Result` whose error converts
/// into [`HandlerError`] fails through to the framework error handler, which
/// makes `?` usable inside handlers.
pub trait IntoReply {
    fn into_reply(self) -> Reply;
}

impl<T: IntoResponse> IntoReply for T {
    fn into_reply(self) -> Reply {
        Ok(self.into_response())
    }
}

impl<T, E> IntoReply for Result<T, E>
where
    T: IntoResponse,
    E: Into<HandlerError>,
{
    fn into_reply(self) -> Reply {
        self.map(IntoResponse::into_response).map_err(Into::into)
    }
}

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Implemented for every valid route handler.
///
/// You never implement this yourself. It is satisfied for any `async fn`
/// with the signature:
///
/// ```text
/// async fn name(req: Request) -> impl IntoReply
/// ```
///
/// The trait is sealed so only the blanket impl below can satisfy it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

/// `Sealed` is private, so other crates cannot name it and therefore cannot
/// implement `Handler` on their own types.
mod private {
    pub trait Sealed {}
}

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoReply + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoReply + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

/// Bridges a concrete handler `F` to the trait-object world.
struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoReply + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        // Calling the function yields the concrete `Fut`. Boxing the mapped
        // future makes the return type match the trait signature.
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_reply() })
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use http::StatusCode;

    use super::*;
    use crate::error::HttpError;

    fn request() -> Request {
        Request::from(http::Request::new(Bytes::new()))
    }

    #[tokio::test]
    async fn plain_response_is_ok() {
        async fn ok(_: Request) -> StatusCode { StatusCode::ACCEPTED }

        let res = ok.into_boxed_handler().call(request()).await.unwrap();
        assert_eq!(res.status_code(), StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn result_error_passes_through() {
        async fn fail(_: Request) -> Result<Response, HttpError> {
            Err(HttpError::from_status(StatusCode::CONFLICT))
        }

        let err = fail.into_boxed_handler().call(request()).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }
}
