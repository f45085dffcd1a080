//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. Requests that match no
//! route go to a fallback handler, so middleware sees them too.

use std::collections::HashMap;
use std::sync::Arc;

use http::{Method, StatusCode};
use matchit::Router as MatchitRouter;

use crate::error::HttpError;
use crate::handler::{BoxedHandler, Handler, Layer, Reply};
use crate::request::Request;

/// The application router.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve).
/// Each builder method returns `self` so registrations chain naturally.
pub struct Router {
    routes: HashMap<Method, RouteTree>,
    fallback: BoxedHandler,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new(), fallback: not_found.into_boxed_handler() }
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` retrieves them:
    ///
    /// ```rust,no_run
    /// # use tsu_slog::{Method, Request, Response, Router};
    /// # async fn get_user(_: Request) -> Response { Response::text("") }
    /// # async fn create_user(_: Request) -> Response { Response::text("") }
    /// Router::new()
    ///     .on(Method::GET,  "/users/{id}", get_user)
    ///     .on(Method::POST, "/users",      create_user);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route or conflicts with one already
    /// registered.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler());
        self
    }

    /// Replaces the handler used when no route matches. Defaults to a
    /// `404 Not Found` HTTP error.
    pub fn fallback(mut self, handler: impl Handler) -> Self {
        self.fallback = handler.into_boxed_handler();
        self
    }

    /// Wraps every route registered so far, and the fallback, in `layer`.
    ///
    /// Routes added after this call are not wrapped. Layers applied later
    /// run first.
    pub fn layer(mut self, layer: impl Layer) -> Self {
        self.routes = std::mem::take(&mut self.routes)
            .into_iter()
            .map(|(method, tree)| (method, tree.wrap(&layer)))
            .collect();
        self.fallback = layer.layer(Arc::clone(&self.fallback));
        self
    }

    /// Routes one request through the matching handler and its layers.
    pub async fn handle(&self, req: Request) -> Reply {
        match self.lookup(req.method(), req.path()) {
            Some((handler, params)) => handler.call(req.with_params(params)).await,
            None => self.fallback.call(req).await,
        }
    }

    fn lookup(
        &self,
        method: &Method,
        path: &str,
    ) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let tree = self.routes.get(method)?;
        let matched = tree.tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

async fn not_found(_req: Request) -> Result<StatusCode, HttpError> {
    Err(HttpError::from_status(StatusCode::NOT_FOUND))
}

/// One method's radix tree plus the registered patterns.
///
/// matchit trees cannot be iterated, so the patterns are kept to rebuild the
/// tree when a layer wraps every handler.
#[derive(Default)]
struct RouteTree {
    tree: MatchitRouter<BoxedHandler>,
    entries: Vec<(String, BoxedHandler)>,
}

impl RouteTree {
    fn insert(&mut self, path: &str, handler: BoxedHandler) {
        self.tree
            .insert(path, Arc::clone(&handler))
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self.entries.push((path.to_owned(), handler));
    }

    fn wrap(self, layer: &impl Layer) -> Self {
        let mut wrapped = Self::default();
        for (path, handler) in self.entries {
            wrapped.insert(&path, layer.layer(handler));
        }
        wrapped
    }
}
