//! Exact-path route lookup and dispatch.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::http::request::Request;

/// Failure raised by a handler. Rendered into the 500 response body.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Boxed future returned by a handler, borrowing the request it writes to.
pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = Result<bool, HandlerError>> + Send + 'a>>;

/// A registered handler. Writes its response through the request's write side
/// and reports whether it produced one.
///
/// Handlers are typically plain functions:
///
/// ```ignore
/// fn hello(req: &mut Request) -> HandlerFuture<'_> {
///     Box::pin(async move {
///         req.respond(response::OK, "hello").await?;
///         Ok(true)
///     })
/// }
/// ```
pub type Handler = Arc<dyn for<'a> Fn(&'a mut Request) -> HandlerFuture<'a> + Send + Sync>;

/// Path → handler table. Built once at startup, then moved into an `Arc` and
/// read concurrently by connection workers without locking.
#[derive(Default)]
pub struct Router {
    routes: HashMap<String, Handler>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Insert or replace the handler for `path`. The last registration for a
    /// given path wins.
    pub fn register<F>(&mut self, path: impl Into<String>, handler: F)
    where
        F: for<'a> Fn(&'a mut Request) -> HandlerFuture<'a> + Send + Sync + 'static,
    {
        self.routes.insert(path.into(), Arc::new(handler));
    }

    /// Look up `request.url` exactly and invoke the handler if one is
    /// registered. Returns `Ok(false)`, with no side effects, when no handler
    /// matches or the matched handler declined the request.
    pub async fn dispatch(&self, request: &mut Request) -> Result<bool, HandlerError> {
        match self.routes.get(&request.url) {
            Some(handler) => handler(request).await,
            None => Ok(false),
        }
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router").field("routes", &self.routes.keys()).finish()
    }
}
