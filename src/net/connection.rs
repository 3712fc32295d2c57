//! Per-connection worker: drives one socket from accept to close.
//!
//! # Responsibilities
//! - Parse the request and dispatch it through the router
//! - Translate parse and handler failures into synthetic error responses
//! - Flush and shut the connection down on every exit path
//!
//! # Design Decisions
//! - Each processing step (parse, not-found response, error response) is a
//!   replaceable strategy; substituting one step never touches the others
//! - Error responses are best effort: if the write side is already broken
//!   there is no channel left to report on, so the socket just closes

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::net::TcpStream;

use crate::http::parser::{self, ParseError};
use crate::http::request::Request;
use crate::http::response;
use crate::routing::router::Router;

/// Global counter for connection IDs. Relaxed ordering is enough; only
/// uniqueness matters.
static CONNECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a connection, used as a tracing field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn new() -> Self {
        Self(CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Boxed future for a pluggable parse step.
pub type ParseFuture<'a> = Pin<Box<dyn Future<Output = Result<(), ParseError>> + Send + 'a>>;
/// Boxed future for a pluggable response step.
pub type RespondFuture<'a> = Pin<Box<dyn Future<Output = io::Result<()>> + Send + 'a>>;

/// Parse step: populate the request from its read side.
pub type ParseStep = Arc<dyn for<'a> Fn(&'a mut Request) -> ParseFuture<'a> + Send + Sync>;
/// Fallback invoked when no handler claimed the request.
pub type NotFoundStep = Arc<dyn for<'a> Fn(&'a mut Request) -> RespondFuture<'a> + Send + Sync>;
/// Invoked with a rendering of the failure when parsing or a handler failed.
pub type ErrorStep = Arc<dyn for<'a> Fn(&'a mut Request, &'a str) -> RespondFuture<'a> + Send + Sync>;

fn default_parse(req: &mut Request) -> ParseFuture<'_> {
    Box::pin(parser::parse_request(req))
}

fn default_not_found(req: &mut Request) -> RespondFuture<'_> {
    Box::pin(req.respond(response::NOT_FOUND, response::NOT_FOUND_BODY))
}

fn default_error<'a>(req: &'a mut Request, detail: &'a str) -> RespondFuture<'a> {
    Box::pin(req.respond(response::INTERNAL_SERVER_ERROR, detail))
}

/// Connection worker: the per-socket unit of execution.
///
/// Cheap to clone; the listener clones one worker per accepted socket. All
/// fields are shared, read-only state.
#[derive(Clone)]
pub struct Worker {
    router: Arc<Router>,
    parse: ParseStep,
    not_found: NotFoundStep,
    on_error: ErrorStep,
}

impl Worker {
    /// A worker with the standard parse and response steps.
    pub fn new(router: Arc<Router>) -> Self {
        Self {
            router,
            parse: Arc::new(default_parse),
            not_found: Arc::new(default_not_found),
            on_error: Arc::new(default_error),
        }
    }

    /// Replace the parse step.
    pub fn with_parse(mut self, parse: ParseStep) -> Self {
        self.parse = parse;
        self
    }

    /// Replace the response written when no handler claimed the request.
    pub fn with_not_found(mut self, not_found: NotFoundStep) -> Self {
        self.not_found = not_found;
        self
    }

    /// Replace the response written when parsing or a handler failed.
    pub fn with_error(mut self, on_error: ErrorStep) -> Self {
        self.on_error = on_error;
        self
    }

    /// Drive one connection to completion. Never returns an error: every
    /// failure is either answered on this connection or logged, and the
    /// socket is flushed and shut down on every path.
    pub async fn run(&self, stream: TcpStream, peer_addr: SocketAddr) {
        let id = ConnectionId::new();
        tracing::debug!(connection_id = %id, peer_addr = %peer_addr, "connection accepted");

        let mut request = Request::new(stream);
        if let Err(detail) = self.process(&mut request, id).await {
            // Best effort: the write side may already be gone.
            if let Err(e) = (self.on_error)(&mut request, &detail).await {
                tracing::debug!(connection_id = %id, error = %e, "error response not delivered");
            }
        }

        // Flush before close so buffered response bytes are not dropped.
        if let Err(e) = request.finish().await {
            tracing::debug!(connection_id = %id, error = %e, "connection teardown failed");
        }
        tracing::debug!(connection_id = %id, "connection closed");
    }

    /// Parse and dispatch. `Err` carries a rendering of the failure for the
    /// error response.
    async fn process(&self, request: &mut Request, id: ConnectionId) -> Result<(), String> {
        if let Err(e) = (self.parse)(request).await {
            tracing::debug!(connection_id = %id, error = %e, "request rejected");
            return Err(e.to_string());
        }

        tracing::debug!(
            connection_id = %id,
            method = %request.method,
            url = %request.url,
            "request parsed"
        );

        match self.router.dispatch(request).await {
            Ok(true) => Ok(()),
            Ok(false) => (self.not_found)(request).await.map_err(|e| e.to_string()),
            Err(e) => {
                tracing::warn!(connection_id = %id, url = %request.url, error = %e, "handler failed");
                Err(e.to_string())
            }
        }
    }
}

impl std::fmt::Debug for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker").field("router", &self.router).finish_non_exhaustive()
    }
}
