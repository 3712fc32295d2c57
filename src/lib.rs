//! tinyserve: a one-request-per-connection HTTP listener.
//!
//! # Architecture Overview
//!
//! ```text
//!                  ┌─────────────────────────────────────────────┐
//!                  │                  TINYSERVE                   │
//!                  │                                              │
//!   TCP connection │  ┌──────────┐     ┌────────────┐            │
//!   ───────────────┼─▶│   net    │────▶│    net     │            │
//!                  │  │ listener │     │ connection │            │
//!                  │  └──────────┘     └─────┬──────┘            │
//!                  │                         │                    │
//!                  │                         ▼                    │
//!                  │  ┌──────────┐     ┌────────────┐            │
//!   HTTP response  │  │   http   │◀────│  routing   │            │
//!   ◀──────────────┼──│ parser + │     │   router   │            │
//!                  │  │ response │     └────────────┘            │
//!                  │  └──────────┘                                │
//!                  │                                              │
//!                  │  ┌────────────────────────────────────────┐ │
//!                  │  │        Cross-Cutting Concerns           │ │
//!                  │  │   ┌────────┐       ┌───────────────┐   │ │
//!                  │  │   │ config │       │ observability │   │ │
//!                  │  │   └────────┘       └───────────────┘   │ │
//!                  │  └────────────────────────────────────────┘ │
//!                  └─────────────────────────────────────────────┘
//! ```
//!
//! Each accepted connection carries exactly one request: the listener accepts
//! a socket (at most one accept outstanding at a time), hands it to a
//! connection worker task, the worker parses the request line and headers,
//! dispatches on the exact URL path, and closes the connection once the
//! response is flushed. No keep-alive, no chunked encoding, no body
//! interpretation.

pub mod config;
pub mod http;
pub mod net;
pub mod observability;
pub mod routing;

pub use config::ServerConfig;
pub use http::request::Request;
pub use net::connection::Worker;
pub use net::listener::{Server, ServerError};
pub use routing::router::{HandlerError, HandlerFuture, Router};
