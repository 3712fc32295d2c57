//! HTTP request model, parser and response helpers.
//!
//! # Data Flow
//! ```text
//! Accepted socket
//!     → request.rs (stream halves wrapped in a Request)
//!     → parser.rs (request line → headers → URL normalization → body skip)
//!     → handler or default response written through response.rs helpers
//! ```
//!
//! # Design Decisions
//! - Line-oriented parsing with no read-ahead beyond the current line
//! - Headers and query pairs share one parameter map; first write wins
//! - Request bodies are drained, never interpreted
//! - Default responses carry no headers, only a status line and a body

pub mod parser;
pub mod request;
pub mod response;
