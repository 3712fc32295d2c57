//! Cross-cutting observability.
//!
//! # Design Decisions
//! - Uses the tracing crate for structured logging
//! - Log level configurable via `RUST_LOG`, with a crate-level default

pub mod logging;
