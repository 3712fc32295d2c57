//! Handler registry and dispatch.
//!
//! # Responsibilities
//! - Store path → handler mappings built at startup
//! - Look up the handler for a request's URL
//! - Return an explicit "not handled" rather than a silent default
//!
//! # Design Decisions
//! - Immutable after construction (shared via `Arc`, no locking)
//! - Exact path lookup only; no prefix or pattern matching
//! - Last registration for a path wins

pub mod router;
