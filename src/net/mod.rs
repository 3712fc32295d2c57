//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (single-slot accept gate, worker spawn)
//!     → connection.rs (parse → dispatch → respond → close)
//! ```
//!
//! # Design Decisions
//! - At most one accept operation outstanding at any time
//! - One task per connection; workers share only the read-only router
//! - Worker failures never reach the accept loop; only an accept-time
//!   transport failure stops it

pub mod connection;
pub mod listener;
