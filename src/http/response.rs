//! Response status codes and default bodies.
//!
//! The default paths write `HTTP/1.1 <status> <reason>`, an empty line, then a
//! plain-text body. No Content-Length, no Content-Type.

/// A status code paired with its fixed reason phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    pub code: u16,
    pub reason: &'static str,
}

pub const OK: Status = Status { code: 200, reason: "OK" };
pub const NOT_FOUND: Status = Status { code: 404, reason: "Not Found" };
pub const INTERNAL_SERVER_ERROR: Status = Status { code: 500, reason: "Internal Server Error" };

/// Body sent when no handler claimed the request.
pub const NOT_FOUND_BODY: &str = "Page Not Found";

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.code, self.reason)
    }
}
