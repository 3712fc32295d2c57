//! The per-connection request model.
//!
//! # Responsibilities
//! - Hold the parsed request line fields and the parameter map
//! - Expose trimmed line reads over the connection's read half
//! - Expose buffered writes and an explicit flush over the write half
//!
//! # Design Decisions
//! - One `Request` per connection; it never outlives the socket
//! - Stream halves are boxed so tests can substitute in-memory pipes

use std::collections::HashMap;
use std::io;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::TcpStream;

use crate::http::response::Status;

/// Readable half of a connection, line-oriented.
pub type RequestReader = Box<dyn AsyncRead + Send + Unpin>;
/// Writable half of a connection, buffered.
pub type RequestWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// One parsed HTTP request, bound to the lifetime of its connection.
///
/// The parsed fields are populated by [`crate::http::parser`] during the parse
/// phase and are not mutated afterwards; handlers read them and write their
/// response through [`Request::write_line`] or [`Request::respond`].
pub struct Request {
    /// Upper-cased method token, e.g. `GET`.
    pub method: String,
    /// Path component only once parsing completes; never contains a scheme or
    /// host.
    pub url: String,
    /// Raw trailing portion of the request line, e.g. `HTTP/1.1`. May be
    /// empty.
    pub protocol_version: String,
    /// Unified header/query parameter map, lower-cased header keys. First
    /// write wins; see the parser for the exact precedence rules.
    pub parameters: HashMap<String, String>,

    reader: BufReader<RequestReader>,
    writer: BufWriter<RequestWriter>,
}

impl Request {
    /// Wrap an accepted TCP stream.
    pub fn new(stream: TcpStream) -> Self {
        let (read_half, write_half) = stream.into_split();
        Self::from_parts(Box::new(read_half), Box::new(write_half))
    }

    /// Build a request over arbitrary stream halves. Used by tests to drive
    /// the parser over in-memory pipes.
    pub fn from_parts(reader: RequestReader, writer: RequestWriter) -> Self {
        Self {
            method: String::new(),
            url: String::new(),
            protocol_version: String::new(),
            parameters: HashMap::new(),
            reader: BufReader::new(reader),
            writer: BufWriter::new(writer),
        }
    }

    /// Look up a parameter by key.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).map(String::as_str)
    }

    /// Insert a parameter only if the key is not already present. The parser
    /// uses this for both headers and query pairs, which is what makes the
    /// first occurrence win.
    pub(crate) fn insert_param_if_absent(&mut self, key: String, value: String) {
        self.parameters.entry(key).or_insert(value);
    }

    /// Read one line, with the trailing newline and any other trailing
    /// whitespace removed. End of stream reads as an empty line.
    pub(crate) async fn read_trimmed_line(&mut self) -> io::Result<String> {
        let mut line = String::new();
        self.reader.read_line(&mut line).await?;
        let trimmed = line.trim_end().len();
        line.truncate(trimmed);
        Ok(line)
    }

    /// Whether the read buffer holds unread bytes after header parsing, i.e.
    /// whether a body (or part of one) has already arrived.
    pub(crate) fn has_buffered_input(&self) -> bool {
        !self.reader.buffer().is_empty()
    }

    /// Drain the read side to end of stream without interpreting the bytes.
    pub(crate) async fn drain_input(&mut self) -> io::Result<()> {
        let mut chunk = [0u8; 1024];
        while self.reader.read(&mut chunk).await? != 0 {}
        Ok(())
    }

    /// Write a line terminated with CRLF into the output buffer.
    pub async fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\r\n").await
    }

    /// Write a complete minimal response: status line, empty line, body. No
    /// response headers are emitted.
    pub async fn respond(&mut self, status: Status, body: &str) -> io::Result<()> {
        self.write_line(&format!("HTTP/1.1 {} {}", status.code, status.reason)).await?;
        self.write_line("").await?;
        self.write_line(body).await
    }

    /// Flush buffered response bytes to the socket.
    pub async fn flush(&mut self) -> io::Result<()> {
        self.writer.flush().await
    }

    /// Flush and shut down the write side. Called on every connection exit
    /// path; flush runs first so buffered bytes are not dropped.
    pub(crate) async fn finish(&mut self) -> io::Result<()> {
        self.writer.flush().await?;
        self.writer.shutdown().await
    }
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("protocol_version", &self.protocol_version)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}
