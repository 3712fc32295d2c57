//! Shared helpers for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use tinyserve::{Router, Server, ServerConfig};

/// Start a server on an ephemeral loopback port.
pub async fn start_server(router: Router) -> (Server, SocketAddr) {
    let config = ServerConfig { bind_address: "127.0.0.1".to_string(), port: 0 };
    let mut server = Server::new(config, Arc::new(router));
    server.start().await.unwrap();
    let addr = server.local_addr().unwrap();
    (server, addr)
}

/// Send raw bytes over a fresh connection and read the full response. The
/// write side is shut down after sending so the server sees end of stream.
pub async fn send_raw(addr: SocketAddr, request: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request.as_bytes()).await.unwrap();
    stream.shutdown().await.unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    response
}

/// The `<status> <reason>` portion of the response status line.
#[allow(dead_code)]
pub fn status_of(response: &str) -> &str {
    let line = response.lines().next().unwrap_or("");
    line.strip_prefix("HTTP/1.1 ").unwrap_or(line)
}
