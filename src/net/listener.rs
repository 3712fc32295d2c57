//! Accept loop with a single-slot accept gate.
//!
//! # Responsibilities
//! - Bind the listening socket on the configured address
//! - Keep at most one accept operation outstanding at any time
//! - Spawn a connection worker task per accepted socket
//! - Loud lifecycle errors: double start and premature stop both fail
//!
//! # Design Decisions
//! - The accept gate is a one-permit semaphore local to the `Server`
//!   instance, so independent servers in one process stay isolated
//! - An accept failure (other than would-block) is fatal to the loop only;
//!   in-flight workers run to completion
//! - The loop task owns the listening socket: dropping it on exit closes the
//!   socket exactly once

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinHandle;

use crate::config::ServerConfig;
use crate::net::connection::Worker;
use crate::routing::router::Router;

/// Lifecycle and bind errors for the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("server already started")]
    AlreadyStarted,
    #[error("server not started")]
    NotStarted,
    #[error("failed to bind: {0}")]
    Bind(#[source] std::io::Error),
}

/// The acceptance loop. Owns the listening socket while running.
pub struct Server {
    config: ServerConfig,
    worker: Worker,
    running: Option<Running>,
}

/// State held only while the accept loop runs.
struct Running {
    local_addr: SocketAddr,
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl Server {
    /// A server dispatching through `router` with the default worker steps.
    pub fn new(config: ServerConfig, router: Arc<Router>) -> Self {
        Self::with_worker(config, Worker::new(router))
    }

    /// A server with a customized worker (substituted parse or response
    /// steps).
    pub fn with_worker(config: ServerConfig, worker: Worker) -> Self {
        Self { config, worker, running: None }
    }

    /// Bind the listening socket and spawn the accept loop.
    ///
    /// Fails with [`ServerError::AlreadyStarted`] if the loop is already
    /// running, leaving it untouched, and with [`ServerError::Bind`] if the
    /// address is unavailable.
    pub async fn start(&mut self) -> Result<(), ServerError> {
        if self.running.is_some() {
            return Err(ServerError::AlreadyStarted);
        }

        let addr = format!("{}:{}", self.config.bind_address, self.config.port);
        let listener = TcpListener::bind(&addr).await.map_err(ServerError::Bind)?;
        let local_addr = listener.local_addr().map_err(ServerError::Bind)?;

        tracing::info!(address = %local_addr, "listener bound");

        let (stop_tx, stop_rx) = watch::channel(false);
        let worker = self.worker.clone();
        let task = tokio::spawn(accept_loop(listener, worker, stop_rx));

        self.running = Some(Running { local_addr, stop_tx, task });
        Ok(())
    }

    /// Signal the accept loop to stop and wait for it to exit. The listening
    /// socket closes with the loop; connections already handed to workers run
    /// to completion.
    ///
    /// Fails with [`ServerError::NotStarted`] if the server is not running.
    pub async fn stop(&mut self) -> Result<(), ServerError> {
        let running = self.running.take().ok_or(ServerError::NotStarted)?;
        let _ = running.stop_tx.send(true);
        let _ = running.task.await;
        tracing::info!(address = %running.local_addr, "listener stopped");
        Ok(())
    }

    /// The bound address while running. Useful with port 0.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.running.as_ref().map(|r| r.local_addr)
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }
}

/// The accept loop body. Runs as one dedicated task that owns the listener.
async fn accept_loop(listener: TcpListener, worker: Worker, mut stop_rx: watch::Receiver<bool>) {
    // Single-permit gate: at most one accept outstanding at a time.
    let accept_gate = Arc::new(Semaphore::new(1));

    loop {
        let permit = accept_gate
            .clone()
            .acquire_owned()
            .await
            .expect("accept gate closed unexpectedly");

        let accepted = tokio::select! {
            // Stop requested, or the Server itself was dropped.
            _ = stop_rx.changed() => break,
            res = listener.accept() => res,
        };

        // Re-arm the gate as soon as the accept completes, success or not.
        drop(permit);

        match accepted {
            Ok((stream, peer_addr)) => {
                let worker = worker.clone();
                tokio::spawn(async move {
                    worker.run(stream, peer_addr).await;
                });
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => continue,
            Err(e) => {
                // Transport failure: stop accepting, leave workers alone.
                tracing::error!(error = %e, "accept failed, stopping listener");
                break;
            }
        }
    }
    // Dropping the listener here closes the socket, once, on every exit path.
}
