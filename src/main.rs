//! tinyserve binary: loads configuration, registers the demo routes and runs
//! the server until Ctrl+C.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use tinyserve::http::response;
use tinyserve::routing::router::HandlerFuture;
use tinyserve::{config, observability, Request, Router, Server, ServerConfig};

#[derive(Debug, Parser)]
#[command(name = "tinyserve", about = "One-request-per-connection HTTP listener")]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the configured port.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    observability::logging::init("tinyserve=debug");

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => ServerConfig::default(),
    };
    if let Some(port) = args.port {
        config.port = port;
    }

    tracing::info!(
        bind_address = %config.bind_address,
        port = config.port,
        "configuration loaded"
    );

    let mut router = Router::new();
    router.register("/", index);
    router.register("/hello", hello);

    let mut server = Server::new(config, Arc::new(router));
    server.start().await?;
    if let Some(addr) = server.local_addr() {
        tracing::info!(address = %addr, "serving; Ctrl+C to stop");
    }

    tokio::signal::ctrl_c().await?;
    server.stop().await?;
    tracing::info!("shutdown complete");
    Ok(())
}

fn index(req: &mut Request) -> HandlerFuture<'_> {
    Box::pin(async move {
        req.respond(response::OK, "tinyserve is running").await?;
        Ok(true)
    })
}

fn hello(req: &mut Request) -> HandlerFuture<'_> {
    Box::pin(async move {
        let greeting = format!("hello, {}", req.param("name").unwrap_or("world"));
        req.respond(response::OK, &greeting).await?;
        Ok(true)
    })
}
