//! Ticket QR Server
//!
//! Wires in-memory persistence, the QR renderer and the ticket service behind
//! the WebSocket server, then runs until Ctrl-C.

use anyhow::Context;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ticket_qr::{
    AppConfig, MemoryLedger, MemoryStore, QrRenderer, RequestHandler, TicketServer, TicketService,
    VERSION,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; the environment may already be populated.
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Ticket QR Server v{}", VERSION);

    let config = AppConfig::from_env().context("reading configuration")?;
    if config.secrets.uses_defaults() {
        warn!("JWT_SECRET or ENCRYPTION_SECRET not set; using built-in defaults");
    }
    info!(
        bind = %config.server.bind_addr,
        qr_dir = %config.qr.image_dir.display(),
        "Configuration loaded"
    );

    let service = TicketService::new(
        &config.secrets,
        config.qr.clone(),
        Arc::new(MemoryLedger::new()),
        Arc::new(MemoryStore::new()),
        Arc::new(QrRenderer::new(config.qr.image_size)),
    )
    .context("deriving envelope key")?;

    let handler = RequestHandler::new(Arc::new(service), config.operator.clone());
    let server = Arc::new(TicketServer::new(config.server.clone(), handler));

    let signal_server = server.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received, shutting down");
            signal_server.shutdown();
        }
    });

    server.run().await.context("server stopped")?;

    info!("Server stopped");
    Ok(())
}
