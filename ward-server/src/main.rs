use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use ward_server::{create_app, WardServer};

/// WardCare HTTP Server
#[derive(Parser, Debug)]
#[command(name = "ward-server")]
#[command(about = "Hospital ward, transfer and billing API server")]
struct Args {
    /// Configuration file path (YAML or TOML)
    #[arg(short, long, env = "WARDCARE_CONFIG")]
    config: Option<PathBuf>,

    /// Server bind address, overrides `server.host`
    #[arg(long)]
    host: Option<String>,

    /// Server port, overrides `server.port`
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = config_engine::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if args.verbose {
        config.logging.log_level = "debug".to_string();
    }

    logger_redacted::init_logging(&config.logging)?;

    info!(version = env!("CARGO_PKG_VERSION"), "Starting WardCare server");
    info!(
        capacity = ?config.policies.capacity,
        overpayment = ?config.policies.overpayment,
        consistency = ?config.policies.consistency,
        "Active policies"
    );

    let server = WardServer::new(&config).await?;
    let app = create_app(server);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    info!("WardCare server running on http://{addr}");
    info!("Health check available at: http://{addr}/health");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("WardCare server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
    }
}
