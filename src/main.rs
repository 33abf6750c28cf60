//! Dashlink - dashboard push-delivery client
//!
//! Connects to the dashboard's notification and metrics endpoints and renders
//! whatever the server pushes, until interrupted.

use anyhow::Result;
use clap::Parser;
use dashlink::{app::App, cli::Cli, config::Config};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration by layering sources: defaults, file, environment, and CLI args.
    let config = Config::load(&cli).unwrap_or_else(|err| {
        eprintln!("failed to load configuration: {err}");
        // Exit if configuration fails, as it's a critical step.
        std::process::exit(1);
    });

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .init();

    info!("dashlink starting up...");
    info!("-------------------- Configuration --------------------");
    info!("Log Level: {}", config.log_level);
    info!("Host: {}", config.channels.host);
    info!("Notify Port: {}", config.channels.notify_port);
    info!("Metrics Port: {}", config.channels.metrics_port);
    info!(
        "Subscriber Identity: {}",
        config.identity.as_deref().unwrap_or("(none)")
    );
    info!(
        "Reconnect: {}",
        if config.channels.reconnect.enabled {
            "Enabled"
        } else {
            "Disabled"
        }
    );
    info!("-------------------------------------------------------");

    let app = App::builder(config).build()?;

    let shutdown_tx = app.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received, shutting down gracefully...");
            let _ = shutdown_tx.send(true);
        }
    });

    app.run().await
}
