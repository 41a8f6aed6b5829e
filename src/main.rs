use std::sync::Arc;
use tokio::signal;
use tracing::{debug, info, Level};
use tracing_subscriber;

use mailgate::config::MailgateConfig;
use mailgate::http::{AppState, HttpServer};
use mailgate::mail::SmtpRelay;
use mailgate::ratelimit::SlidingWindowLimiter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .init();

    info!("Starting Mailgate Contact Relay Service");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Populate the environment from a local .env file when present
    match dotenvy::dotenv() {
        Ok(path) => info!(path = %path.display(), "Loaded environment file"),
        Err(_) => debug!("No .env file found, using process environment"),
    }

    // Load configuration
    let config = MailgateConfig::from_env()?;
    info!(
        port = config.port,
        smtp_host = %config.smtp_host,
        "Configuration loaded"
    );

    // Initialize the rate limiter
    let limiter = Arc::new(SlidingWindowLimiter::default());
    info!("Rate limiter initialized");

    // Configure the outbound mail relay
    let relay = Arc::new(SmtpRelay::from_config(&config)?);

    let state = AppState {
        limiter,
        relay,
        trusted_proxies: Arc::new(config.trusted_proxies.clone()),
    };

    // Create and start the HTTP server
    let server = HttpServer::new(&config, state)?;

    // Run the server with graceful shutdown on Ctrl+C
    server.serve_with_shutdown(shutdown_signal()).await?;

    info!("Mailgate Contact Relay Service stopped");
    Ok(())
}

/// Wait for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
