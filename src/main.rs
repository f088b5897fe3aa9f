use std::sync::Arc;

use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use pktime::config::PktimeConfig;
use pktime::http::HttpServer;
use pktime::ratelimit::{CounterStore, MemoryStore, RateLimiter, RestCounterStore};

#[derive(Parser, Debug)]
#[command(name = "pktime", version, about = "Pakistan Standard Time API")]
struct Args {
    /// Path to a YAML configuration file
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    info!("Starting Pktime Time Service");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    let config = PktimeConfig::load(args.config.as_deref())?;
    info!(
        listen_addr = %config.server.listen_addr,
        limit = config.rate_limiting.limit,
        window_secs = config.rate_limiting.window_secs,
        "Configuration loaded"
    );

    // Select the counter store once at startup. Credentials present means the
    // networked store is used exclusively; otherwise the in-memory fallback
    // serves for the life of the process.
    let store: Arc<dyn CounterStore> = match config.counter_store.credentials() {
        Some((url, token)) => {
            info!("Using networked counter store");
            Arc::new(RestCounterStore::new(url, token)?)
        }
        None => {
            warn!("Counter store credentials not configured, using in-memory fallback");
            Arc::new(MemoryStore::new())
        }
    };

    let limiter = RateLimiter::new(store);
    let server = HttpServer::new(config.server.listen_addr, limiter, &config.rate_limiting);

    // Run the server with graceful shutdown on Ctrl+C
    server.serve_with_shutdown(shutdown_signal()).await?;

    info!("Pktime Time Service stopped");
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
