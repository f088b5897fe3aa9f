//! HTTP server implementation.

use std::future::Future;
use std::net::SocketAddr;

use axum::http::{header, Method};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use super::handlers::{time_handler, AppState};
use crate::config::RateLimitingConfig;
use crate::error::Result;
use crate::ratelimit::RateLimiter;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/api/time", get(time_handler))
        .layer(cors)
        .with_state(state)
}

/// HTTP server for the time API.
pub struct HttpServer {
    /// Address to bind to
    addr: SocketAddr,
    /// Shared handler state
    state: AppState,
}

impl HttpServer {
    /// Create a new server over the given rate limiter and limits.
    pub fn new(addr: SocketAddr, limiter: RateLimiter, limits: &RateLimitingConfig) -> Self {
        Self {
            addr,
            state: AppState {
                limiter,
                limit: limits.limit,
                window_secs: limits.window_secs,
            },
        }
    }

    /// Start the HTTP server.
    ///
    /// This method will block until the server is shut down.
    pub async fn serve(self) -> Result<()> {
        let listener = TcpListener::bind(self.addr).await?;
        info!(addr = %self.addr, "Starting HTTP server for the time API");
        axum::serve(listener, router(self.state)).await?;
        Ok(())
    }

    /// Start the HTTP server with graceful shutdown.
    ///
    /// The server will shut down when the provided signal resolves.
    pub async fn serve_with_shutdown<F>(self, signal: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.addr).await?;
        info!(
            addr = %self.addr,
            "Starting HTTP server for the time API with graceful shutdown"
        );
        axum::serve(listener, router(self.state))
            .with_graceful_shutdown(signal)
            .await?;
        Ok(())
    }
}
