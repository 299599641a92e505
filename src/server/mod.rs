// Sentibot - HTTP server module
// Multi-session chat API over the shared chat engine

mod handlers;
mod session;

pub use handlers::{create_router, health_check, metrics_endpoint, AppError};
pub use session::{SessionError, SessionManager, SharedSession};

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::trace::TraceLayer;

use crate::chat::ChatEngine;
use crate::config::Config;

const CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// Main chat server structure
pub struct ChatServer {
    /// Chat engine (shared across sessions)
    engine: Arc<ChatEngine>,
    /// Session manager
    session_manager: Arc<SessionManager>,
    /// Loaded configuration
    config: Config,
    started_at: Instant,
}

impl ChatServer {
    /// Create a new chat server
    pub fn new(config: Config, engine: ChatEngine) -> Self {
        let session_manager = SessionManager::new(
            config.server.max_sessions,
            config.server.session_timeout_minutes,
            config.model.max_conversation_history,
        );

        Self {
            engine: Arc::new(engine),
            session_manager: Arc::new(session_manager),
            config,
            started_at: Instant::now(),
        }
    }

    /// Router with request tracing, without binding a socket
    pub fn into_router(self) -> axum::Router {
        create_router(Arc::new(self)).layer(TraceLayer::new_for_http())
    }

    /// Start the HTTP server and run until Ctrl-C
    pub async fn serve(self) -> Result<()> {
        let addr: SocketAddr = self
            .config
            .server
            .bind_address
            .parse()
            .with_context(|| format!("Invalid bind address: {}", self.config.server.bind_address))?;

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;
        self.serve_on(listener).await
    }

    /// Serve on an already bound listener until Ctrl-C
    pub async fn serve_on(self, listener: tokio::net::TcpListener) -> Result<()> {
        let cleanup = self.session_manager.start_cleanup_task(CLEANUP_INTERVAL);
        let app = self.into_router();

        tracing::info!("Starting Sentibot server on {}", listener.local_addr()?);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        cleanup.abort();
        tracing::info!("Server stopped");
        Ok(())
    }

    pub fn engine(&self) -> &Arc<ChatEngine> {
        &self.engine
    }

    /// Get reference to session manager
    pub fn session_manager(&self) -> &Arc<SessionManager> {
        &self.session_manager
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
