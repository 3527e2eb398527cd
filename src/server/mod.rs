//! HTTP boundary: `GET /solve?equation=...` and `GET /`, JSON bodies, permissive CORS.

pub mod config;
pub mod cors;
pub mod handlers;
pub mod response;

use std::sync::Arc;

use axum::Router;
use axum::middleware::map_response;
use axum::routing::get;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::engine::{NativeEngine, SymbolicEngine};

pub use config::{ConfigError, ServerConfig};

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<dyn SymbolicEngine>,
}

impl AppState {
    pub fn new(engine: Arc<dyn SymbolicEngine>) -> Self {
        AppState { engine }
    }
}

impl Default for AppState {
    fn default() -> Self {
        AppState::new(Arc::new(NativeEngine::new()))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root).options(handlers::preflight))
        .route("/solve", get(handlers::solve).options(handlers::preflight))
        .fallback(handlers::fallback)
        .layer(map_response(cors::add_cors_headers))
        .with_state(state)
}

/// Bind and serve until Ctrl-C.
pub async fn serve(config: ServerConfig) -> std::io::Result<()> {
    let listener = TcpListener::bind(config.socket_addr()).await?;
    info!(addr = %listener.local_addr()?, "equation API listening");
    axum::serve(listener, router(AppState::default()))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(%err, "could not listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
