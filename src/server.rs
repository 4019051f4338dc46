// Server setup and configuration

use anyhow::{Context, Result};
use axum::{Router, routing::get};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info, warn};

use crate::config::ServerConfig;
use crate::endpoints::{AppState, jwks_handler};
use crate::key_management::load_private_key;

/// Create the application router with all endpoints
pub fn create_app(app_state: AppState) -> Router {
    Router::new()
        .route("/.well-known/jwks.json", get(jwks_handler))
        .route("/jwks", get(jwks_handler)) // Alternative endpoint
        .layer(
            // Every request is logged at the default level
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(app_state)
}

pub async fn start_server(config: ServerConfig) -> Result<()> {
    // Fail before binding if the key is unusable
    let key_pair = load_private_key(&config.key_path)?;
    let kid = key_pair.key_id();
    let app = create_app(Arc::new(key_pair));

    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;

    warn!("This server is for demo purposes only. Do not use as is in production");
    info!(addr = %config.bind, kid = %kid, "JWKS server listening");
    info!("  GET  /.well-known/jwks.json - JWKS endpoint");
    info!("  GET  /jwks                   - Alternative JWKS endpoint");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("JWKS server failed")?;

    info!("JWKS server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Cannot listen for Ctrl-C, running until killed");
        std::future::pending::<()>().await;
    }
}
