//! Gateway server bootstrap.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{any, get},
    Router,
};
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;

use super::handler::{proxy_handler, GatewayState};
use crate::error::GatewayError;
use crate::traits::SettingsProvider;

/// Prefix under which every backend path is exposed.
pub const PROXY_PREFIX: &str = "/api/proxy";

/// Build the gateway routes.
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/healthz", get(health_handler))
        .route(&format!("{}/*path", PROXY_PREFIX), any(proxy_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_handler() -> &'static str {
    "ok"
}

/// Start the gateway on a specific address in a background task.
///
/// Bind to port 0 to get an ephemeral port; the bound address is returned.
pub async fn start_gateway_on(
    addr: SocketAddr,
    settings: Arc<dyn SettingsProvider>,
) -> Result<(JoinHandle<()>, SocketAddr), GatewayError> {
    let app = router(GatewayState::new(settings)?);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    tracing::info!("Gateway listening on http://{}", actual_addr);

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("Gateway server error: {}", e);
        }
    });

    Ok((handle, actual_addr))
}

/// Run the gateway in the foreground until Ctrl-C.
pub async fn serve(
    addr: SocketAddr,
    settings: Arc<dyn SettingsProvider>,
) -> Result<(), GatewayError> {
    let app = router(GatewayState::new(settings)?);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Gateway listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
