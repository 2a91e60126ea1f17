//! HTTP server bootstrap for the screening API.

use tokio::net::TcpListener;

use crate::api::router::screening_api_router;
use crate::api::types::ApiContext;

/// Bind and serve the screening API until Ctrl-C.
pub async fn serve(port: u16, ctx: ApiContext) -> std::io::Result<()> {
    let app = screening_api_router(ctx);
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!("Screening API listening on http://0.0.0.0:{}", port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install Ctrl-C handler: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
}
