//! HTTP listener.

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::error::{ServerError, ServerResult};

/// Serve `app` on `addr` until the process is stopped.
pub async fn serve(addr: &str, app: Router) -> ServerResult<()> {
    let app = app.layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(ServerError::Io)?;

    tracing::info!("HTTP server listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Transport(e.to_string()))?;

    Ok(())
}
