use std::io;

use axum::{Router, extract::State, routing::post};
use log::info;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

const STOPPED: &str = "Training stopped";

/// Builds the control API of a training node.
///
/// # Arguments
/// * `token` - The token cancelled when a stop is requested.
///
/// # Returns
/// A router serving `POST /api/training/stop`.
pub fn router(token: CancellationToken) -> Router {
    Router::new()
        .route("/api/training/stop", post(stop_training))
        .with_state(token)
}

/// Serves the control API on `listener` until `token` is cancelled.
///
/// # Errors
/// Returns an io error if the server fails.
pub async fn serve(listener: TcpListener, token: CancellationToken) -> io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("control endpoint listening on {addr}");
    }

    let shutdown = token.clone();
    axum::serve(listener, router(token))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}

async fn stop_training(State(token): State<CancellationToken>) -> &'static str {
    info!("stop requested");
    token.cancel();
    STOPPED
}
