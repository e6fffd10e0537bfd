//! Observer HTTP server lifecycle management.

use hamlet_store::Store;
use tokio::net::TcpListener;
use tracing::info;

use crate::router::build_router;
use crate::state::AppState;

/// Errors that can occur when starting or running the observer server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind to the network address.
    #[error("bind error: {0}")]
    Bind(String),

    /// The server encountered a fatal error while serving.
    #[error("serve error: {0}")]
    Serve(String),
}

/// Start the observer HTTP server over the shared store.
///
/// Binds to `bind_addr`, builds the router, and serves requests until
/// the process is terminated.
///
/// # Errors
///
/// Returns [`ServerError::Bind`] if the listener cannot bind, or
/// [`ServerError::Serve`] on a fatal I/O error while serving.
pub async fn start_server(bind_addr: &str, store: Store) -> Result<(), ServerError> {
    let router = build_router(AppState::new(store));

    let listener = TcpListener::bind(bind_addr)
        .await
        .map_err(|e| ServerError::Bind(format!("bind failed on {bind_addr}: {e}")))?;

    info!(addr = bind_addr, "observer server listening");

    axum::serve(listener, router)
        .await
        .map_err(|e| ServerError::Serve(e.to_string()))?;

    Ok(())
}
