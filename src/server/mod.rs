//! HTTP upload server for dump imports.
//!
//! Provides two endpoints:
//! - `POST /import` - multipart upload of one dump in the `file` field
//! - `GET /health` - liveness check
//!
//! Imports run inside the request; the response carries the import report
//! or an error message.

mod handlers;
mod types;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use handlers::{health_handler, import_handler};
pub use types::{AppState, ErrorResponse};

/// Builds the router with the given upload size limit
pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/import", post(import_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}

/// Creates and starts the upload server
pub async fn start_server(
    bind: &str,
    port: u16,
    max_upload_bytes: usize,
    state: AppState,
) -> Result<(), anyhow::Error> {
    let app = router(state, max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", bind, port))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind upload server to {}:{}: {}", bind, port, e))?;

    log::info!("Upload server listening on http://{}:{}/", bind, port);
    log::info!("  - Import: POST http://{}:{}/import", bind, port);
    log::info!("  - Health: http://{}:{}/health", bind, port);

    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Upload server error: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dump::Catalog;
    use crate::storage::test_helpers::create_test_store;

    #[tokio::test]
    async fn test_start_server_port_binding_failure() {
        let store = create_test_store().await;
        let occupied = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = occupied.local_addr().unwrap().port();

        let err = start_server(
            "127.0.0.1",
            port,
            1024,
            AppState::new(store, Catalog::default()),
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("Failed to bind upload server"));
        assert!(err.to_string().contains(&port.to_string()));
    }
}
