//! Liveness handler.

/// Returns `ok` while the server is accepting requests
pub async fn health_handler() -> &'static str {
    "ok"
}
