//! Health check endpoints.

use axum::{Json, Router, routing::get};
use serde_json::{Value, json};

use crate::AppState;

/// Health check handler.
///
/// Liveness only; it does not touch the database or the object store.
async fn health_check() -> Json<Value> {
    Json(json!({
        "success": true,
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Creates health check routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
