//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes for blog posts
//! - Authentication middleware
//! - Response envelope types

pub mod middleware;
pub mod routes;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use scribe_core::media::MediaService;
use scribe_shared::JwtService;
use scribe_shared::config::CorsConfig;

/// Multipart bodies carry text fields alongside the image, so the
/// request limit sits a little above the image limit itself.
const BODY_LIMIT_SLACK: usize = 64 * 1024;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// JWT service for token verification.
    pub jwt_service: Arc<JwtService>,
    /// Media service for post images.
    pub media: Arc<MediaService>,
}

/// Creates the main application router.
pub fn create_router(state: AppState, cors: &CorsConfig) -> Router {
    let body_limit =
        usize::try_from(state.media.config().max_upload_bytes).unwrap_or(usize::MAX)
            .saturating_add(BODY_LIMIT_SLACK);

    Router::new()
        .merge(routes::api_routes_with_state(state.clone()))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors))
        .with_state(state)
}

/// Builds the CORS layer from configuration.
///
/// An empty origin list keeps the permissive development default.
fn cors_layer(cors: &CorsConfig) -> CorsLayer {
    if cors.allowed_origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = cors
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}
