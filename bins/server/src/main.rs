//! Scribe API Server
//!
//! Main entry point for the Scribe blog backend service.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scribe_api::{AppState, create_router};
use scribe_core::media::{MediaConfig, MediaProvider, MediaService};
use scribe_db::connect_with_pool;
use scribe_db::migration::{Migrator, MigratorTrait};
use scribe_shared::config::{MediaBackendSettings, MediaSettings};
use scribe_shared::{AppConfig, JwtConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scribe=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load()?;

    // Connect to database and apply pending migrations
    let db = connect_with_pool(
        &config.database.url,
        config.database.max_connections,
        config.database.min_connections,
    )
    .await?;
    Migrator::up(&db, None).await?;
    info!("Connected to database, schema up to date");

    // Create JWT service
    let jwt_config = JwtConfig {
        secret: config.jwt.secret.clone(),
        #[allow(clippy::cast_possible_wrap)]
        access_token_expires_minutes: (config.jwt.access_token_expiry_secs / 60) as i64,
    };
    let jwt_service = JwtService::new(jwt_config);

    // Create media service
    let media_config = media_config_from_settings(&config.media);
    let media = MediaService::from_config(media_config)?;
    info!(provider = media.provider_name(), "Media storage configured");

    // Create application state
    let state = AppState {
        db: Arc::new(db),
        jwt_service: Arc::new(jwt_service),
        media: Arc::new(media),
    };

    // Create router
    let app = create_router(state, &config.cors);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Translates deserialized media settings into the core media config.
fn media_config_from_settings(settings: &MediaSettings) -> MediaConfig {
    let provider = match &settings.backend {
        MediaBackendSettings::S3 {
            endpoint,
            bucket,
            access_key_id,
            secret_access_key,
            region,
        } => MediaProvider::s3(endpoint, bucket, access_key_id, secret_access_key, region),
        MediaBackendSettings::LocalFs { root } => MediaProvider::local_fs(root.clone()),
    };

    MediaConfig::new(provider, settings.public_base_url.clone())
        .with_folder(settings.folder.clone())
        .with_max_upload_bytes(settings.max_upload_bytes)
}
