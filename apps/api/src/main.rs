mod config;
mod errors;
mod gallery;
mod media;
mod routes;
mod state;
mod store;

use anyhow::Result;
use axum::extract::DefaultBodyLimit;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::media::CloudinaryClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::PostgrestStore;

/// Request bodies (base64 image payloads included) up to 10 MiB.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (aborts on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let crate_target = env!("CARGO_PKG_NAME").replace('-', "_");
            EnvFilter::new(format!("{}={}", crate_target, &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Grove API v{}", env!("CARGO_PKG_VERSION"));

    // Record store client (external managed store, PostgREST dialect)
    let store = Arc::new(PostgrestStore::new(
        &config.store_url,
        config.store_key.clone(),
    ));
    info!("Record store client initialized");

    // Media upload client
    let media = Arc::new(CloudinaryClient::new(
        &config.cloudinary_cloud_name,
        config.cloudinary_api_key.clone(),
        config.cloudinary_upload_preset.clone(),
    ));
    info!("Media upload client initialized");

    // Build app state
    let state = AppState {
        store,
        media,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()) // the gallery frontend is served from another origin
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES));

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
